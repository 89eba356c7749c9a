//! Edit-distance style aligner over integer token sequences.
//!
//! Tokens must be strictly positive: zero is the gap sentinel. Equal tokens
//! align for free, unequal tokens cost 2 and gaps cost 1. Scores are reported
//! as negative costs, so the best alignment maximizes the score.

use num::PrimInt;
use serde::Serialize;
use tracing::{debug, debug_span, error, trace};

use crate::aligner::alignment::{Alignment, IndexPair};
use crate::aligner::matrix::{DpMatrix, DEFAULT_MAX_CELLS};
use crate::errors::{Side, StrandError};

pub const MATCH_SCORE: i64 = 0;
pub const MISMATCH_SCORE: i64 = -2;
pub const GAP_SCORE: i64 = -1;

/// Score of aligning `x` with `y`, where a zero token represents a gap
#[inline(always)]
fn step_score<T: PrimInt>(x: T, y: T) -> i64 {
    if x.is_zero() || y.is_zero() {
        GAP_SCORE
    } else if x != y {
        MISMATCH_SCORE
    } else {
        MATCH_SCORE
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridAlignment {
    /// Negative edit cost of the alignment
    pub score: i64,
    pub alignment: Alignment,
}

impl GridAlignment {
    pub fn num_aligned(&self) -> usize {
        self.alignment.iter().filter(|p| p.is_aligned()).count()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GridAligner {
    max_cells: usize,
}

impl GridAligner {
    pub fn new() -> Self {
        Self { max_cells: DEFAULT_MAX_CELLS }
    }

    /// Refuse to align sequences whose DP grid would exceed `max_cells` cells
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn align<T>(&self, source: &[T], target: &[T]) -> Result<GridAlignment, StrandError>
    where
        T: PrimInt,
    {
        check_tokens(source, Side::Source)?;
        check_tokens(target, Side::Target)?;

        let span = debug_span!("align_tokens", source_len = source.len(), target_len = target.len());
        let _enter = span.enter();

        let grid = fill_grid(source, target, self.max_cells)?;
        let score = grid.get(source.len(), target.len());
        debug!("Alignment score: {score}");

        let alignment = backtrace(&grid, source, target)?;

        Ok(GridAlignment { score, alignment })
    }
}

impl Default for GridAligner {
    fn default() -> Self {
        Self::new()
    }
}

fn check_tokens<T: PrimInt>(tokens: &[T], side: Side) -> Result<(), StrandError> {
    match tokens.iter().position(|v| *v <= T::zero()) {
        Some(position) => Err(StrandError::InvalidInput { side, position }),
        None => Ok(()),
    }
}

fn fill_grid<T: PrimInt>(source: &[T], target: &[T], max_cells: usize) -> Result<DpMatrix<i64>, StrandError> {
    let gap = T::zero();
    let mut grid = DpMatrix::for_sequences(source.len(), target.len(), 0i64, max_cells)?;

    for s in 0..=source.len() {
        for t in 0..=target.len() {
            let score = match (s, t) {
                (0, 0) => 0,
                (_, 0) => grid.get(s - 1, 0) + step_score(source[s - 1], gap),
                (0, _) => grid.get(0, t - 1) + step_score(gap, target[t - 1]),
                _ => {
                    let deletion = grid.get(s - 1, t) + step_score(source[s - 1], gap);
                    let insertion = grid.get(s, t - 1) + step_score(gap, target[t - 1]);
                    let substitution = grid.get(s - 1, t - 1) + step_score(source[s - 1], target[t - 1]);

                    deletion.max(insertion).max(substitution)
                }
            };

            grid.set(s, t, score);
        }
    }

    Ok(grid)
}

/// Walk back from the final cell. At each cell we try deletion, insertion and
/// substitution in that order, and take the first move that reproduces the
/// cell's score.
fn backtrace<T: PrimInt>(grid: &DpMatrix<i64>, source: &[T], target: &[T]) -> Result<Alignment, StrandError> {
    let gap = T::zero();
    let mut alignment = Vec::with_capacity(source.len().max(target.len()));

    let (mut s, mut t) = (source.len(), target.len());
    while s > 0 || t > 0 {
        let current = grid.get(s, t);

        if s > 0 && current == grid.get(s - 1, t) + step_score(source[s - 1], gap) {
            s -= 1;
            alignment.push(IndexPair::deletion(s));
            continue;
        }

        if t > 0 && current == grid.get(s, t - 1) + step_score(gap, target[t - 1]) {
            t -= 1;
            alignment.push(IndexPair::insertion(t));
            continue;
        }

        if s > 0 && t > 0 && current == grid.get(s - 1, t - 1) + step_score(source[s - 1], target[t - 1]) {
            s -= 1;
            t -= 1;
            alignment.push(IndexPair::aligned(s, t));
            continue;
        }

        error!("No move reproduces score {current} of cell ({s}, {t})");
        return Err(StrandError::InternalInconsistency { source_pos: s, target_pos: t });
    }

    trace!("Traceback took {} steps", alignment.len());
    alignment.reverse();

    Ok(alignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(aln: &[IndexPair], source_len: usize, target_len: usize) {
        let source_ix: Vec<_> = aln.iter().filter_map(|p| p.source).collect();
        let target_ix: Vec<_> = aln.iter().filter_map(|p| p.target).collect();

        assert_eq!(source_ix, (0..source_len).collect::<Vec<_>>());
        assert_eq!(target_ix, (0..target_len).collect::<Vec<_>>());
    }

    #[test]
    fn test_identity() {
        let seq = [3u32, 1, 4, 1, 5, 9, 2, 6];
        let result = GridAligner::new().align(&seq, &seq).unwrap();

        assert_eq!(result.score, 0);
        assert_eq!(result.alignment, (0..seq.len()).map(|i| IndexPair::aligned(i, i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty() {
        let result = GridAligner::new().align::<u32>(&[], &[]).unwrap();
        assert_eq!(result.score, 0);
        assert!(result.alignment.is_empty());

        let result = GridAligner::new().align(&[], &[5u32]).unwrap();
        assert_eq!(result.score, -1);
        assert_eq!(result.alignment, vec![IndexPair::insertion(0)]);
        assert_eq!(result.alignment[0].as_signed(), (-1, 0));

        let result = GridAligner::new().align(&[7u8, 7], &[]).unwrap();
        assert_eq!(result.score, -2);
        assert_eq!(result.alignment, vec![IndexPair::deletion(0), IndexPair::deletion(1)]);
    }

    #[test]
    fn test_mismatch_costs_two() {
        let result = GridAligner::new().align(&[1u32, 2, 3], &[1u32, 5, 3]).unwrap();
        assert_eq!(result.score, -2);
        assert_covers(&result.alignment, 3, 3);
    }

    #[test]
    fn test_deletion_preferred_on_ties() {
        // A mismatch (-2) ties with a deletion plus an insertion (-1 + -1).
        // Traceback from the end checks deletion first, so the last step taken
        // is the insertion of target[0] following the deletion of source[0].
        let result = GridAligner::new().align(&[1u32], &[2u32]).unwrap();
        assert_eq!(result.score, -2);
        assert_eq!(result.alignment, vec![IndexPair::insertion(0), IndexPair::deletion(0)]);
    }

    #[test]
    fn test_insertion_in_middle() {
        let result = GridAligner::new().align(&[1u32, 2, 3], &[1u32, 2, 9, 3]).unwrap();
        assert_eq!(result.score, -1);
        assert_eq!(result.alignment, vec![
            IndexPair::aligned(0, 0),
            IndexPair::aligned(1, 1),
            IndexPair::insertion(2),
            IndexPair::aligned(2, 3),
        ]);
        assert_eq!(result.num_aligned(), 3);
    }

    #[test]
    fn test_coverage() {
        let source = [2u64, 65536, 1, 1, 65537, 3, 1, 65539];
        let target = [2u64, 1, 65536, 1, 1, 4, 65539, 1];
        let result = GridAligner::new().align(&source, &target).unwrap();

        assert!(result.score <= 0);
        assert!(result.score >= -((source.len() + target.len()) as i64));
        assert_covers(&result.alignment, source.len(), target.len());
    }

    #[test]
    fn test_sentinel_rejected() {
        let result = GridAligner::new().align(&[1u32, 0, 2], &[1u32]);
        assert!(matches!(result, Err(StrandError::InvalidInput { side: Side::Source, position: 1 })));

        let result = GridAligner::new().align(&[1i32], &[1i32, 2, -4]);
        assert!(matches!(result, Err(StrandError::InvalidInput { side: Side::Target, position: 2 })));
    }

    #[test]
    fn test_cell_limit() {
        let aligner = GridAligner::new().with_max_cells(12);
        assert_eq!(aligner.max_cells(), 12);

        // 3 x 4 cells fit, 4 x 4 don't
        assert!(aligner.align(&[1u32, 2], &[1u32, 2, 3]).is_ok());

        let result = aligner.align(&[1u32, 2, 3], &[1u32, 2, 3]);
        assert!(matches!(result, Err(StrandError::MatrixTooLarge { rows: 3, cols: 3 })));
    }
}
