//! Gale-Church style length-based aligner.
//!
//! Source and target are sequences of unit lengths (e.g., sentence lengths in
//! characters). Each DP step applies one move from the [`MoveTable`], scored by
//! the move's prior plus the length cost of the spans it consumes.

use nonmax::NonMaxU8;
use serde::Serialize;
use tracing::{debug, debug_span, trace};

use crate::aligner::alignment::AlignmentBead;
use crate::aligner::cost_models::{GaussianLengthCost, LengthCostModel, LengthCostPolicy};
use crate::aligner::matrix::{DpMatrix, DEFAULT_MAX_CELLS};
use crate::aligner::moves::MoveTable;
use crate::errors::StrandError;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LengthAlignment {
    /// Total log-probability of the alignment
    pub score: f64,
    pub beads: Vec<AlignmentBead>,
}

#[derive(Clone, Debug)]
pub struct LengthAligner<C = GaussianLengthCost> {
    moves: MoveTable,
    cost_model: C,
    policy: LengthCostPolicy,
    max_cells: usize,
}

impl LengthAligner<GaussianLengthCost> {
    /// Aligner with the canonical move table and length model
    pub fn gale_church() -> Self {
        Self::new(MoveTable::gale_church(), GaussianLengthCost::default())
    }
}

impl Default for LengthAligner<GaussianLengthCost> {
    fn default() -> Self {
        Self::gale_church()
    }
}

impl<C> LengthAligner<C>
where
    C: LengthCostModel,
{
    pub fn new(moves: MoveTable, cost_model: C) -> Self {
        Self {
            moves,
            cost_model,
            policy: LengthCostPolicy::default(),
            max_cells: DEFAULT_MAX_CELLS,
        }
    }

    pub fn with_policy(mut self, policy: LengthCostPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Refuse to align sequences whose DP grid would exceed `max_cells` cells
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn moves(&self) -> &MoveTable {
        &self.moves
    }

    pub fn cost_model(&self) -> &C {
        &self.cost_model
    }

    pub fn policy(&self) -> LengthCostPolicy {
        self.policy
    }

    /// Score of a single step consuming the given number of units with the
    /// given total lengths, excluding the move prior.
    #[inline(always)]
    fn span_cost(&self, source_units: usize, target_units: usize, source_len: usize, target_len: usize) -> f64 {
        if self.policy.applies(source_units, target_units) {
            self.cost_model.length_cost(source_len, target_len)
        } else {
            0.0
        }
    }

    pub fn align(&self, source: &[usize], target: &[usize]) -> Result<LengthAlignment, StrandError> {
        let span = debug_span!("align_lengths", source_len = source.len(), target_len = target.len());
        let _enter = span.enter();

        // Prefix sums, such that the total length of units i..j is prefix[j] - prefix[i]
        let source_prefix = prefix_sums(source);
        let target_prefix = prefix_sums(target);

        let mut grid = DpMatrix::for_sequences(source.len(), target.len(), f64::NEG_INFINITY, self.max_cells)?;
        let mut backpointers: DpMatrix<Option<NonMaxU8>> =
            DpMatrix::for_sequences(source.len(), target.len(), None, self.max_cells)?;

        debug!("Filling {} x {} grid with {} move types", grid.rows(), grid.cols(), self.moves.len());

        for s in 0..=source.len() {
            for t in 0..=target.len() {
                let mut best_score = if s == 0 && t == 0 { 0.0 } else { f64::NEG_INFINITY };
                let mut best_move = None;

                for (ix, m) in self.moves.iter().enumerate() {
                    if m.source > s || m.target > t {
                        continue;
                    }

                    let (prev_s, prev_t) = (s - m.source, t - m.target);
                    let prev_score = grid.get(prev_s, prev_t);
                    if prev_score == f64::NEG_INFINITY {
                        continue;
                    }

                    let score = prev_score + m.log_prior + self.span_cost(
                        m.source,
                        m.target,
                        source_prefix[s] - source_prefix[prev_s],
                        target_prefix[t] - target_prefix[prev_t],
                    );

                    // Strict improvement only, the first move in table order wins ties
                    if score > best_score {
                        best_score = score;
                        best_move = NonMaxU8::new(ix as u8);
                    }
                }

                grid.set(s, t, best_score);
                if best_move.is_some() {
                    backpointers.set(s, t, best_move);
                }
            }
        }

        let score = grid.get(source.len(), target.len());
        debug!("Alignment score: {score}");

        let beads = self.backtrace(&backpointers, source.len(), target.len())?;

        Ok(LengthAlignment { score, beads })
    }

    fn backtrace(
        &self,
        backpointers: &DpMatrix<Option<NonMaxU8>>,
        source_len: usize,
        target_len: usize,
    ) -> Result<Vec<AlignmentBead>, StrandError> {
        let mut beads = Vec::new();
        let (mut s, mut t) = (source_len, target_len);

        while s > 0 || t > 0 {
            let Some(ix) = backpointers.get(s, t) else {
                return Err(StrandError::UnreachableState { source_pos: s, target_pos: t });
            };

            let m = self.moves.get(ix.get() as usize);
            let bead = AlignmentBead::new(s - m.source..s, t - m.target..t);
            trace!("Cell ({s}, {t}): move {}-{}", m.source, m.target);

            s = bead.source.start;
            t = bead.target.start;
            beads.push(bead);
        }

        beads.reverse();

        Ok(beads)
    }

    /// Score of a single bead: the prior of the move with the bead's
    /// dimensions plus its length cost. `None` if no move has these dimensions
    /// or the bead is out of bounds.
    pub fn bead_score(&self, bead: &AlignmentBead, source: &[usize], target: &[usize]) -> Option<f64> {
        let prior = self.moves.best_prior(bead.source_units(), bead.target_units())?;
        let source_len: usize = source.get(bead.source.clone())?.iter().sum();
        let target_len: usize = target.get(bead.target.clone())?.iter().sum();

        Some(prior + self.span_cost(bead.source_units(), bead.target_units(), source_len, target_len))
    }

    /// Recompute the total score of an alignment from its beads
    pub fn score_beads(&self, beads: &[AlignmentBead], source: &[usize], target: &[usize]) -> Option<f64> {
        beads.iter()
            .map(|bead| self.bead_score(bead, source, target))
            .sum()
    }
}

/// Align two sequences of unit lengths with the given move table and the
/// default length model.
pub fn align_lengths(source: &[usize], target: &[usize], moves: &MoveTable) -> Result<LengthAlignment, StrandError> {
    LengthAligner::new(moves.clone(), GaussianLengthCost::default())
        .align(source, target)
}

fn prefix_sums(lengths: &[usize]) -> Vec<usize> {
    let mut prefix = Vec::with_capacity(lengths.len() + 1);
    prefix.push(0);

    let mut total = 0usize;
    for &len in lengths {
        total = total.saturating_add(len);
        prefix.push(total);
    }

    prefix
}
