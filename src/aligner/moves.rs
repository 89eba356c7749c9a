//! Move types for the length-based aligner.
//!
//! A move consumes a fixed number of source and target units in one step and
//! carries a prior log-probability. The table is plain configuration: the
//! aligner evaluates every applicable move in table order.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::StrandError;

/// Move priors from Gale & Church (1993): 1-1, 1-0, 0-1, 2-1 and 1-2.
pub const GALE_CHURCH_PRIORS: [(usize, usize, f64); 5] = [
    (1, 1, 0.89),
    (1, 0, 0.005),
    (0, 1, 0.005),
    (2, 1, 0.0445),
    (1, 2, 0.0445),
];

/// Maximum number of move types. Backpointers store the move index in a
/// `NonMaxU8`, so index 255 is unavailable.
pub const MAX_MOVE_TYPES: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MoveTypeSpec")]
pub struct MoveType {
    /// Number of source units consumed
    pub source: usize,

    /// Number of target units consumed
    pub target: usize,

    /// Natural log of the prior probability of this move
    pub log_prior: f64,
}

impl MoveType {
    pub fn new(source: usize, target: usize, log_prior: f64) -> Self {
        Self { source, target, log_prior }
    }

    pub fn from_prob(source: usize, target: usize, prob: f64) -> Self {
        Self::new(source, target, prob.ln())
    }

    #[inline]
    pub fn is_two_sided(&self) -> bool {
        self.source > 0 && self.target > 0
    }

    /// The same move with source and target swapped
    pub fn mirrored(&self) -> Self {
        Self::new(self.target, self.source, self.log_prior)
    }
}

/// Serialized form of a move type. Either `prob` or `log_prior` should be given.
#[derive(Debug, Deserialize)]
struct MoveTypeSpec {
    source: usize,
    target: usize,
    #[serde(default)]
    prob: Option<f64>,
    #[serde(default)]
    log_prior: Option<f64>,
}

impl TryFrom<MoveTypeSpec> for MoveType {
    type Error = String;

    fn try_from(value: MoveTypeSpec) -> Result<Self, Self::Error> {
        match (value.prob, value.log_prior) {
            (Some(_), Some(_)) =>
                Err(format!("Move {}-{}: specify either 'prob' or 'log_prior', not both", value.source, value.target)),
            (Some(p), None) if p > 0.0 && p <= 1.0 =>
                Ok(MoveType::from_prob(value.source, value.target, p)),
            (Some(p), None) =>
                Err(format!("Move {}-{}: probability {p} not in (0, 1]", value.source, value.target)),
            (None, Some(lp)) =>
                Ok(MoveType::new(value.source, value.target, lp)),
            (None, None) =>
                Err(format!("Move {}-{}: missing 'prob' or 'log_prior'", value.source, value.target)),
        }
    }
}

/// An ordered, validated list of move types.
///
/// Order matters: when two moves produce the same cell score, the one listed
/// first is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MoveType>", into = "Vec<MoveType>")]
pub struct MoveTable {
    moves: SmallVec<[MoveType; 5]>,
}

impl MoveTable {
    /// Build a move table that guarantees every DP cell is reachable: it must
    /// contain a 1-0 and a 0-1 move.
    pub fn new(moves: impl IntoIterator<Item = MoveType>) -> Result<Self, StrandError> {
        let table = Self::without_reachability_check(moves)?;

        if !table.iter().any(|m| m.source == 1 && m.target == 0) {
            return Err(StrandError::InvalidMoveTable("no 1-0 move, some cells would be unreachable".to_string()));
        }

        if !table.iter().any(|m| m.source == 0 && m.target == 1) {
            return Err(StrandError::InvalidMoveTable("no 0-1 move, some cells would be unreachable".to_string()));
        }

        Ok(table)
    }

    /// Build a move table without requiring 1-0 and 0-1 moves. Aligning
    /// sequences whose final cell can't be reached with this table fails
    /// with [`StrandError::UnreachableState`].
    pub fn without_reachability_check(moves: impl IntoIterator<Item = MoveType>) -> Result<Self, StrandError> {
        let moves: SmallVec<[MoveType; 5]> = moves.into_iter().collect();

        if moves.is_empty() {
            return Err(StrandError::InvalidMoveTable("empty move table".to_string()));
        }

        if moves.len() > MAX_MOVE_TYPES {
            return Err(StrandError::InvalidMoveTable(
                format!("{} move types given, at most {MAX_MOVE_TYPES} supported", moves.len())
            ));
        }

        for m in &moves {
            if m.source == 0 && m.target == 0 {
                return Err(StrandError::InvalidMoveTable("0-0 moves do not consume any units".to_string()));
            }

            if m.log_prior.is_nan() || m.log_prior == f64::INFINITY {
                return Err(StrandError::InvalidMoveTable(
                    format!("move {}-{} has invalid log prior {}", m.source, m.target, m.log_prior)
                ));
            }
        }

        Ok(Self { moves })
    }

    /// The canonical five-move table of Gale & Church
    pub fn gale_church() -> Self {
        Self {
            moves: GALE_CHURCH_PRIORS.iter()
                .map(|&(s, t, p)| MoveType::from_prob(s, t, p))
                .collect()
        }
    }

    /// Table with every move's source and target swapped, in the same order
    pub fn mirrored(&self) -> Self {
        Self {
            moves: self.moves.iter().map(MoveType::mirrored).collect()
        }
    }

    #[inline(always)]
    pub fn get(&self, ix: usize) -> &MoveType {
        &self.moves[ix]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoveType> + '_ {
        self.moves.iter()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The highest prior among moves with the given dimensions, i.e., the one
    /// the aligner would pick among them. The first such move wins ties.
    pub fn best_prior(&self, source: usize, target: usize) -> Option<f64> {
        self.moves.iter()
            .filter(|m| m.source == source && m.target == target)
            .map(|m| m.log_prior)
            .reduce(|best, lp| if lp > best { lp } else { best })
    }
}

impl Default for MoveTable {
    fn default() -> Self {
        Self::gale_church()
    }
}

impl TryFrom<Vec<MoveType>> for MoveTable {
    type Error = StrandError;

    fn try_from(value: Vec<MoveType>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MoveTable> for Vec<MoveType> {
    fn from(value: MoveTable) -> Self {
        value.moves.into_vec()
    }
}
