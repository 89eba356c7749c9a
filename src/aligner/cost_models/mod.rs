use serde::{Deserialize, Serialize};

pub mod gaussian;

pub use gaussian::GaussianLengthCost;

/// Log-likelihood of aligning a span of source units with a span of target
/// units, given only their total lengths.
pub trait LengthCostModel {
    fn length_cost(&self, source_len: usize, target_len: usize) -> f64;
}

/// Which moves the length cost is applied to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthCostPolicy {
    /// Add the length cost to every move, including 1-0 and 0-1 moves
    #[default]
    AllMoves,

    /// Only add the length cost for moves consuming units on both sides.
    /// Single-sided moves are scored by their prior alone.
    TwoSidedOnly,
}

impl LengthCostPolicy {
    #[inline(always)]
    pub fn applies(&self, source_units: usize, target_units: usize) -> bool {
        match self {
            Self::AllMoves => true,
            Self::TwoSidedOnly => source_units > 0 && target_units > 0,
        }
    }
}
