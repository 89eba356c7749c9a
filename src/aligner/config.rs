use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aligner::cost_models::{GaussianLengthCost, LengthCostPolicy};
use crate::aligner::length::LengthAligner;
use crate::aligner::matrix::DEFAULT_MAX_CELLS;
use crate::aligner::moves::MoveTable;
use crate::errors::StrandError;

/// Serializable configuration of a [`LengthAligner`]. Missing fields take the
/// Gale & Church defaults, so `{}` is a valid configuration.
///
/// ```json
/// {
///   "moves": [
///     {"source": 1, "target": 1, "prob": 0.89},
///     {"source": 1, "target": 0, "prob": 0.005},
///     {"source": 0, "target": 1, "prob": 0.005}
///   ],
///   "length_cost": {"ratio": 1.1, "variance": 6.8},
///   "policy": "two_sided_only",
///   "max_cells": 100000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthAlignerConfig {
    pub moves: MoveTable,
    pub length_cost: GaussianLengthCost,
    pub policy: LengthCostPolicy,

    /// Largest DP grid, in cells, an alignment may allocate
    pub max_cells: usize,
}

impl Default for LengthAlignerConfig {
    fn default() -> Self {
        Self {
            moves: MoveTable::default(),
            length_cost: GaussianLengthCost::default(),
            policy: LengthCostPolicy::default(),
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl LengthAlignerConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self, StrandError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StrandError> {
        let file = File::open(path)
            .map_err(|e| StrandError::FileReadError { source: e })?;

        Self::from_reader(BufReader::new(file))
    }

    pub fn build(&self) -> LengthAligner<GaussianLengthCost> {
        LengthAligner::new(self.moves.clone(), self.length_cost)
            .with_policy(self.policy)
            .with_max_cells(self.max_cells)
    }
}
