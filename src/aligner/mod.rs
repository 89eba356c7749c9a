pub mod alignment;
pub mod config;
pub mod cost_models;
pub mod grid;
pub mod length;
pub mod matrix;
pub mod moves;
pub mod utils;

pub use alignment::{Alignment, AlignmentBead, IndexPair};
pub use config::LengthAlignerConfig;
pub use cost_models::{GaussianLengthCost, LengthCostModel, LengthCostPolicy};
pub use grid::{GridAligner, GridAlignment};
pub use length::{align_lengths, LengthAligner, LengthAlignment};
pub use moves::{MoveTable, MoveType};
