use std::ops::Range;

use serde::{Deserialize, Serialize};

/// An aligned pair of tokens. The first element is the source position,
/// the second the target position.
///
/// In case of an insertion or deletion, one of the elements is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPair {
    pub source: Option<usize>,
    pub target: Option<usize>,
}

impl IndexPair {
    pub fn new(source: Option<usize>, target: Option<usize>) -> Self {
        debug_assert!(source.is_some() || target.is_some(), "An index pair can't be a gap on both sides!");
        Self { source, target }
    }

    pub fn aligned(source: usize, target: usize) -> Self {
        Self::new(Some(source), Some(target))
    }

    pub fn deletion(source: usize) -> Self {
        Self::new(Some(source), None)
    }

    pub fn insertion(target: usize) -> Self {
        Self::new(None, Some(target))
    }

    pub fn is_aligned(&self) -> bool {
        matches!((self.source, self.target), (Some(_), Some(_)))
    }

    pub fn is_indel(&self) -> bool {
        !self.is_aligned()
    }

    /// Positions with `-1` marking a gap
    pub fn as_signed(&self) -> (isize, isize) {
        let to_signed = |pos: Option<usize>| pos.map_or(-1, |p| p as isize);

        (to_signed(self.source), to_signed(self.target))
    }
}

impl From<(usize, usize)> for IndexPair {
    fn from((source, target): (usize, usize)) -> Self {
        Self::aligned(source, target)
    }
}

pub type Alignment = Vec<IndexPair>;

/// A contiguous source range aligned to a contiguous target range. Either
/// range may be empty, but not both.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentBead {
    pub source: Range<usize>,
    pub target: Range<usize>,
}

impl AlignmentBead {
    pub fn new(source: Range<usize>, target: Range<usize>) -> Self {
        Self { source, target }
    }

    #[inline]
    pub fn source_units(&self) -> usize {
        self.source.len()
    }

    #[inline]
    pub fn target_units(&self) -> usize {
        self.target.len()
    }

    pub fn is_two_sided(&self) -> bool {
        !self.source.is_empty() && !self.target.is_empty()
    }

    /// The bead with source and target swapped
    pub fn mirrored(&self) -> Self {
        Self::new(self.target.clone(), self.source.clone())
    }
}
