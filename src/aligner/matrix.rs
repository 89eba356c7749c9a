use std::mem::size_of;

use crate::errors::StrandError;

/// Default cap on the number of cells of a single DP matrix
pub const DEFAULT_MAX_CELLS: usize = 1_000_000_000;

/// A dense, row-major DP matrix stored in a single flat allocation.
///
/// Rows correspond to source positions (0..=|source|), columns to target
/// positions (0..=|target|). The dimensions are validated once on construction,
/// cell access only computes the `row * cols + col` offset.
#[derive(Debug, Clone)]
pub struct DpMatrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> DpMatrix<T>
where
    T: Copy,
{
    /// Allocate a `rows x cols` matrix, refusing anything with more than
    /// `max_cells` cells.
    pub fn new(rows: usize, cols: usize, fill: T, max_cells: usize) -> Result<Self, StrandError> {
        let num_cells = rows.checked_mul(cols)
            .filter(|cells| *cells <= max_cells)
            .filter(|cells| {
                cells.checked_mul(size_of::<T>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(StrandError::MatrixTooLarge { rows, cols })?;

        Ok(Self {
            data: vec![fill; num_cells],
            rows,
            cols,
        })
    }

    /// Allocate the matrix for aligning sequences of the given lengths,
    /// i.e., with one extra row and column for the empty prefix.
    pub fn for_sequences(source_len: usize, target_len: usize, fill: T, max_cells: usize) -> Result<Self, StrandError> {
        let rows = source_len.checked_add(1)
            .ok_or(StrandError::MatrixTooLarge { rows: source_len, cols: target_len })?;
        let cols = target_len.checked_add(1)
            .ok_or(StrandError::MatrixTooLarge { rows: source_len, cols: target_len })?;

        Self::new(rows, cols, fill, max_cells)
            .map_err(|_| StrandError::MatrixTooLarge { rows: source_len, cols: target_len })
    }

    #[inline(always)]
    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols, "Cell ({row}, {col}) out of bounds!");
        row * self.cols + col
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.offset(row, col)]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let offset = self.offset(row, col);
        self.data[offset] = value;
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }
}
