//! Row-major cell grids
//!
//! [`Grid`] backs the character framebuffers as well as the per-cell state
//! of the overlay compositors. Capacity is fixed at the largest supported
//! model, so no allocation happens after construction.

use heapless::Vec;

use blc_protocol::MAX_CELLS;

use crate::backend::DisplayError;

/// Character code of an empty cell
pub const BLANK: u8 = b' ';

/// Fixed-capacity two-dimensional grid with bounds-checked access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: u8,
    cols: u8,
    cells: Vec<T, MAX_CELLS>,
}

/// Framebuffer of device character codes
pub type Framebuffer = Grid<u8>;

impl<T: Copy> Grid<T> {
    /// Create a `rows × cols` grid filled with `value`
    ///
    /// Fails with `BufferOverflow` if the grid does not fit `MAX_CELLS`.
    pub fn new(rows: u8, cols: u8, value: T) -> Result<Self, DisplayError> {
        if rows == 0 || cols == 0 {
            return Err(DisplayError::InvalidCoordinates);
        }
        let len = usize::from(rows) * usize::from(cols);
        let mut cells = Vec::new();
        cells
            .resize(len, value)
            .map_err(|_| DisplayError::BufferOverflow)?;
        Ok(Self { rows, cols, cells })
    }

    /// Number of rows
    pub const fn rows(&self) -> u8 {
        self.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> u8 {
        self.cols
    }

    fn index(&self, row: u8, col: u8) -> Option<usize> {
        (row < self.rows && col < self.cols)
            .then(|| usize::from(row) * usize::from(self.cols) + usize::from(col))
    }

    /// Value at a cell, `None` when out of bounds
    pub fn get(&self, row: u8, col: u8) -> Option<T> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Set a cell
    pub fn set(&mut self, row: u8, col: u8, value: T) -> Result<(), DisplayError> {
        let i = self
            .index(row, col)
            .ok_or(DisplayError::InvalidCoordinates)?;
        self.cells[i] = value;
        Ok(())
    }

    /// One row as a slice
    pub fn row(&self, row: u8) -> Option<&[T]> {
        let start = self.index(row, 0)?;
        Some(&self.cells[start..start + usize::from(self.cols)])
    }

    /// Mutable access to one row
    pub fn row_mut(&mut self, row: u8) -> Option<&mut [T]> {
        let start = self.index(row, 0)?;
        let cols = usize::from(self.cols);
        Some(&mut self.cells[start..start + cols])
    }

    /// Set every cell to `value`
    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|c| *c = value);
    }

    /// Copy all cells from a grid of the same shape
    pub fn copy_from(&mut self, other: &Self) -> Result<(), DisplayError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.cells.copy_from_slice(&other.cells);
        Ok(())
    }

    /// All cells, row-major
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

impl Grid<u8> {
    /// Write bytes starting at a cell, clipped at the end of the row
    ///
    /// Returns the number of bytes written.
    pub fn write_bytes(&mut self, row: u8, col: u8, text: &[u8]) -> Result<usize, DisplayError> {
        if col >= self.cols {
            return Err(DisplayError::InvalidCoordinates);
        }
        let line = self.row_mut(row).ok_or(DisplayError::InvalidCoordinates)?;
        let dst = &mut line[usize::from(col)..];
        let n = dst.len().min(text.len());
        dst[..n].copy_from_slice(&text[..n]);
        Ok(n)
    }
}
