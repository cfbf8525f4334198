//! Rectangular raw-content store.
//!
//! The grid holds one raw content string per cell plus the ordered column
//! header labels. Every row always has exactly `headers.len()` cells; the
//! only code that changes either dimension lives in the mutator module and
//! updates headers and rows together.
//!
//! Nothing computed is stored here. Display values are derived from raw
//! content on demand by the [`Evaluator`](super::Evaluator).

use serde::{Deserialize, Serialize};

use super::cell_ref::CellRef;

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
}

impl Grid {
    /// Create a grid of empty cells with headers `A, B, C, ...`.
    pub fn new(rows: usize, cols: usize) -> Self {
        let headers = (0..cols).map(CellRef::col_to_letters).collect();
        let rows = vec![vec![String::new(); cols]; rows];
        Grid { headers, rows }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.headers.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Raw content at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn cell(&self, at: &CellRef) -> Option<&str> {
        self.get(at.row, at.col)
    }

    pub fn contains(&self, at: &CellRef) -> bool {
        at.row < self.rows() && at.col < self.cols()
    }

    /// Overwrite the raw content at `(row, col)`.
    ///
    /// Out-of-range coordinates are a no-op and return `false`; completions
    /// of long-running generation calls rely on this when the target row or
    /// column was deleted in the meantime.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Index of the first header carrying `label`.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    /// Map a reference token such as `C12` to in-bounds grid coordinates.
    pub fn locate(&self, token: &str) -> Option<CellRef> {
        let (letters, row) = CellRef::split_token(token)?;
        let col = self.column_index(letters)?;
        let at = CellRef::new(row, col);
        self.contains(&at).then_some(at)
    }

    /// Iterate rows of raw content, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}
