//! Row and column insertion/deletion.
//!
//! Rows and columns are only ever appended at the end or removed by index.
//! Removal is destructive: nothing about a deleted row or column survives,
//! so re-adding one yields empty cells.
//!
//! Formulas elsewhere in the grid are not rewritten. A reference like `C1`
//! keeps naming whichever column currently carries the `C` header.

use super::cell_ref::CellRef;
use super::grid::Grid;

impl Grid {
    /// Append a row of empty cells, one per header.
    pub fn add_row(&mut self) {
        self.rows.push(vec![String::new(); self.headers.len()]);
    }

    /// Remove row `at`, shifting later rows up by one.
    /// Returns the removed raw contents, or `None` if `at` is out of range.
    pub fn delete_row(&mut self, at: usize) -> Option<Vec<String>> {
        (at < self.rows.len()).then(|| self.rows.remove(at))
    }

    /// Append a column and return its header label.
    ///
    /// The label is the one at position `cols()` in the `A, B, ..., Z, AA`
    /// sequence. If an earlier deletion left that label in use, the next
    /// unused one is taken so headers stay unique.
    pub fn add_column(&mut self) -> String {
        let mut position = self.headers.len();
        let mut label = CellRef::col_to_letters(position);
        while self.headers.contains(&label) {
            position += 1;
            label = CellRef::col_to_letters(position);
        }

        self.headers.push(label.clone());
        for row in &mut self.rows {
            row.push(String::new());
        }
        label
    }

    /// Remove header `at` and cell `at` from every row.
    /// Returns the removed header label, or `None` (grid untouched) if `at`
    /// is out of range.
    pub fn delete_column(&mut self, at: usize) -> Option<String> {
        if at >= self.headers.len() {
            return None;
        }
        let label = self.headers.remove(at);
        for row in &mut self.rows {
            row.remove(at);
        }
        Some(label)
    }
}
