use std::cmp::Ordering;

use super::Sheet;
use crate::error::{Result, WebsheetsError};
use websheets_engine::engine::CellRef;

impl Sheet {
    /// Append an empty row at the bottom.
    pub fn add_row(&mut self) {
        self.grid.add_row();
        log::debug!("added row {}", self.grid.rows());
    }

    /// Delete row `at`; later rows move up by one.
    pub fn delete_row(&mut self, at: usize) -> Result<()> {
        let rows = self.grid.rows();
        self.grid
            .delete_row(at)
            .ok_or(WebsheetsError::RowOutOfBounds { row: at, rows })?;
        self.remap_generations(|cell| match cell.row.cmp(&at) {
            Ordering::Less => Some(cell),
            Ordering::Equal => None,
            Ordering::Greater => Some(CellRef::new(cell.row - 1, cell.col)),
        });
        log::debug!("deleted row {}", at + 1);
        Ok(())
    }

    /// Append an empty column and return its header label.
    pub fn add_column(&mut self) -> String {
        let label = self.grid.add_column();
        log::debug!("added column {}", label);
        label
    }

    /// Delete column `at` and return its header label.
    pub fn delete_column(&mut self, at: usize) -> Result<String> {
        let cols = self.grid.cols();
        let label = self
            .grid
            .delete_column(at)
            .ok_or(WebsheetsError::ColumnOutOfBounds { col: at, cols })?;
        self.remap_generations(|cell| match cell.col.cmp(&at) {
            Ordering::Less => Some(cell),
            Ordering::Equal => None,
            Ordering::Greater => Some(CellRef::new(cell.row, cell.col - 1)),
        });
        log::debug!("deleted column {}", label);
        Ok(label)
    }
}
