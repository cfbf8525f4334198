//! Cell selection and the formula bar.
//!
//! A plain click selects one cell (the anchor) and loads its raw content
//! into the formula bar. A range-extending click spans a rectangle from the
//! anchor to the clicked cell. Edits in the formula bar are written straight
//! back to the anchor cell.
//!
//! Row and column deletion does not renumber the selection.

use super::Sheet;
use crate::error::{Result, WebsheetsError};
use websheets_engine::engine::CellRef;

/// A normalised rectangle of cells, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Rect {
    /// The rectangle spanned by two corners, in either order.
    pub fn spanning(a: &CellRef, b: &CellRef) -> Self {
        Rect {
            start_row: a.row.min(b.row),
            end_row: a.row.max(b.row),
            start_col: a.col.min(b.col),
            end_col: a.col.max(b.col),
        }
    }

    pub fn contains(&self, at: &CellRef) -> bool {
        at.row >= self.start_row
            && at.row <= self.end_row
            && at.col >= self.start_col
            && at.col <= self.end_col
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + use<> {
        let (start_col, end_col) = (self.start_col, self.end_col);
        (self.start_row..=self.end_row)
            .flat_map(move |row| (start_col..=end_col).map(move |col| CellRef::new(row, col)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Single(CellRef),
    Range { anchor: CellRef, rect: Rect },
}

impl Selection {
    /// The cell the formula bar is bound to.
    pub fn anchor(&self) -> Option<CellRef> {
        match self {
            Selection::Idle => None,
            Selection::Single(at) | Selection::Range { anchor: at, .. } => Some(*at),
        }
    }

    pub fn rect(&self) -> Option<Rect> {
        match self {
            Selection::Idle => None,
            Selection::Single(at) => Some(Rect::spanning(at, at)),
            Selection::Range { rect, .. } => Some(*rect),
        }
    }

    pub fn contains(&self, at: &CellRef) -> bool {
        self.rect().is_some_and(|rect| rect.contains(at))
    }

    /// Selected cells in row-major order.
    pub fn cells(&self) -> Vec<CellRef> {
        self.rect().map(|rect| rect.cells().collect()).unwrap_or_default()
    }
}

impl Sheet {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn formula_bar(&self) -> &str {
        &self.formula_bar
    }

    /// Plain click: select a single cell and load it into the formula bar.
    pub fn select(&mut self, at: CellRef) -> Result<()> {
        let raw = self
            .grid
            .cell(&at)
            .ok_or(WebsheetsError::CellOutOfBounds(at))?
            .to_string();
        self.selection = Selection::Single(at);
        self.formula_bar = raw;
        Ok(())
    }

    /// Range-extending click: span from the current anchor to `at`.
    ///
    /// With nothing selected this behaves like [`Sheet::select`].
    pub fn extend_selection(&mut self, at: CellRef) -> Result<()> {
        if !self.grid.contains(&at) {
            return Err(WebsheetsError::CellOutOfBounds(at));
        }
        match self.selection.anchor() {
            Some(anchor) => {
                self.selection = Selection::Range {
                    anchor,
                    rect: Rect::spanning(&anchor, &at),
                };
                Ok(())
            }
            None => self.select(at),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Idle;
        self.formula_bar.clear();
    }

    /// Replace the formula bar text and write it through to the anchor cell.
    ///
    /// An anchor left outside the sheet by a deletion only updates the bar.
    pub fn edit_formula_bar(&mut self, text: impl Into<String>) -> Result<()> {
        let anchor = self.selection.anchor().ok_or(WebsheetsError::NoSelection)?;
        self.formula_bar = text.into();
        if !self.grid.set(anchor.row, anchor.col, self.formula_bar.clone()) {
            log::debug!("formula bar anchor {} is outside the sheet", anchor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalised_regardless_of_click_order() {
        let expected = Rect {
            start_row: 0,
            end_row: 2,
            start_col: 1,
            end_col: 3,
        };

        let mut sheet = Sheet::new();
        sheet.select(CellRef::new(2, 3)).unwrap();
        sheet.extend_selection(CellRef::new(0, 1)).unwrap();
        assert_eq!(sheet.selection().rect(), Some(expected));

        sheet.select(CellRef::new(0, 1)).unwrap();
        sheet.extend_selection(CellRef::new(2, 3)).unwrap();
        assert_eq!(sheet.selection().rect(), Some(expected));
    }

    #[test]
    fn test_plain_click_returns_to_single() {
        let mut sheet = Sheet::new();
        sheet.select(CellRef::new(0, 0)).unwrap();
        sheet.extend_selection(CellRef::new(1, 1)).unwrap();
        assert!(matches!(sheet.selection(), Selection::Range { .. }));

        sheet.select(CellRef::new(3, 3)).unwrap();
        assert_eq!(sheet.selection(), Selection::Single(CellRef::new(3, 3)));
    }

    #[test]
    fn test_extend_keeps_first_anchor() {
        let mut sheet = Sheet::new();
        sheet.select(CellRef::new(1, 1)).unwrap();
        sheet.extend_selection(CellRef::new(3, 3)).unwrap();
        sheet.extend_selection(CellRef::new(0, 0)).unwrap();
        let selection = sheet.selection();
        assert_eq!(selection.anchor(), Some(CellRef::new(1, 1)));
        assert_eq!(selection.cells().len(), 4);
        assert!(selection.contains(&CellRef::new(0, 1)));
        assert!(!selection.contains(&CellRef::new(2, 2)));
    }

    #[test]
    fn test_extend_from_idle_selects() {
        let mut sheet = Sheet::new();
        sheet.extend_selection(CellRef::new(2, 2)).unwrap();
        assert_eq!(sheet.selection(), Selection::Single(CellRef::new(2, 2)));
    }

    #[test]
    fn test_formula_bar_write_through() {
        let mut sheet = Sheet::new();
        sheet.set_cell(CellRef::new(1, 0), "=1+1").unwrap();
        sheet.select(CellRef::new(1, 0)).unwrap();
        assert_eq!(sheet.formula_bar(), "=1+1");

        sheet.edit_formula_bar("=A1+40").unwrap();
        assert_eq!(sheet.raw(1, 0), Some("=A1+40"));
        assert_eq!(sheet.display(&CellRef::new(1, 0)).as_deref(), Some("40"));
    }

    #[test]
    fn test_formula_bar_requires_selection() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.edit_formula_bar("x"), Err(WebsheetsError::NoSelection));
    }

    #[test]
    fn test_select_out_of_bounds() {
        let mut sheet = Sheet::new();
        assert!(sheet.select(CellRef::new(0, 5)).is_err());
        assert_eq!(sheet.selection(), Selection::Idle);
    }

    #[test]
    fn test_rect_cells_row_major() {
        let rect = Rect::spanning(&CellRef::new(1, 1), &CellRef::new(0, 0));
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellRef::new(0, 0),
                CellRef::new(0, 1),
                CellRef::new(1, 0),
                CellRef::new(1, 1),
            ]
        );
    }
}
