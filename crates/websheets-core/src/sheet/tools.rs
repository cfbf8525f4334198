//! Formatting tools.
//!
//! A toolbar click applies a wrapper once to every selected cell. Picking an
//! active tool instead applies it to each cell the pointer enters, until the
//! tool is cleared explicitly or with Escape.

use super::Sheet;
use crate::error::{Result, WebsheetsError};
use websheets_engine::engine::{CellRef, Wrapper};

impl Sheet {
    /// Wrap every selected cell in `wrapper`. Returns how many cells changed.
    pub fn format_selection(&mut self, wrapper: &Wrapper) -> Result<usize> {
        let cells = self.selection.cells();
        if cells.is_empty() {
            return Err(WebsheetsError::NoSelection);
        }
        Ok(cells
            .iter()
            .filter(|at| self.apply_wrapper(at, wrapper))
            .count())
    }

    pub fn active_tool(&self) -> Option<&Wrapper> {
        self.active_tool.as_ref()
    }

    pub fn set_active_tool(&mut self, tool: Option<Wrapper>) {
        if let Some(tool) = &tool {
            log::debug!("active tool: {}", tool);
        }
        self.active_tool = tool;
    }

    pub fn clear_active_tool(&mut self) {
        self.active_tool = None;
    }

    /// Leave continuous-apply mode. Returns whether a tool was active.
    pub fn escape(&mut self) -> bool {
        self.active_tool.take().is_some()
    }

    /// Pointer entered a cell: apply the active tool, if any, to it.
    /// Returns whether the cell changed.
    pub fn pointer_enter(&mut self, at: CellRef) -> bool {
        match self.active_tool.clone() {
            Some(tool) => self.apply_wrapper(&at, &tool),
            None => false,
        }
    }

    fn apply_wrapper(&mut self, at: &CellRef, wrapper: &Wrapper) -> bool {
        let Some(raw) = self.grid.cell(at) else {
            return false;
        };
        let wrapped = wrapper.apply(raw);
        self.grid.set(at.row, at.col, wrapped.clone());
        self.sync_formula_bar(at, &wrapped);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_single_cell_twice_nests() {
        let mut sheet = Sheet::new();
        sheet.set_cell(CellRef::new(0, 0), "x").unwrap();
        sheet.select(CellRef::new(0, 0)).unwrap();
        sheet.format_selection(&Wrapper::Bold).unwrap();
        sheet.format_selection(&Wrapper::Bold).unwrap();
        assert_eq!(sheet.raw(0, 0), Some("bold(bold(x))"));
        assert_eq!(sheet.formula_bar(), "bold(bold(x))");
    }

    #[test]
    fn test_format_range() {
        let mut sheet = Sheet::new();
        sheet.select(CellRef::new(0, 0)).unwrap();
        sheet.extend_selection(CellRef::new(1, 1)).unwrap();
        let changed = sheet
            .format_selection(&Wrapper::TextColor("red".into()))
            .unwrap();
        assert_eq!(changed, 4);
        assert_eq!(sheet.raw(1, 1), Some("textColor(red, )"));
        assert_eq!(sheet.raw(2, 2), Some(""));
    }

    #[test]
    fn test_format_without_selection() {
        let mut sheet = Sheet::new();
        assert_eq!(
            sheet.format_selection(&Wrapper::Italic),
            Err(WebsheetsError::NoSelection)
        );
    }

    #[test]
    fn test_active_tool_applies_on_pointer_enter() {
        let mut sheet = Sheet::new();
        sheet.set_cell(CellRef::new(0, 0), "a").unwrap();
        assert!(!sheet.pointer_enter(CellRef::new(0, 0)));

        sheet.set_active_tool(Some(Wrapper::Underline));
        assert!(sheet.pointer_enter(CellRef::new(0, 0)));
        assert!(sheet.pointer_enter(CellRef::new(0, 0)));
        assert_eq!(sheet.raw(0, 0), Some("underline(underline(a))"));
        assert!(!sheet.pointer_enter(CellRef::new(99, 0)));
    }

    #[test]
    fn test_active_tool_ignores_selection() {
        let mut sheet = Sheet::new();
        sheet.select(CellRef::new(5, 0)).unwrap();
        sheet.set_active_tool(Some(Wrapper::Center));
        sheet.pointer_enter(CellRef::new(0, 3));
        assert_eq!(sheet.raw(0, 3), Some("center()"));
        assert_eq!(sheet.raw(5, 0), Some(""));
    }

    #[test]
    fn test_escape_exits_tool() {
        let mut sheet = Sheet::new();
        sheet.set_active_tool(Some(Wrapper::Bold));
        assert!(sheet.escape());
        assert!(!sheet.escape());
        assert!(!sheet.pointer_enter(CellRef::new(0, 0)));
        assert_eq!(sheet.raw(0, 0), Some(""));

        sheet.set_active_tool(Some(Wrapper::Bold));
        sheet.clear_active_tool();
        assert_eq!(sheet.active_tool(), None);
    }
}
