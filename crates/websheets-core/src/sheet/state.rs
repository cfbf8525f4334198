use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, WebsheetsError};
use websheets_engine::engine::{
    CellRef, ContentGenerator, DEFAULT_COLS, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL,
    DEFAULT_PROMPT, DEFAULT_ROWS, Evaluator, FunctionRegistry, Grid, Outcome, Wrapper,
    parse_styled,
};

use super::Selection;
use super::generation::InFlight;

/// Startup settings for a sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetOptions {
    pub rows: usize,
    pub cols: usize,
    /// Model used by the toolbar's "generate into selection" action.
    pub model: String,
    /// Prompt used by the toolbar's "generate into selection" action.
    pub prompt: String,
    /// Token limit for every generation request.
    pub max_output_tokens: u32,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// UI-agnostic session state for one sheet.
pub struct Sheet {
    /// Raw cell content and headers
    pub(crate) grid: Grid,
    /// Rhai engine with the built-in functions
    pub(crate) registry: FunctionRegistry,
    /// Content-generation backend; `None` when there is no active credential
    pub(crate) generator: Option<Arc<dyn ContentGenerator>>,
    pub(crate) options: SheetOptions,
    pub(crate) selection: Selection,
    /// Text shown in the formula bar, mirroring the anchor cell's raw content
    pub(crate) formula_bar: String,
    /// Formatting tool applied on pointer-enter, if any
    pub(crate) active_tool: Option<Wrapper>,
    /// Generation calls dispatched and not yet completed, keyed by the
    /// cell's current coordinate
    pub(crate) in_flight: HashMap<CellRef, InFlight>,
    /// Ticket for the next dispatched call
    pub(crate) next_ticket: u64,
    /// Raw content whose generation call failed; not re-dispatched until the
    /// content changes or a retry is requested
    pub(crate) failed: HashMap<CellRef, String>,
}

impl Sheet {
    /// Create a sheet with default dimensions and no generation backend.
    pub fn new() -> Self {
        Self::with_options(SheetOptions::default())
    }

    pub fn with_options(options: SheetOptions) -> Self {
        Sheet {
            grid: Grid::new(options.rows, options.cols),
            registry: FunctionRegistry::new(),
            generator: None,
            options,
            selection: Selection::Idle,
            formula_bar: String::new(),
            active_tool: None,
            in_flight: HashMap::new(),
            next_ticket: 0,
            failed: HashMap::new(),
        }
    }

    /// Attach a content-generation backend.
    pub fn with_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Swap the content-generation backend, e.g. when a credential is
    /// entered or revoked. Calls already in flight still complete.
    pub fn set_generator(&mut self, generator: Option<Arc<dyn ContentGenerator>>) {
        self.generator = generator;
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn headers(&self) -> &[String] {
        self.grid.headers()
    }

    /// Raw content at `(row, col)`, or `None` outside the sheet.
    pub fn raw(&self, row: usize, col: usize) -> Option<&str> {
        self.grid.get(row, col)
    }

    /// Replace the raw content of a cell.
    pub fn set_cell(&mut self, at: CellRef, raw: impl Into<String>) -> Result<()> {
        let raw = raw.into();
        if !self.grid.set(at.row, at.col, raw.clone()) {
            return Err(WebsheetsError::CellOutOfBounds(at));
        }
        self.sync_formula_bar(&at, &raw);
        Ok(())
    }

    /// Look up a cell by reference token (`B3`) using the current headers.
    pub fn locate(&self, token: &str) -> Option<CellRef> {
        self.grid.locate(token)
    }

    /// Evaluator over the current grid. Generation is enabled only when a
    /// backend is attached.
    pub fn evaluator(&self) -> Evaluator<'_> {
        let evaluator = Evaluator::new(&self.grid, &self.registry);
        match self.generator {
            Some(_) => evaluator.with_generation(self.options.max_output_tokens),
            None => evaluator,
        }
    }

    /// Evaluate one cell, looking through its formatting wrappers.
    pub fn evaluate(&self, at: &CellRef) -> Option<Outcome> {
        let raw = self.grid.cell(at)?;
        let content = parse_styled(raw).content;
        Some(self.evaluator().evaluate(content, at))
    }

    /// Display value of one cell.
    pub fn display(&self, at: &CellRef) -> Option<String> {
        self.evaluate(at).map(|outcome| outcome.display())
    }

    /// Keep the formula bar in step when the anchor cell changes underneath it.
    pub(crate) fn sync_formula_bar(&mut self, at: &CellRef, raw: &str) {
        if self.selection.anchor() == Some(*at) {
            self.formula_bar = raw.to_string();
        }
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("grid", &self.grid)
            .field("has_generator", &self.generator.is_some())
            .field("selection", &self.selection)
            .field("active_tool", &self.active_tool)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
