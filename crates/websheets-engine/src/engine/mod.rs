//! Spreadsheet engine API.
//!
//! This module provides the formula engine for the sheet:
//!
//! - [`Grid`] - Raw cell content and column headers, with row/column mutation
//! - [`CellRef`] - Cell coordinates and reference token splitting
//! - [`Evaluator`] - Turns raw content into an [`Outcome`], resolving references
//! - [`FunctionRegistry`] - The Rhai engine with built-in math functions
//! - [`Wrapper`], [`parse_styled`] - Formatting wrapper markup and its style
//! - [`ContentGenerator`] - Backend seam for `LLM(prompt, model)` calls

mod cell_ref;
mod error;
mod eval;
mod format;
mod generate;
mod grid;
mod markup;
mod mutate;
mod preprocess;
mod registry;
mod resolve;

pub use cell_ref::CellRef;
pub use error::{ERROR_SENTINEL, EvalError, PENDING_SENTINEL, REF_SENTINEL};
pub use eval::{Evaluator, Outcome};
pub use format::{format_dynamic, format_number};
pub use generate::{
    ContentGenerator, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_PROMPT, GenerationError,
    GenerationFuture, GenerationRequest, LLM_FUNCTION, parse_llm_call,
};
pub use grid::{DEFAULT_COLS, DEFAULT_ROWS, Grid};
pub use markup::{Align, CellStyle, Styled, Wrapper, parse_styled};
pub use preprocess::preprocess_formula;
pub use registry::{FunctionRegistry, create_engine};
pub use resolve::MAX_REFERENCE_DEPTH;

pub use rhai::Dynamic;
