//! websheets-core - UI-agnostic sheet model.

pub mod error;
pub mod sheet;

pub use error::{Result, WebsheetsError};
pub use sheet::{
    GenerationCompletion, GenerationTask, Rect, RenderPass, RenderedCell, Selection, Sheet,
    SheetOptions,
};

pub use websheets_engine::engine::{CellRef, CellStyle, ContentGenerator, Wrapper};
