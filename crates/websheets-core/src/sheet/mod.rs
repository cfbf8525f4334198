//! Sheet state and logic (UI-agnostic).

mod generation;
mod ops;
mod render;
mod selection;
mod state;
mod tools;

pub use generation::{GenerationCompletion, GenerationTask};
pub use render::{RenderPass, RenderedCell};
pub use selection::{Rect, Selection};
pub use state::{Sheet, SheetOptions};
