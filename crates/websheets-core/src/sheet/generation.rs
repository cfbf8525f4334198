//! Content-generation dispatch and completion.
//!
//! The sheet never awaits anything. A render pass (or the toolbar action)
//! hands out [`GenerationTask`]s; the caller drives each one on its own
//! executor and feeds the resulting [`GenerationCompletion`] back through
//! [`Sheet::complete_generation`] on the thread that owns the sheet.
//!
//! Every dispatched call holds a ticket. Row and column deletion moves the
//! ticket along with its cell, or drops it when the cell itself is deleted,
//! so a completion always lands on the cell that issued it or nowhere.
//! Completions are applied last-applied-wins: an edit made to the cell while
//! the call was running is overwritten, but the cell's formatting wrappers
//! are kept around the generated text.

use std::collections::HashMap;
use std::fmt;

use super::Sheet;
use crate::error::{Result, WebsheetsError};
use websheets_engine::engine::{
    CellRef, GenerationError, GenerationFuture, GenerationRequest, parse_styled,
};

/// A dispatched call that has not completed yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub(crate) ticket: u64,
    /// Raw content of the cell when the call was issued
    pub(crate) raw: String,
}

/// An in-flight generation call for one cell.
pub struct GenerationTask {
    /// Cell that issued the call, as of dispatch
    pub at: CellRef,
    pub request: GenerationRequest,
    ticket: u64,
    future: GenerationFuture,
}

impl GenerationTask {
    /// Wait for the backend and package the result for the sheet.
    pub async fn run(self) -> GenerationCompletion {
        let result = self.future.await;
        GenerationCompletion {
            at: self.at,
            ticket: self.ticket,
            result,
        }
    }
}

impl fmt::Debug for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationTask")
            .field("at", &self.at)
            .field("request", &self.request)
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// The outcome of a [`GenerationTask`], ready to apply to the sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationCompletion {
    /// Cell that issued the call, as of dispatch
    pub at: CellRef,
    ticket: u64,
    pub result: std::result::Result<String, GenerationError>,
}

impl Sheet {
    /// Dispatch `request` for the cell at `at`.
    ///
    /// A call already in flight for the same cell is superseded; its
    /// completion will be dropped.
    pub fn request_generation(
        &mut self,
        at: CellRef,
        request: GenerationRequest,
    ) -> Result<GenerationTask> {
        let generator = self
            .generator
            .clone()
            .ok_or(WebsheetsError::Generation(GenerationError::Unavailable))?;
        let raw = self
            .grid
            .cell(&at)
            .ok_or(WebsheetsError::CellOutOfBounds(at))?
            .to_string();

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        log::debug!(
            "requesting generation #{} for {} from {}",
            ticket,
            at,
            request.model
        );
        self.failed.remove(&at);
        self.in_flight.insert(at, InFlight { ticket, raw });
        let future = generator.generate(request.clone());
        Ok(GenerationTask {
            at,
            request,
            ticket,
            future,
        })
    }

    /// Toolbar action: generate into the selected cell with the configured
    /// default prompt and model.
    pub fn generate_into_selection(&mut self) -> Result<GenerationTask> {
        let at = self.selection.anchor().ok_or(WebsheetsError::NoSelection)?;
        let request = GenerationRequest {
            model: self.options.model.clone(),
            prompt: self.options.prompt.clone(),
            max_output_tokens: self.options.max_output_tokens,
        };
        self.request_generation(at, request)
    }

    /// Apply a finished generation call. Returns whether the cell changed.
    ///
    /// Failures are logged and leave the cell's raw content as it was.
    /// Completions for deleted or superseded calls are dropped.
    pub fn complete_generation(&mut self, completion: GenerationCompletion) -> bool {
        let GenerationCompletion { at, ticket, result } = completion;
        let Some(current) = self
            .in_flight
            .iter()
            .find_map(|(cell, pending)| (pending.ticket == ticket).then_some(*cell))
        else {
            log::warn!(
                "dropping generated content for {}: the cell was deleted or re-requested",
                at
            );
            return false;
        };
        let Some(InFlight { raw, .. }) = self.in_flight.remove(&current) else {
            return false;
        };

        let text = match result {
            Ok(text) => text,
            Err(err) => {
                log::error!("content generation for {} failed: {}", current, err);
                self.failed.insert(current, raw);
                return false;
            }
        };

        let text = text.trim();
        let Some(existing) = self.grid.cell(&current) else {
            log::warn!("dropping generated content for {}: cell no longer exists", current);
            return false;
        };
        let styled = parse_styled(existing);
        let mut content = styled.rewrap(text);
        if parse_styled(&content).content != text {
            // Generated text that reads as markup would change the layers.
            log::debug!("storing generated content for {} without its formatting", current);
            content = text.to_string();
        }
        if !self.grid.set(current.row, current.col, content.clone()) {
            return false;
        }
        self.sync_formula_bar(&current, &content);
        true
    }

    /// Allow a failed `LLM(...)` cell to be dispatched again on the next
    /// render. Returns whether the cell had failed.
    pub fn retry_generation(&mut self, at: &CellRef) -> bool {
        self.failed.remove(at).is_some()
    }

    pub fn pending_generations(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a render should dispatch a generation call for `raw` at `at`.
    pub(crate) fn should_dispatch(&self, at: &CellRef, raw: &str) -> bool {
        let in_flight = self.in_flight.get(at).is_some_and(|pending| pending.raw == raw);
        let failed = self.failed.get(at).is_some_and(|prev| prev == raw);
        !in_flight && !failed
    }

    /// Move pending and failed generation state along with a row or column
    /// deletion. `shift` maps a coordinate to its new place, or `None` when
    /// the cell was deleted.
    pub(crate) fn remap_generations(&mut self, shift: impl Fn(CellRef) -> Option<CellRef>) {
        fn remap<V>(map: &mut HashMap<CellRef, V>, shift: &impl Fn(CellRef) -> Option<CellRef>) {
            *map = std::mem::take(map)
                .into_iter()
                .filter_map(|(at, value)| shift(at).map(|moved| (moved, value)))
                .collect();
        }
        remap(&mut self.in_flight, &shift);
        remap(&mut self.failed, &shift);
    }
}
