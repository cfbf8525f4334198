use super::{GenerationTask, Sheet};
use websheets_engine::engine::{CellRef, CellStyle, Outcome, parse_styled};

/// One cell as a renderer should show it.
///
/// `value` is plain text; escaping it for the output medium is up to the
/// renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedCell {
    pub value: String,
    pub style: CellStyle,
}

/// Result of evaluating every cell once.
#[derive(Debug, Default)]
pub struct RenderPass {
    /// Cells in grid order, one inner `Vec` per row
    pub rows: Vec<Vec<RenderedCell>>,
    /// Generation calls dispatched by this pass
    pub tasks: Vec<GenerationTask>,
}

impl Sheet {
    /// Evaluate every cell from its raw content and dispatch generation for
    /// `LLM(...)` cells that are not already in flight.
    pub fn render(&mut self) -> RenderPass {
        let mut rows = Vec::with_capacity(self.grid.rows());
        let mut requests = Vec::new();
        {
            let evaluator = self.evaluator();
            for (row, cells) in self.grid.iter_rows().enumerate() {
                let mut rendered = Vec::with_capacity(cells.len());
                for (col, raw) in cells.iter().enumerate() {
                    let at = CellRef::new(row, col);
                    let styled = parse_styled(raw);
                    let outcome = evaluator.evaluate(styled.content, &at);
                    rendered.push(RenderedCell {
                        value: outcome.display(),
                        style: styled.style,
                    });
                    if let Outcome::Generate(request) = outcome {
                        if self.should_dispatch(&at, raw) {
                            requests.push((at, request));
                        }
                    }
                }
                rows.push(rendered);
            }
        }

        let mut tasks = Vec::with_capacity(requests.len());
        for (at, request) in requests {
            match self.request_generation(at, request) {
                Ok(task) => tasks.push(task),
                Err(err) => log::warn!("could not dispatch generation for {}: {}", at, err),
            }
        }
        RenderPass { rows, tasks }
    }
}
