//! Cell evaluation.
//!
//! [`Evaluator::evaluate`] turns one cell's raw content into an [`Outcome`].
//! Raw content that does not start with `=` is returned unchanged. A formula
//! body goes through reference substitution, preprocessing and the Rhai
//! backend, in that order. A body that is exactly an `LLM(prompt, model)`
//! call is intercepted first and yields a [`GenerationRequest`] instead of a
//! value.
//!
//! Evaluation never fails outward: every error is captured in the outcome
//! and displayed as a sentinel.

use super::Dynamic;
use super::cell_ref::CellRef;
use super::error::{EvalError, PENDING_SENTINEL};
use super::format::format_dynamic;
use super::generate::{GenerationRequest, LLM_FUNCTION, parse_llm_call};
use super::grid::Grid;
use super::preprocess::preprocess_formula;
use super::registry::FunctionRegistry;
use super::resolve::Trail;

/// Result of evaluating one cell.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Non-formula content, shown as-is.
    Text(String),
    Value(Dynamic),
    Error(EvalError),
    /// An `LLM(...)` call waiting to be dispatched.
    Generate(GenerationRequest),
}

impl Outcome {
    /// The string shown in the cell.
    pub fn display(&self) -> String {
        match self {
            Outcome::Text(text) => text.clone(),
            Outcome::Value(value) => format_dynamic(value),
            Outcome::Error(err) => err.sentinel(),
            Outcome::Generate(_) => PENDING_SENTINEL.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn error(&self) -> Option<&EvalError> {
        match self {
            Outcome::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn generation_request(&self) -> Option<&GenerationRequest> {
        match self {
            Outcome::Generate(request) => Some(request),
            _ => None,
        }
    }
}

/// What a formula body evaluated to.
pub(crate) enum Step {
    Value(Dynamic),
    Generate(GenerationRequest),
}

/// Evaluates cells of one grid against one function registry.
pub struct Evaluator<'a> {
    pub(super) grid: &'a Grid,
    pub(super) registry: &'a FunctionRegistry,
    /// Token limit for `LLM(...)` requests; `None` means generation is
    /// unavailable.
    pub(super) generation: Option<u32>,
}

impl<'a> Evaluator<'a> {
    pub fn new(grid: &'a Grid, registry: &'a FunctionRegistry) -> Self {
        Evaluator {
            grid,
            registry,
            generation: None,
        }
    }

    /// Allow `LLM(...)` formulas to produce generation requests.
    pub fn with_generation(mut self, max_output_tokens: u32) -> Self {
        self.generation = Some(max_output_tokens);
        self
    }

    /// Evaluate `raw` as the content of the cell at `at`.
    pub fn evaluate(&self, raw: &str, at: &CellRef) -> Outcome {
        let Some(body) = raw.strip_prefix('=') else {
            return Outcome::Text(raw.to_string());
        };
        let mut trail = Trail::new();
        let step = trail
            .enter(*at)
            .and_then(|()| self.eval_body(body, Some(at), &mut trail));
        self.finish(step, &at.to_string())
    }

    /// Evaluate the raw content currently stored at `at`.
    pub fn evaluate_cell(&self, at: &CellRef) -> Outcome {
        self.evaluate(self.grid.cell(at).unwrap_or_default(), at)
    }

    /// Evaluate `raw` outside any cell. `ROW()` and `COL()` are unavailable.
    pub fn evaluate_detached(&self, raw: &str) -> Outcome {
        let Some(body) = raw.strip_prefix('=') else {
            return Outcome::Text(raw.to_string());
        };
        let step = self.eval_body(body, None, &mut Trail::new());
        self.finish(step, "formula")
    }

    /// Evaluate and format in one go.
    pub fn display(&self, raw: &str, at: &CellRef) -> String {
        self.evaluate(raw, at).display()
    }

    fn finish(&self, step: Result<Step, EvalError>, name: &str) -> Outcome {
        match step {
            Ok(Step::Value(value)) => Outcome::Value(value),
            Ok(Step::Generate(request)) => Outcome::Generate(request),
            Err(err) => {
                log::debug!("{} evaluated to {}: {}", name, err.sentinel(), err);
                Outcome::Error(err)
            }
        }
    }

    pub(crate) fn eval_body(
        &self,
        body: &str,
        at: Option<&CellRef>,
        trail: &mut Trail,
    ) -> Result<Step, EvalError> {
        if let Some(args) = parse_llm_call(body) {
            return self.generation_request(&args, at, trail).map(Step::Generate);
        }
        self.eval_expression(body, at, trail).map(Step::Value)
    }

    fn eval_expression(
        &self,
        expr: &str,
        at: Option<&CellRef>,
        trail: &mut Trail,
    ) -> Result<Dynamic, EvalError> {
        let resolved = self.resolve_references(expr, trail)?;
        let script = preprocess_formula(&resolved, at);
        self.registry.eval(&script)
    }

    fn generation_request(
        &self,
        args: &[&str],
        at: Option<&CellRef>,
        trail: &mut Trail,
    ) -> Result<GenerationRequest, EvalError> {
        let [prompt, model] = args else {
            return Err(EvalError::argument(LLM_FUNCTION));
        };
        let Some(max_output_tokens) = self.generation else {
            return Err(EvalError::Unavailable);
        };
        let prompt = format_dynamic(&self.eval_expression(prompt, at, trail)?);
        let model = format_dynamic(&self.eval_expression(model, at, trail)?);
        Ok(GenerationRequest {
            model,
            prompt,
            max_output_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(cells: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::default();
        for (name, raw) in cells {
            let at = grid.locate(name).unwrap();
            grid.set(at.row, at.col, *raw);
        }
        grid
    }

    fn display(grid: &Grid, name: &str) -> String {
        let registry = FunctionRegistry::new();
        let at = grid.locate(name).unwrap();
        Evaluator::new(grid, &registry).evaluate_cell(&at).display()
    }

    #[test]
    fn test_plain_text_is_identity() {
        let grid = Grid::default();
        let registry = FunctionRegistry::new();
        let evaluator = Evaluator::new(&grid, &registry);
        let at = CellRef::new(0, 0);
        for raw in ["", "hello", " 5 ", "bold(x)", "A1+1", "#REF!"] {
            assert_eq!(evaluator.display(raw, &at), raw);
        }
    }

    #[test]
    fn test_arithmetic_semantics() {
        let grid = grid_with(&[("A1", "=7/2"), ("A2", "=2^3"), ("A3", "=1+2*3")]);
        assert_eq!(display(&grid, "A1"), "3.5");
        assert_eq!(display(&grid, "A2"), "8");
        assert_eq!(display(&grid, "A3"), "7");
    }

    #[test]
    fn test_reference_chain() {
        let grid = grid_with(&[("A1", "5"), ("B1", "=A1+3"), ("C1", "=B1*2")]);
        assert_eq!(display(&grid, "B1"), "8");
        assert_eq!(display(&grid, "C1"), "16");
    }

    #[test]
    fn test_cycles_are_reference_errors() {
        let grid = grid_with(&[("A1", "=B1"), ("B1", "=A1"), ("C1", "=C1+1")]);
        assert_eq!(display(&grid, "A1"), "#REF!");
        assert_eq!(display(&grid, "B1"), "#REF!");
        assert_eq!(display(&grid, "C1"), "#REF!");
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let grid = grid_with(&[
            ("A1", "2"),
            ("B1", "=A1*10"),
            ("C1", "=A1+1"),
            ("D1", "=B1+C1+B1"),
        ]);
        assert_eq!(display(&grid, "D1"), "43");
    }

    #[test]
    fn test_errors_propagate_through_references() {
        let grid = grid_with(&[("A1", "=1 +"), ("B1", "=A1 * 2"), ("C1", "=Z99"), ("D1", "=C1")]);
        assert_eq!(display(&grid, "B1"), "#ERROR!");
        assert_eq!(display(&grid, "D1"), "#REF!");
    }

    #[test]
    fn test_row_and_col_use_evaluating_cell() {
        let grid = grid_with(&[("B3", "=ROW() * 10 + COL()"), ("A1", "=B3")]);
        assert_eq!(display(&grid, "B3"), "32");
        assert_eq!(display(&grid, "A1"), "32");
    }

    #[test]
    fn test_text_values_concatenate() {
        let grid = grid_with(&[("A1", "world"), ("B1", "=\"hello \" + A1")]);
        assert_eq!(display(&grid, "B1"), "hello world");
    }

    #[test]
    fn test_llm_arity_and_availability() {
        let grid = grid_with(&[("A1", "=LLM(\"only prompt\")"), ("B1", "=LLM(\"p\", \"m\")")]);
        assert_eq!(display(&grid, "A1"), "#ERROR: Invalid LLM arguments");
        assert_eq!(display(&grid, "B1"), "#ERROR: Generation unavailable");
    }

    #[test]
    fn test_llm_yields_request_with_resolved_prompt() {
        let grid = grid_with(&[("A1", "cats"), ("B1", "=LLM(\"Describe \" + A1, \"small-model\")")]);
        let registry = FunctionRegistry::new();
        let evaluator = Evaluator::new(&grid, &registry).with_generation(50);
        let outcome = evaluator.evaluate_cell(&CellRef::new(0, 1));
        assert_eq!(outcome.display(), "#PENDING!");
        assert_eq!(
            outcome.generation_request(),
            Some(&GenerationRequest {
                model: "small-model".to_string(),
                prompt: "Describe cats".to_string(),
                max_output_tokens: 50,
            })
        );
    }

    #[test]
    fn test_reference_to_pending_cell_is_pending() {
        let grid = grid_with(&[("A1", "=LLM(\"p\", \"m\")"), ("B1", "=A1")]);
        let registry = FunctionRegistry::new();
        let evaluator = Evaluator::new(&grid, &registry).with_generation(50);
        assert_eq!(
            evaluator.evaluate_cell(&CellRef::new(0, 1)).display(),
            "#PENDING!"
        );
    }

    #[test]
    fn test_detached_evaluation() {
        let grid = Grid::default();
        let registry = FunctionRegistry::new();
        let evaluator = Evaluator::new(&grid, &registry);
        assert_eq!(evaluator.evaluate_detached("=sum(1, 2, 3)").display(), "6");
        assert!(evaluator.evaluate_detached("=ROW()").is_error());
    }
}
