//! Rhai engine creation and script evaluation.
//!
//! The registry owns the Rhai engine with the math built-ins registered and
//! turns Rhai failures into [`EvalError`]s. It never sees cell references:
//! those are substituted before a script reaches it.

use rhai::{Engine, EvalAltResult};

use super::Dynamic;
use super::error::EvalError;
use crate::builtins;

const MAX_OPERATIONS: u64 = 100_000;
const MAX_EXPR_DEPTH: usize = 64;
const MAX_FN_EXPR_DEPTH: usize = 32;
const MAX_CALL_LEVELS: usize = 16;
const MAX_STRING_SIZE: usize = 64 * 1024;
const MAX_ARRAY_SIZE: usize = 100_000;

/// Create a Rhai engine with built-ins registered and resource limits set.
pub fn create_engine() -> Engine {
    let mut engine = Engine::new();
    engine.set_max_operations(MAX_OPERATIONS);
    engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_FN_EXPR_DEPTH);
    engine.set_max_call_levels(MAX_CALL_LEVELS);
    engine.set_max_string_size(MAX_STRING_SIZE);
    engine.set_max_array_size(MAX_ARRAY_SIZE);
    engine.on_print(|text| log::debug!("formula print: {}", text));
    engine.on_debug(|text, _, pos| log::debug!("formula debug at {}: {}", pos, text));
    builtins::register_builtins(&mut engine);
    engine
}

/// Function name to implementation mapping used by every evaluation.
pub struct FunctionRegistry {
    engine: Engine,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry {
            engine: create_engine(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Evaluate a preprocessed script.
    pub fn eval(&self, script: &str) -> Result<Dynamic, EvalError> {
        self.engine.eval::<Dynamic>(script).map_err(|e| classify(*e))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(err: EvalAltResult) -> EvalError {
    match err {
        EvalAltResult::ErrorParsing(parse_type, pos) => {
            EvalError::Parse(format!("{} ({})", parse_type, pos))
        }
        EvalAltResult::ErrorFunctionNotFound(signature, _) => {
            // Signatures look like `sqrt (f64, f64)`.
            let name = signature
                .split(|c: char| c == ' ' || c == '(')
                .next()
                .unwrap_or_default();
            if builtins::is_builtin(name) {
                EvalError::argument(name)
            } else {
                EvalError::Runtime(format!("unknown function {}", signature))
            }
        }
        other => EvalError::Runtime(other.to_string()),
    }
}
