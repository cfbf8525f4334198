//! Evaluation errors and their in-cell sentinels.

use thiserror::Error;

pub const ERROR_SENTINEL: &str = "#ERROR!";
pub const REF_SENTINEL: &str = "#REF!";
pub const PENDING_SENTINEL: &str = "#PENDING!";

/// Why a formula could not produce a value.
///
/// None of these ever escape an evaluation call as a failure; they are
/// rendered into the cell through [`EvalError::sentinel`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("evaluation failed: {0}")]
    Runtime(String),

    #[error("invalid reference: {0}")]
    Reference(String),

    #[error("invalid {function} arguments")]
    Argument { function: String },

    #[error("content generation unavailable")]
    Unavailable,

    /// The value depends on a content-generation call that has not landed.
    #[error("content generation pending")]
    Pending,
}

impl EvalError {
    pub fn argument(function: impl Into<String>) -> Self {
        EvalError::Argument {
            function: function.into(),
        }
    }

    /// The display string shown in place of a value.
    pub fn sentinel(&self) -> String {
        match self {
            EvalError::Parse(_) | EvalError::Runtime(_) => ERROR_SENTINEL.to_string(),
            EvalError::Reference(_) => REF_SENTINEL.to_string(),
            EvalError::Argument { function } => format!("#ERROR: Invalid {} arguments", function),
            EvalError::Unavailable => "#ERROR: Generation unavailable".to_string(),
            EvalError::Pending => PENDING_SENTINEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(EvalError::Parse("x".into()).sentinel(), "#ERROR!");
        assert_eq!(EvalError::Runtime("x".into()).sentinel(), "#ERROR!");
        assert_eq!(EvalError::Reference("Z99".into()).sentinel(), "#REF!");
        assert_eq!(
            EvalError::argument("LLM").sentinel(),
            "#ERROR: Invalid LLM arguments"
        );
    }
}
