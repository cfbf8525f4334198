//! `LLM(prompt, model)` content generation plumbing.
//!
//! Generation is the only operation that suspends. The evaluator never waits
//! on it: an `LLM(...)` formula evaluates to a [`GenerationRequest`], and the
//! owner of the grid dispatches it to a [`ContentGenerator`] and applies the
//! completion later.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub const LLM_FUNCTION: &str = "LLM";
pub const DEFAULT_MODEL: &str = "text-davinci-002";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 50;
pub const DEFAULT_PROMPT: &str =
    "Generate a short, interesting fact or piece of data for a spreadsheet cell.";

/// Request sent to the content-generation service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub max_output_tokens: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("content generation unavailable: no active credential")]
    Unavailable,

    #[error("content generation rejected: {0}")]
    Rejected(String),

    #[error("content generation timed out")]
    Timeout,
}

/// The pending result of one generation call.
pub type GenerationFuture = Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send>>;

/// A backend that turns a prompt into a single text completion.
///
/// Implementations own transport, credentials and timeouts. The returned
/// future must not borrow from `self` so it can be driven after the sheet
/// that issued it has moved on.
pub trait ContentGenerator: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> GenerationFuture;
}

/// Split an `LLM(...)` formula body into its raw argument expressions.
///
/// Returns `None` when the body is not a single top-level `LLM` call (for
/// example `LLM("a", "b") + 1`), in which case it goes through ordinary
/// evaluation.
pub fn parse_llm_call(body: &str) -> Option<Vec<&str>> {
    let rest = body.trim_start().strip_prefix(LLM_FUNCTION)?;
    let rest = rest.trim_start();
    let inner_start = body.len() - rest.len() + 1;
    if !rest.starts_with('(') {
        return None;
    }

    let close = matching_paren(body, inner_start - 1)?;
    if !body[close + 1..].trim().is_empty() {
        return None;
    }

    let inner = &body[inner_start..close];
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(split_top_level(inner))
}

/// Byte offset of the `)` closing the `(` at `open`, skipping string literals.
pub(super) fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in s[open..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas outside parentheses, brackets and string literals.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_llm_call_two_args() {
        assert_eq!(
            parse_llm_call(r#"LLM("Summarize, briefly: " + A1, "gpt-4o-mini")"#),
            Some(vec![r#""Summarize, briefly: " + A1"#, r#""gpt-4o-mini""#])
        );
    }

    #[test]
    fn test_parse_llm_call_arity_is_reported_not_judged() {
        assert_eq!(parse_llm_call("LLM()"), Some(vec![]));
        assert_eq!(parse_llm_call(" LLM ( \"a\" ) "), Some(vec!["\"a\""]));
        assert_eq!(
            parse_llm_call("LLM(max(1, 2), \"m\", 3)").map(|a| a.len()),
            Some(3)
        );
    }

    #[test]
    fn test_parse_llm_call_rejects_compound_expressions() {
        assert_eq!(parse_llm_call(r#"LLM("a", "b") + 1"#), None);
        assert_eq!(parse_llm_call(r#"1 + LLM("a", "b")"#), None);
        assert_eq!(parse_llm_call("LLMX(1, 2)"), None);
        assert_eq!(parse_llm_call("LLM(1, 2"), None);
    }

    #[test]
    fn test_parenthesis_inside_string_argument() {
        assert_eq!(
            parse_llm_call(r#"LLM("smile :)", "m")"#),
            Some(vec![r#""smile :)""#, r#""m""#])
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let request = GenerationRequest {
            model: DEFAULT_MODEL.to_string(),
            prompt: "hi".to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["maxOutputTokens"], 50);
        assert_eq!(json["model"], "text-davinci-002");
    }
}
