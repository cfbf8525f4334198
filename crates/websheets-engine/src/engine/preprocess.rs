//! Formula preprocessing.
//!
//! Formulas are evaluated by Rhai, whose arithmetic differs from the
//! spreadsheet grammar in a couple of places. Before evaluation, outside of
//! string literals:
//!
//! - `ROW()` / `COL()` become the evaluating cell's 1-based row/column
//! - integer literals become floats, so `7/2` is `3.5` rather than `3`
//! - `^` becomes `**` (power rather than XOR)
//!
//! Calls to the variadic built-ins have their arguments packed into a single
//! array first: `sum(1, 2, 3)` becomes `sum([1, 2, 3])`.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;
use super::generate::matching_paren;
use crate::builtins::is_variadic;

/// Rewrite a formula body (references already substituted) into a script
/// Rhai can evaluate with spreadsheet semantics.
pub fn preprocess_formula(script: &str, context: Option<&CellRef>) -> String {
    let script = pack_variadic_args(script);
    map_code_segments(&script, |seg| {
        let seg = match context {
            Some(at) => {
                let seg = row_re().replace_all(seg, format!("{}", at.row + 1));
                col_re()
                    .replace_all(&seg, format!("{}", at.col + 1))
                    .into_owned()
            }
            None => seg.to_string(),
        };
        Ok::<_, std::convert::Infallible>(promote_numbers(&seg))
    })
    .unwrap_or_else(|never| match never {})
}

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bROW\(\s*\)").expect("ROW() regex must compile"))
}

fn col_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bCOL\(\s*\)").expect("COL() regex must compile"))
}

/// Apply `f` to every piece of `script` that lies outside a double-quoted
/// string literal. String literals (quotes and escapes included) are copied
/// through untouched. An unterminated literal runs to the end of the script.
pub(crate) fn map_code_segments<E>(
    script: &str,
    mut f: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let bytes = script.as_bytes();
    let mut out = String::with_capacity(script.len());
    let mut seg_start = 0;
    let mut in_string = false;
    let mut backslashes = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'\\' {
                backslashes += 1;
                i += 1;
                continue;
            }
            if b == b'"' && backslashes.is_multiple_of(2) {
                out.push_str(&script[seg_start..=i]);
                in_string = false;
                seg_start = i + 1;
            }
            backslashes = 0;
            i += 1;
            continue;
        }

        if b == b'"' {
            out.push_str(&f(&script[seg_start..i])?);
            in_string = true;
            seg_start = i;
            backslashes = 0;
        }
        i += 1;
    }

    if seg_start < script.len() {
        if in_string {
            out.push_str(&script[seg_start..]);
        } else {
            out.push_str(&f(&script[seg_start..])?);
        }
    }

    Ok(out)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

/// Rewrite `name(a, b, ...)` as `name([a, b, ...])` for every variadic
/// built-in called outside a string literal, nested calls included.
fn pack_variadic_args(script: &str) -> String {
    let bytes = script.as_bytes();
    let mut out = String::with_capacity(script.len() + 8);
    let mut copied = 0;
    let mut i = 0;
    let mut in_string = false;
    let mut escaped = false;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }
        let starts_ident = is_ident_byte(b)
            && !b.is_ascii_digit()
            && (i == 0 || !(is_ident_byte(bytes[i - 1]) || bytes[i - 1] == b'.'));
        if !starts_ident {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && is_ident_byte(bytes[i]) {
            i += 1;
        }
        if !is_variadic(&script[start..i]) {
            continue;
        }
        let mut open = i;
        while bytes.get(open).is_some_and(u8::is_ascii_whitespace) {
            open += 1;
        }
        if bytes.get(open) != Some(&b'(') {
            continue;
        }
        let Some(close) = matching_paren(script, open) else {
            continue;
        };

        out.push_str(&script[copied..=open]);
        out.push('[');
        out.push_str(&pack_variadic_args(&script[open + 1..close]));
        out.push_str("])");
        i = close + 1;
        copied = i;
    }

    out.push_str(&script[copied..]);
    out
}

/// Promote bare integer literals to floats and rewrite `^` as `**`.
///
/// Digits glued to an identifier (`log10`), to a `.` (`1.5`, `0..3`) or
/// followed by an exponent are left alone.
fn promote_numbers(seg: &str) -> String {
    let bytes = seg.as_bytes();
    let mut out = String::with_capacity(seg.len() + 8);
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'^' {
            out.push_str(&seg[copied..i]);
            out.push_str("**");
            i += 1;
            copied = i;
        } else if b.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let attached_before = start > 0 && (is_ident_byte(bytes[start - 1]) || bytes[start - 1] == b'.');
            let attached_after = bytes
                .get(i)
                .is_some_and(|&next| next == b'.' || is_ident_byte(next));
            if !attached_before && !attached_after {
                out.push_str(&seg[copied..i]);
                out.push_str(".0");
                copied = i;
            }
        } else {
            i += 1;
        }
    }

    out.push_str(&seg[copied..]);
    out
}
