//! Value formatting, both for display and for textual substitution.

use super::Dynamic;

/// Format a Dynamic value for display.
pub fn format_dynamic(value: &Dynamic) -> String {
    let value = unwrap_compound(value);
    if value.is_unit() {
        String::new()
    } else if let Ok(n) = value.as_float() {
        format_number(n)
    } else if let Ok(n) = value.as_int() {
        n.to_string()
    } else if let Ok(b) = value.as_bool() {
        let text = if b { "TRUE" } else { "FALSE" };
        text.to_string()
    } else if let Some(items) = value.clone().try_cast::<rhai::Array>() {
        items.iter().map(format_dynamic).collect::<Vec<_>>().join(", ")
    } else if let Ok(s) = value.clone().into_string() {
        s
    } else {
        value.to_string()
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else {
        plain_decimal(n)
    }
}

/// Plain decimal rendering: no exponent, no grouping, integral values
/// without a fractional part.
fn plain_decimal(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Results carrying extra structure (a `#{value: .., unit: ..}` map, a
/// one-element array) display as their scalar.
pub(crate) fn unwrap_compound(value: &Dynamic) -> Dynamic {
    if let Some(map) = value.clone().try_cast::<rhai::Map>() {
        if let Some(inner) = map.get("value") {
            return unwrap_compound(inner);
        }
    }
    if let Some(mut items) = value.clone().try_cast::<rhai::Array>() {
        if items.len() == 1 {
            return unwrap_compound(&items.remove(0));
        }
    }
    value.clone()
}

/// The script text a value is substituted as when a formula references it.
pub(crate) fn to_literal(value: &Dynamic) -> String {
    let value = unwrap_compound(value);
    if value.is_unit() {
        "0".to_string()
    } else if let Ok(n) = value.as_float() {
        number_literal(n)
    } else if let Ok(n) = value.as_int() {
        number_literal(n as f64)
    } else if let Ok(b) = value.as_bool() {
        b.to_string()
    } else if let Some(items) = value.clone().try_cast::<rhai::Array>() {
        format!(
            "[{}]",
            items.iter().map(to_literal).collect::<Vec<_>>().join(", ")
        )
    } else if let Ok(s) = value.clone().into_string() {
        quote_literal(&s)
    } else {
        quote_literal(&value.to_string())
    }
}

/// Value of a non-formula cell: empty is `0`, numeric text is a number,
/// anything else is the text itself.
pub(crate) fn raw_value(raw: &str) -> Dynamic {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Dynamic::from(0.0_f64);
    }
    match parse_number(trimmed) {
        Some(n) => Dynamic::from(n),
        None => Dynamic::from(raw.to_string()),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    // Rust accepts "inf" and "NaN"; cell text like that stays text.
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number_literal(n: f64) -> String {
    if n.is_nan() {
        "(0.0/0.0)".to_string()
    } else if n == f64::INFINITY {
        "(1.0/0.0)".to_string()
    } else if n == f64::NEG_INFINITY {
        "(-1.0/0.0)".to_string()
    } else if n < 0.0 {
        format!("({})", plain_decimal(n))
    } else {
        plain_decimal(n)
    }
}

pub(crate) fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
