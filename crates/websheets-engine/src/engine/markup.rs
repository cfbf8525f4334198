//! Formatting wrapper markup.
//!
//! Toolbar formatting is stored inside a cell's raw content as nested call
//! syntax: `bold(x)`, `textColor(red, center(x))`. Applying a wrapper is pure
//! textual nesting and never collapses repeats, so `bold` applied twice to
//! `x` gives `bold(bold(x))`.
//!
//! [`parse_styled`] is the read side. It peels wrapper layers off the
//! outside of raw content and returns the innermost content separately from
//! a [`CellStyle`], so a renderer can evaluate the content as a value and
//! apply the style as attributes. Nothing here produces markup from cell
//! content.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A formatting function applied around cell content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wrapper {
    Bold,
    Italic,
    Underline,
    Left,
    Center,
    Right,
    TextColor(String),
    BgColor(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Style attributes collected from wrapper layers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: Option<Align>,
    pub text_color: Option<String>,
    pub bg_color: Option<String>,
}

/// Raw content split into its innermost content and accumulated style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Styled<'a> {
    pub content: &'a str,
    pub style: CellStyle,
    /// Wrapper layers, outermost first
    pub layers: Vec<Wrapper>,
}

impl Styled<'_> {
    /// Wrap `content` in the same layers, innermost applied first.
    pub fn rewrap(&self, content: &str) -> String {
        self.layers
            .iter()
            .rev()
            .fold(content.to_string(), |inner, wrapper| wrapper.apply(&inner))
    }
}

impl Wrapper {
    pub const NAMES: [&'static str; 8] = [
        "bold",
        "italic",
        "underline",
        "left",
        "center",
        "right",
        "textColor",
        "bgColor",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Wrapper::Bold => "bold",
            Wrapper::Italic => "italic",
            Wrapper::Underline => "underline",
            Wrapper::Left => "left",
            Wrapper::Center => "center",
            Wrapper::Right => "right",
            Wrapper::TextColor(_) => "textColor",
            Wrapper::BgColor(_) => "bgColor",
        }
    }

    /// Wrap `content`, producing `name(args..., content)`.
    pub fn apply(&self, content: &str) -> String {
        match self {
            Wrapper::TextColor(color) | Wrapper::BgColor(color) => {
                format!("{}({}, {})", self.name(), color, content)
            }
            _ => format!("{}({})", self.name(), content),
        }
    }

    fn apply_to(&self, style: &mut CellStyle) {
        // Layers are visited outermost first; the outermost (most recently
        // applied) layer wins for single-valued attributes.
        match self {
            Wrapper::Bold => style.bold = true,
            Wrapper::Italic => style.italic = true,
            Wrapper::Underline => style.underline = true,
            Wrapper::Left => {
                style.align.get_or_insert(Align::Left);
            }
            Wrapper::Center => {
                style.align.get_or_insert(Align::Center);
            }
            Wrapper::Right => {
                style.align.get_or_insert(Align::Right);
            }
            Wrapper::TextColor(color) => {
                style.text_color.get_or_insert_with(|| color.clone());
            }
            Wrapper::BgColor(color) => {
                style.bg_color.get_or_insert_with(|| color.clone());
            }
        }
    }
}

impl fmt::Display for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wrapper::TextColor(color) | Wrapper::BgColor(color) => {
                write!(f, "{}:{}", self.name(), color)
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Parse a tool name such as `bold` or `textColor:red`.
impl FromStr for Wrapper {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg.trim())),
            None => (s, None),
        };
        let wrapper = match (name.trim(), arg) {
            ("bold", None) => Wrapper::Bold,
            ("italic", None) => Wrapper::Italic,
            ("underline", None) => Wrapper::Underline,
            ("left", None) => Wrapper::Left,
            ("center", None) => Wrapper::Center,
            ("right", None) => Wrapper::Right,
            ("textColor", Some(color)) if is_color_arg(color) => Wrapper::TextColor(color.to_string()),
            ("bgColor", Some(color)) if is_color_arg(color) => Wrapper::BgColor(color.to_string()),
            _ => return Err(format!("Unknown formatting tool: {}", s)),
        };
        Ok(wrapper)
    }
}

/// Split raw content into its innermost content and the style of every
/// wrapper layer around it.
pub fn parse_styled(raw: &str) -> Styled<'_> {
    let mut style = CellStyle::default();
    let mut layers = Vec::new();
    let mut content = raw;
    while let Some((wrapper, inner)) = peel(content) {
        wrapper.apply_to(&mut style);
        layers.push(wrapper);
        content = inner;
    }
    Styled {
        content,
        style,
        layers,
    }
}

/// Remove one wrapper layer, if `raw` is exactly `name(...)` for a known
/// wrapper name and the paren after the name closes at the very end.
fn peel(raw: &str) -> Option<(Wrapper, &str)> {
    let open = raw.find('(')?;
    let name = &raw[..open];
    if !Wrapper::NAMES.iter().any(|n| *n == name) {
        return None;
    }
    if closing_paren(raw, open)? != raw.len() - 1 {
        return None;
    }
    let inner = &raw[open + 1..raw.len() - 1];
    let wrapper = match name {
        "bold" => Wrapper::Bold,
        "italic" => Wrapper::Italic,
        "underline" => Wrapper::Underline,
        "left" => Wrapper::Left,
        "center" => Wrapper::Center,
        "right" => Wrapper::Right,
        _ => {
            let comma = top_level_comma(inner)?;
            let color = inner[..comma].trim().to_string();
            let rest = inner[comma + 1..].strip_prefix(' ').unwrap_or(&inner[comma + 1..]);
            let wrapper = if name == "textColor" {
                Wrapper::TextColor(color)
            } else {
                Wrapper::BgColor(color)
            };
            return Some((wrapper, rest));
        }
    };
    Some((wrapper, inner))
}

/// Byte offset of the `)` closing the `(` at `open`. Markup is plain text,
/// so only parentheses count.
fn closing_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
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

/// Byte offset of the first comma not nested inside parentheses.
fn top_level_comma(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// A color argument must read back as a single argument: balanced
/// parentheses and no top-level comma (`#ff0`, `rgb(1,2,3)`).
fn is_color_arg(color: &str) -> bool {
    let mut depth = 0usize;
    for ch in color.chars() {
        match ch {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            ',' if depth == 0 => return false,
            _ => {}
        }
    }
    !color.is_empty() && depth == 0
}
