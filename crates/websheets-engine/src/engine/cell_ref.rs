//! Cell coordinates and reference tokens.
//!
//! A reference token is one or more ASCII uppercase letters immediately
//! followed by one or more ASCII digits (`A1`, `AB123`). Matching is
//! case-sensitive: `a1` is not a reference.
//!
//! The letters name a column *header*, not an arithmetic column index. The
//! grid owns the header list, so turning a token into coordinates goes
//! through [`Grid::locate`](super::Grid::locate); this module only splits
//! the token and renders canonical names.
//!
//! # Examples
//!
//! ```
//! use websheets_engine::engine::CellRef;
//!
//! assert_eq!(CellRef::split_token("B3"), Some(("B", 2)));
//! assert_eq!(CellRef::new(2, 1).to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by row and column indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Split a reference token into its column label and zero-based row.
    ///
    /// Returns `None` for anything that is not exactly a reference token, or
    /// for row number `0`.
    pub fn split_token(token: &str) -> Option<(&str, usize)> {
        let caps = token_re().captures(token)?;
        let letters = caps.name("letters")?.as_str();
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
        Some((letters, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("reference token regex must compile")
    })
}

/// Canonical A1 name, assuming the default `A, B, C, ...` header sequence.
impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}
