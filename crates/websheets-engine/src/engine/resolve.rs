//! Reference substitution.
//!
//! Every reference token in a formula body (outside string literals) is
//! replaced by the literal text of the referenced cell's value before the
//! script reaches Rhai. Ranges `A1:B3` become an array literal of the values
//! in row-major order.
//!
//! Resolution is recursive: a referenced formula is evaluated first. The
//! recursion is bounded by a [`Trail`] of cells currently being evaluated,
//! so self-references, cycles and runaway chains become `#REF!`.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::Dynamic;
use super::cell_ref::CellRef;
use super::error::EvalError;
use super::eval::{Evaluator, Step};
use super::format::{raw_value, to_literal};
use super::markup::parse_styled;
use super::preprocess::map_code_segments;

/// Longest chain of formula cells one evaluation may follow.
pub const MAX_REFERENCE_DEPTH: usize = 64;

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?<start>[A-Z]+[0-9]+)(?:\s*:\s*(?<end>[A-Z]+[0-9]+))?\b")
            .expect("reference regex must compile")
    })
}

/// Per top-level evaluation bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct Trail {
    visiting: Vec<CellRef>,
    // Only successful values are kept; an error may depend on which cells
    // were on the trail when it was produced.
    resolved: HashMap<CellRef, Dynamic>,
}

impl Trail {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&mut self, at: CellRef) -> Result<(), EvalError> {
        if self.visiting.contains(&at) {
            return Err(EvalError::Reference(format!("circular reference through {}", at)));
        }
        if self.visiting.len() >= MAX_REFERENCE_DEPTH {
            return Err(EvalError::Reference(format!(
                "reference chain deeper than {} at {}",
                MAX_REFERENCE_DEPTH, at
            )));
        }
        self.visiting.push(at);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.visiting.pop();
    }
}

impl Evaluator<'_> {
    /// Replace every reference and range in `body` with the literal text of
    /// its value.
    pub(crate) fn resolve_references(
        &self,
        body: &str,
        trail: &mut Trail,
    ) -> Result<String, EvalError> {
        map_code_segments(body, |seg| self.resolve_segment(seg, trail))
    }

    fn resolve_segment(&self, seg: &str, trail: &mut Trail) -> Result<String, EvalError> {
        let mut out = String::with_capacity(seg.len());
        let mut last = 0;
        for caps in reference_re().captures_iter(seg) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&seg[last..whole.start()]);
            let start = self.locate(&caps["start"])?;
            let literal = match caps.name("end") {
                Some(end) => {
                    let end = self.locate(end.as_str())?;
                    to_literal(&self.range_value(start, end, trail)?)
                }
                None => to_literal(&self.cell_value(start, trail)?),
            };
            out.push_str(&literal);
            last = whole.end();
        }
        out.push_str(&seg[last..]);
        Ok(out)
    }

    fn locate(&self, token: &str) -> Result<CellRef, EvalError> {
        self.grid
            .locate(token)
            .ok_or_else(|| EvalError::Reference(format!("{} is outside the grid", token)))
    }

    fn range_value(
        &self,
        start: CellRef,
        end: CellRef,
        trail: &mut Trail,
    ) -> Result<Dynamic, EvalError> {
        let (top, bottom) = (start.row.min(end.row), start.row.max(end.row));
        let (left, right) = (start.col.min(end.col), start.col.max(end.col));
        let mut values = rhai::Array::new();
        for row in top..=bottom {
            for col in left..=right {
                values.push(self.cell_value(CellRef::new(row, col), trail)?);
            }
        }
        Ok(Dynamic::from(values))
    }

    /// The value a reference to `at` stands for.
    ///
    /// Formatting wrappers are looked through: `bold(=A1*2)` has the value
    /// of `A1*2`.
    pub(crate) fn cell_value(&self, at: CellRef, trail: &mut Trail) -> Result<Dynamic, EvalError> {
        if let Some(value) = trail.resolved.get(&at) {
            return Ok(value.clone());
        }

        let raw = self.grid.cell(&at).unwrap_or_default();
        let content = parse_styled(raw).content;
        let value = match content.strip_prefix('=') {
            None => raw_value(content),
            Some(body) => {
                trail.enter(at)?;
                let step = self.eval_body(body, Some(&at), trail);
                trail.leave();
                match step? {
                    Step::Value(value) => value,
                    Step::Generate(_) => return Err(EvalError::Pending),
                }
            }
        };

        trail.resolved.insert(at, value.clone());
        Ok(value)
    }
}
