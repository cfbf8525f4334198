//! Markdown table output for a rendered sheet.

use std::io::Write;
use websheets_core::{RenderedCell, Sheet};

/// Render every cell and write the sheet as a Markdown table.
pub fn write_markdown<W: Write>(w: &mut W, sheet: &mut Sheet) -> std::io::Result<()> {
    let pass = sheet.render();

    // Write markdown table header with column labels
    write!(w, "|   |")?;
    for label in sheet.headers() {
        write!(w, " {} |", label)?;
    }
    writeln!(w)?;

    write!(w, "|---|")?;
    for _ in sheet.headers() {
        write!(w, "---|")?;
    }
    writeln!(w)?;

    for (row, cells) in pass.rows.iter().enumerate() {
        write!(w, "| {} |", row + 1)?; // 1-based row numbers
        for cell in cells {
            write!(w, " {} |", styled_markdown(cell))?;
        }
        writeln!(w)?;
    }

    if !pass.tasks.is_empty() {
        log::warn!(
            "{} content generation call(s) not run in command mode",
            pass.tasks.len()
        );
    }
    Ok(())
}

/// Cell value with bold/italic emphasis; other style attributes have no
/// Markdown equivalent and are dropped.
fn styled_markdown(cell: &RenderedCell) -> String {
    let mut text = escape_markdown(&cell.value);
    if text.is_empty() {
        return text;
    }
    if cell.style.italic {
        text = format!("_{}_", text);
    }
    if cell.style.bold {
        text = format!("**{}**", text);
    }
    text
}

/// Escape characters that would be read as table structure or markup.
fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' | '|' | '*' | '_' | '`' | '<' | '>' | '[' | ']' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push(' '),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}
