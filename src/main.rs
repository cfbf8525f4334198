//! Websheets - spreadsheet formula engine, command mode.

mod config;
mod logging;
mod markdown;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;
use websheets_core::{CellRef, Sheet, Wrapper};
use websheets_engine::builtins::BUILTINS;
use websheets_engine::engine::LLM_FUNCTION;

#[derive(Parser, Debug)]
#[command(name = "websheets", version, about = "Evaluate spreadsheet formulas from the command line")]
struct Cli {
    /// Evaluate one formula and print its value (a leading `=` is optional)
    #[arg(short = 'c', long = "command", value_name = "FORMULA", allow_hyphen_values = true)]
    command: Option<String>,

    /// Seed a cell before evaluating, e.g. `--set A1=5` or `--set B1==A1*2`
    #[arg(long = "set", value_name = "CELL=RAW", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Apply a formatting wrapper to a cell or range, e.g. `--format A1:B2=bold`
    /// or `--format C3=textColor:red`
    #[arg(long = "format", value_name = "CELLS=TOOL", value_parser = parse_assignment)]
    format: Vec<(String, String)>,

    /// Print the rendered sheet as a Markdown table
    #[arg(short, long)]
    print: bool,

    /// List built-in functions and formatting wrappers
    #[arg(long)]
    list_functions: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore any config file
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((target, value)) if !target.trim().is_empty() => {
            Ok((target.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected CELL=VALUE, got '{}'", arg)),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = if cli.no_config {
        Config::default()
    } else if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    let level = match cli.verbose {
        0 => config.level_filter()?,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logging::init(level).context("installing logger")?;

    if cli.list_functions {
        print_functions()?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut sheet = Sheet::with_options(config.sheet_options());
    for (target, raw) in &cli.set {
        let at = locate(&sheet, target)?;
        sheet.set_cell(at, raw.as_str())?;
    }
    for (target, tool) in &cli.format {
        let wrapper: Wrapper = tool.parse().map_err(anyhow::Error::msg)?;
        select(&mut sheet, target)?;
        sheet.format_selection(&wrapper)?;
    }

    let mut code = ExitCode::SUCCESS;
    if let Some(formula) = &cli.command {
        let formula = if formula.starts_with('=') {
            formula.clone()
        } else {
            format!("={}", formula)
        };
        let outcome = sheet.evaluator().evaluate_detached(&formula);
        println!("{}", outcome.display());
        if outcome.is_error() {
            code = ExitCode::FAILURE;
        }
    }

    if cli.print || cli.command.is_none() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        markdown::write_markdown(&mut out, &mut sheet)?;
        out.flush()?;
    }
    Ok(code)
}

fn locate(sheet: &Sheet, token: &str) -> Result<CellRef> {
    match sheet.locate(token) {
        Some(at) => Ok(at),
        None => bail!(
            "no cell {} in a sheet with {} rows and columns {}",
            token,
            sheet.rows(),
            sheet.headers().join(",")
        ),
    }
}

/// Select a single cell (`B2`) or a range (`A1:C3`).
fn select(sheet: &mut Sheet, target: &str) -> Result<()> {
    match target.split_once(':') {
        Some((start, end)) => {
            let start = locate(sheet, start.trim())?;
            let end = locate(sheet, end.trim())?;
            sheet.select(start)?;
            sheet.extend_selection(end)?;
        }
        None => {
            let at = locate(sheet, target)?;
            sheet.select(at)?;
        }
    }
    Ok(())
}

fn print_functions() -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Functions:")?;
    for builtin in BUILTINS {
        writeln!(out, "  {:<8} {}", builtin.name, builtin.description)?;
    }
    writeln!(
        out,
        "  {:<8} Generate cell content: {}(prompt, model)",
        LLM_FUNCTION, LLM_FUNCTION
    )?;
    writeln!(out)?;
    writeln!(out, "Formatting wrappers:")?;
    for name in Wrapper::NAMES {
        writeln!(out, "  {}", name)?;
    }
    Ok(())
}
