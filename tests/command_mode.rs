//! Integration tests for command mode (-c/--command flag)

use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_websheets"))
        // Tests must be deterministic and not depend on a user's ~/.config/websheets/config.toml.
        .arg("--no-config")
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_division_is_not_integer_division() {
    let (stdout, _, code) = run_command(&["-c", "7/2"]);
    assert_eq!(stdout.trim(), "3.5");
    assert_eq!(code, 0);
}

#[test]
fn test_power_and_functions() {
    let (stdout, _, code) = run_command(&["-c", "sqrt(2^4) + max(1, 5, 3)"]);
    assert_eq!(stdout.trim(), "9");
    assert_eq!(code, 0);
}

#[test]
fn test_sum_of_many_arguments() {
    let (stdout, _, code) = run_command(&["-c", "sum(1, 2, 3, 4, 5, 6, 7, 8, 9, 10)"]);
    assert_eq!(stdout.trim(), "55");
    assert_eq!(code, 0);
}

#[test]
fn test_leading_minus() {
    let (stdout, _, code) = run_command(&["-c", "-5 + 3"]);
    assert_eq!(stdout.trim(), "-2");
    assert_eq!(code, 0);
}

#[test]
fn test_auto_prepend_equals() {
    let (stdout1, _, _) = run_command(&["-c", "10 + 5"]);
    let (stdout2, _, _) = run_command(&["-c", "=10 + 5"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_error_exit_code() {
    let (stdout, _, code) = run_command(&["-c", "undefined_function()"]);
    assert!(stdout.starts_with("#ERR"));
    assert_eq!(code, 1);
}

#[test]
fn test_argument_error() {
    let (stdout, _, code) = run_command(&["-c", "sqrt(1, 2)"]);
    assert_eq!(stdout.trim(), "#ERROR: Invalid sqrt arguments");
    assert_eq!(code, 1);
}

#[test]
fn test_seeded_references() {
    let (stdout, _, code) = run_command(&["--set", "A1=5", "--set", "B1==A1+3", "-c", "B1 * 2"]);
    assert_eq!(stdout.trim(), "16");
    assert_eq!(code, 0);
}

#[test]
fn test_cycle_is_ref_error() {
    let (stdout, _, code) = run_command(&["--set", "A1==B1", "--set", "B1==A1", "-c", "A1"]);
    assert_eq!(stdout.trim(), "#REF!");
    assert_eq!(code, 1);
}

#[test]
fn test_out_of_range_reference() {
    let (stdout, _, code) = run_command(&["-c", "Z99"]);
    assert_eq!(stdout.trim(), "#REF!");
    assert_eq!(code, 1);
}

#[test]
fn test_llm_without_backend() {
    let (stdout, _, code) = run_command(&["-c", "LLM(\"a fact\", \"model\")"]);
    assert_eq!(stdout.trim(), "#ERROR: Generation unavailable");
    assert_eq!(code, 1);
}

#[test]
fn test_print_renders_values_and_emphasis() {
    let (stdout, _, code) = run_command(&[
        "--set",
        "A1=hello",
        "--set",
        "B1==6*7",
        "--format",
        "A1:B1=bold",
        "--print",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("|   | A | B | C | D | E |\n|---|"));
    assert!(stdout.contains("| 1 | **hello** | **42** |  |"));
    assert_eq!(stdout.lines().count(), 12);
}

#[test]
fn test_unknown_cell_is_reported() {
    let (_, stderr, code) = run_command(&["--set", "F1=5", "-c", "1"]);
    assert!(stderr.contains("no cell F1"));
    assert_eq!(code, 1);
}

#[test]
fn test_unknown_tool_is_reported() {
    let (_, stderr, code) = run_command(&["--format", "A1=blink", "-c", "1"]);
    assert!(stderr.contains("Unknown formatting tool"));
    assert_eq!(code, 1);
}

#[test]
fn test_list_functions() {
    let (stdout, _, code) = run_command(&["--list-functions"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("sqrt"));
    assert!(stdout.contains("LLM"));
    assert!(stdout.contains("textColor"));
}
