//! Integration tests for the command-line subcommands

use std::path::Path;
use std::process::Command;

fn run_command(dir: &Path, args: &[&str]) -> (String, String, i32) {
    // Tests must be deterministic and not depend on a user's ~/.config/cellgraph/config.toml.
    let config = dir.join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "").expect("Failed to write empty config");
    }

    let output = Command::new(env!("CARGO_BIN_EXE_cellgraph"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn calc(expr: &str) -> (String, i32) {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_command(dir.path(), &["calc", expr]);
    (stdout.trim().to_string(), code)
}

#[test]
fn test_basic_arithmetic() {
    assert_eq!(calc("5 + 3"), ("8".to_string(), 0));
}

#[test]
fn test_leading_equals_is_optional() {
    assert_eq!(calc("=(1 + 2) * 3"), ("9".to_string(), 0));
}

#[test]
fn test_precedence_and_decimals() {
    assert_eq!(calc("1 + 2 * 3"), ("7".to_string(), 0));
    assert_eq!(calc("10 / 4"), ("2.50".to_string(), 0));
}

#[test]
fn test_decimals_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_command(dir.path(), &["--decimals", "4", "calc", "1 / 3"]);
    assert_eq!(stdout.trim(), "0.3333");
    assert_eq!(code, 0);
}

#[test]
fn test_decimals_from_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "decimals = 1\n").unwrap();
    let (stdout, stderr, code) = run_command(dir.path(), &["calc", "1 / 3"]);
    assert_eq!(stdout.trim(), "0.3");
    assert!(stderr.is_empty(), "unexpected stderr: {stderr}");
    assert_eq!(code, 0);
}

#[test]
fn test_invalid_config_warns_and_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "decimals = \"many\"\n").unwrap();
    let (stdout, stderr, code) = run_command(dir.path(), &["calc", "1 / 4"]);
    assert_eq!(stdout.trim(), "0.25");
    assert!(stderr.contains("Warning:"));
    assert_eq!(code, 0);
}

#[test]
fn test_invalid_expression_exits_nonzero() {
    assert_eq!(calc("10 +"), ("#ERROR!".to_string(), 1));
    assert_eq!(calc("2 ^ 3"), ("#ERROR!".to_string(), 1));
}

#[test]
fn test_calc_references_read_as_empty() {
    assert_eq!(calc("A1 + 1"), ("1".to_string(), 0));
    assert_eq!(calc("=b7 + 3"), ("3".to_string(), 0));
    assert_eq!(calc("A1"), ("#ERROR!".to_string(), 1));

    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) =
        run_command(dir.path(), &["--strict-self-reference", "calc", "A1 + 1"]);
    assert_eq!(stdout.trim(), "1");
    assert_eq!(code, 0);
}

#[test]
fn test_division_by_zero_is_error() {
    assert_eq!(calc("1 / 0"), ("#ERROR!".to_string(), 1));
}

#[test]
fn test_set_get_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("sheet.grd");
    let sheet = sheet.to_str().unwrap();

    let (stdout, _, code) = run_command(
        dir.path(),
        &["set", sheet, "A1: 10", "B1: 20", "C1: =A1 + B1"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("C1 = 30"), "stdout: {stdout}");

    let (stdout, _, code) = run_command(dir.path(), &["set", sheet, "a1: 5"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "A1 = 5\n  C1 = 25");

    let (stdout, _, code) = run_command(dir.path(), &["get", sheet, "C1", "b1"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25\n20");

    let (stdout, _, code) = run_command(dir.path(), &["show", sheet]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("C1"));
    assert!(lines[2].ends_with("25"));
}

#[test]
fn test_set_reports_circular_cells() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("cycle.grd");
    let sheet = sheet.to_str().unwrap();

    let (stdout, _, code) = run_command(dir.path(), &["set", sheet, "A1: =B1", "B1: =A1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("B1 = #CIRC!"));
    assert!(stdout.contains("  A1 = #CIRC!"));
}

#[test]
fn test_strict_self_reference() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("self.grd");
    let sheet = sheet.to_str().unwrap();

    let (stdout, _, _) = run_command(dir.path(), &["set", sheet, "A1: =A1 + 1"]);
    assert_eq!(stdout.trim(), "A1 = 1");

    let (stdout, _, _) = run_command(
        dir.path(),
        &["--strict-self-reference", "set", sheet, "A1: =A1 + 1"],
    );
    assert_eq!(stdout.trim(), "A1 = #CIRC!");
}

#[test]
fn test_invalid_assignment_fails() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("bad.grd");
    let sheet = sheet.to_str().unwrap();

    let (_, stderr, code) = run_command(dir.path(), &["set", sheet, "A1 = 3"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid assignment"));

    let (_, _, code) = run_command(dir.path(), &["set", sheet, "1A: 3"]);
    assert_ne!(code, 0);
}

#[test]
fn test_convert_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let grd = dir.path().join("sheet.grd");
    let json = dir.path().join("sheet.json");
    let back = dir.path().join("back.grd");

    let (_, _, code) = run_command(
        dir.path(),
        &[
            "set",
            grd.to_str().unwrap(),
            "A1: 2",
            "B1: Hello \"world\"",
            "C1: =A1 * A1",
        ],
    );
    assert_eq!(code, 0);

    let (_, _, code) = run_command(
        dir.path(),
        &["convert", grd.to_str().unwrap(), json.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    let text = std::fs::read_to_string(&json).unwrap();
    assert!(text.contains("\"C1\": \"=A1 * A1\""));

    let (_, _, code) = run_command(
        dir.path(),
        &["convert", json.to_str().unwrap(), back.to_str().unwrap()],
    );
    assert_eq!(code, 0);

    let (stdout, _, code) = run_command(dir.path(), &["get", back.to_str().unwrap(), "C1", "B1"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4\nHello \"world\"");
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.grd");
    let (_, stderr, code) = run_command(dir.path(), &["show", missing.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("File not found"));
}
