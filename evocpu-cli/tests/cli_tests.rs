//! Integration tests for the evocpu CLI.
//!
//! These tests invoke the `evocpu` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn evocpu() -> Command {
    let mut cmd = Command::cargo_bin("evocpu").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Return the absolute path to a test program file.
fn test_program(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/programs")
        .join(name)
}

/// Helper: assemble a program into `dir`, returning the binary path.
fn assemble_to_temp(dir: &TempDir, name: &str) -> PathBuf {
    let output = dir.path().join("genome.gpb");
    evocpu()
        .args([
            "assemble",
            test_program(name).to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    output
}

// ---- No-args / help ----

#[test]
fn no_args_exits_1() {
    evocpu()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag_exits_0() {
    evocpu()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("assemble"));
}

#[test]
fn unknown_command_exits_1() {
    evocpu().arg("frobnicate").assert().failure().code(1);
}

// ---- run ----

#[test]
fn run_countdown() {
    evocpu()
        .args(["run", test_program("countdown.gp").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("steps: 27"))
        .stdout(predicate::str::contains("outputs: 0=15"))
        .stdout(predicate::str::contains("errors: 0"))
        .stdout(predicate::str::contains("halted: true"));
}

#[test]
fn run_with_input() {
    evocpu()
        .args([
            "run",
            test_program("square.gp").to_str().unwrap(),
            "--input",
            "0=3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("outputs: 1=81"));
}

#[test]
fn run_step_budget() {
    evocpu()
        .args([
            "run",
            test_program("countdown.gp").to_str().unwrap(),
            "--steps",
            "4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("steps: 4"))
        .stdout(predicate::str::contains("halted: false"));
}

#[test]
fn run_empty_listing_reports_no_steps() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.gp");
    fs::write(&path, "; nothing here\n").unwrap();
    evocpu()
        .args(["run", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("steps: 0"))
        .stdout(predicate::str::contains("halted: false"));
}

#[test]
fn run_bad_input_flag_exits_1() {
    evocpu()
        .args([
            "run",
            test_program("square.gp").to_str().unwrap(),
            "--input",
            "three",
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn run_scope_overflow_exits_3() {
    evocpu()
        .args(["run", test_program("overflow.gp").to_str().unwrap()])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("scope stack overflow"));
}

#[test]
fn run_bad_listing_exits_1() {
    evocpu()
        .args(["run", test_program("bad.gp").to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2: unknown instruction 'Jump'"));
}

#[test]
fn run_missing_file_exits_1() {
    evocpu()
        .args(["run", "/no/such/genome.gp"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn verbose_logs_to_stderr() {
    evocpu()
        .args(["-v", "run", test_program("countdown.gp").to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded genome"));
}

// ---- trace ----

#[test]
fn trace_prints_state_per_step() {
    let output = evocpu()
        .args([
            "trace",
            test_program("countdown.gp").to_str().unwrap(),
            "--steps",
            "3",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("IP:").count(), 3);
    assert!(text.contains("REGS:"));
    assert!(text.contains("IP:0 scope:0 (SetReg 0 5)"));
}

#[test]
fn trace_runtime_error_exits_3() {
    evocpu()
        .args(["trace", test_program("overflow.gp").to_str().unwrap()])
        .assert()
        .failure()
        .code(3)
        .stdout(predicate::str::contains("IP:15"));
}

// ---- print ----

#[test]
fn print_indents_scopes() {
    evocpu()
        .args(["print", test_program("countdown.gp").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Countdown 0 0 -->\n Inc 0\n"));
}

// ---- assemble / disassemble ----

#[test]
fn assemble_reports_size() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.gpb");
    evocpu()
        .args([
            "assemble",
            test_program("countdown.gp").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("assembled 10 instructions (80 bytes)"));
    assert_eq!(fs::read(&output).unwrap().len(), 80);
}

#[test]
fn assemble_default_output_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prog.gp");
    fs::copy(test_program("countdown.gp"), &input).unwrap();
    evocpu()
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .success();
    assert!(dir.path().join("prog.gpb").exists());
}

#[test]
fn binary_runs_like_listing() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, "countdown.gp");
    evocpu()
        .args(["run", binary.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("outputs: 0=15"));
}

#[test]
fn disassemble_prints_flat_listing() {
    let dir = TempDir::new().unwrap();
    let binary = assemble_to_temp(&dir, "square.gp");
    evocpu()
        .args(["disassemble", binary.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Define 0 0\nInc 9\nMult 1 1 1\n"));
}

#[test]
fn disassemble_truncated_binary_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.gpb");
    fs::write(&path, [0u8; 7]).unwrap();
    evocpu()
        .args(["disassemble", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid binary"));
}

// ---- list ----

#[test]
fn list_shows_catalog() {
    evocpu()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Countdown"))
        .stdout(predicate::str::contains("ScopeReg"))
        .stdout(predicate::str::contains("Backup reg Arg1; restore at end of scope"));
}
