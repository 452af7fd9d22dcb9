use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn demo_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn run_cellflow(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cellflow"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to run cellflow with args {:?}: {e}", args))
}

fn combined_output(output: &Output) -> String {
    let mut text = String::new();
    text.push_str(&String::from_utf8_lossy(&output.stdout));
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[test]
fn runs_demo_and_prints_result() {
    let file = demo_path("add.cf");
    let output = run_cellflow(&[file.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "7\n");
}

#[test]
fn stall_exits_successfully_with_notice() {
    let file = demo_path("stall.cf");
    let output = run_cellflow(&["run", file.to_str().unwrap()]);
    let text = combined_output(&output);

    assert_eq!(output.status.code(), Some(0), "{}", text);
    assert!(text.contains("stalled: 1 task(s)"), "output:\n{}", text);
}

#[test]
fn flag_without_value_is_usage_error() {
    let file = demo_path("add.cf");
    let output = run_cellflow(&[file.to_str().unwrap(), "--max-steps"]);
    let text = combined_output(&output);

    assert_eq!(output.status.code(), Some(2), "{}", text);
    assert!(text.contains("--max-steps <value>"), "output:\n{}", text);
}

#[test]
fn non_numeric_step_budget_is_usage_error() {
    let file = demo_path("add.cf");
    let output = run_cellflow(&["--max-steps", "many", file.to_str().unwrap()]);
    let text = combined_output(&output);

    assert_eq!(output.status.code(), Some(2), "{}", text);
    assert!(text.contains("non-negative integer"), "output:\n{}", text);
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = run_cellflow(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[test]
fn run_without_file_is_usage_error() {
    let output = run_cellflow(&["run"]);
    let text = combined_output(&output);

    assert_eq!(output.status.code(), Some(2), "{}", text);
    assert!(text.contains("Usage: cellflow run"), "output:\n{}", text);
}
