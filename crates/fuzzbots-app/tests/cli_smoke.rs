use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(label: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "fuzzbots_cli_{label}_{}_{nanos}.{extension}",
        std::process::id()
    ))
}

fn fuzzbots(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fuzzbots"))
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("FUZZBOTS_SEED")
        .output()
        .expect("failed to run fuzzbots binary")
}

#[test]
fn train_then_run_then_compare() {
    let params = temp_path("params", "json");
    let history = temp_path("history", "jsonl");
    let params_arg = params.to_string_lossy().into_owned();
    let history_arg = history.to_string_lossy().into_owned();

    let output = fuzzbots(&[
        "train",
        "--map",
        "simple",
        "--population",
        "4",
        "--elite",
        "1",
        "--generations",
        "2",
        "--max-steps",
        "200",
        "--seed",
        "11",
        "--out",
        &params_arg,
        "--history",
        &history_arg,
    ]);
    assert!(output.status.success(), "train failed: {output:?}");
    let saved = std::fs::read_to_string(&params).expect("params written");
    let genes: Vec<f32> = serde_json::from_str(&saved).expect("params are a JSON list");
    assert_eq!(genes.len(), 4);
    let lines = std::fs::read_to_string(&history).expect("history written");
    assert_eq!(lines.lines().count(), 2);

    let output = fuzzbots(&["run", "--params", &params_arg, "--map", "simple"]);
    assert!(output.status.success(), "run failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("step_count"), "missing result json: {stdout}");

    let output = fuzzbots(&[
        "compare",
        "--params",
        &params_arg,
        "--rounds",
        "2",
        "--map",
        "simple",
        "--seed",
        "5",
        "--max-steps",
        "200",
    ]);
    assert!(output.status.success(), "compare failed: {output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("rounds"));

    let _ = std::fs::remove_file(&params);
    let _ = std::fs::remove_file(&history);
}

#[test]
fn run_uses_defaults_without_a_params_file() {
    let output = fuzzbots(&["run", "--map", "empty", "--start", "360,460,3.14"]);
    assert!(output.status.success(), "run failed: {output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("goal"));
}

#[test]
fn missing_params_file_fails() {
    let missing = temp_path("missing", "json");
    let output = fuzzbots(&["compare", "--params", &missing.to_string_lossy()]);
    assert!(!output.status.success());
}

#[test]
fn malformed_start_is_rejected() {
    let output = fuzzbots(&["run", "--start", "1,2"]);
    assert!(!output.status.success());
}

#[test]
fn huge_start_heading_runs_to_completion() {
    let output = fuzzbots(&[
        "run",
        "--map",
        "empty",
        "--start",
        "0,0,1e10",
        "--max-steps",
        "50",
    ]);
    assert!(output.status.success(), "run failed: {output:?}");
}
