//! Integration tests for the CLI interface
//!
//! Each test runs the binary inside its own temporary working directory.

use assert_cmd::Command;
use chrono::{Days, NaiveDate};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"
orchestration:
  folder_path: orchestrate
model:
  data:
    training_end_date: "2021-01-01"
    shift: -1
  linear:
    ridge_alpha: 0.5
preprocess:
  sources:
    - file: raw/al.csv
      columns:
        price: AL_PRICE
    - file: raw/oil.csv
      date_column: Date
      date_format: "%d/%m/%Y"
      columns:
        Close: OIL_PRICE
"#;

fn al_engine(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("al-engine").unwrap();
    cmd.current_dir(dir).env_remove("AL_ENGINE_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_project(dir: &Path) {
    std::fs::write(dir.join("config.yaml"), CONFIG).unwrap();

    let raw = dir.join("data/raw");
    std::fs::create_dir_all(&raw).unwrap();
    let start = NaiveDate::from_ymd_opt(2020, 12, 20).unwrap();
    let mut al = String::from("date,price\n");
    let mut oil = String::from("Date,Close\n");
    for i in 0..20u64 {
        let day = start.checked_add_days(Days::new(i)).unwrap();
        al.push_str(&format!("{},{}\n", day.format("%Y-%m-%d"), 2000 + (i * 37 % 11) * 3 + i));
        oil.push_str(&format!("{},{}\n", day.format("%d/%m/%Y"), 50 + i * 13 % 7));
    }
    std::fs::write(raw.join("al.csv"), al).unwrap();
    std::fs::write(raw.join("oil.csv"), oil).unwrap();
}

fn run_folders(dir: &Path) -> Vec<std::path::PathBuf> {
    let runs = dir.join("runs");
    if !runs.exists() {
        return Vec::new();
    }
    std::fs::read_dir(runs)
        .unwrap()
        .flat_map(|bucket| std::fs::read_dir(bucket.unwrap().path()).unwrap())
        .map(|run| run.unwrap().path())
        .collect()
}

#[test]
fn test_cli_help_flag() {
    let dir = TempDir::new().unwrap();
    al_engine(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("<ORCHESTRATION>"));
}

#[test]
fn test_missing_orchestration_argument() {
    let dir = TempDir::new().unwrap();
    al_engine(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_missing_settings_file_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    al_engine(dir.path())
        .arg("preprocess")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E1001"));

    assert!(run_folders(dir.path()).is_empty());
}

#[test]
fn test_verbose_failure_describes_the_error_code() {
    let dir = TempDir::new().unwrap();
    al_engine(dir.path())
        .args(["-v", "preprocess"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Error kind [E1001]: Settings file not found or unreadable",
        ));
}

#[test]
fn test_settings_path_from_environment() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());
    std::fs::rename(dir.path().join("config.yaml"), dir.path().join("custom.yaml")).unwrap();

    al_engine(dir.path())
        .env("AL_ENGINE_CONFIG", "custom.yaml")
        .arg("no-such-pipeline")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no-such-pipeline"));
}

#[test]
fn test_unknown_orchestration_writes_no_run() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    al_engine(dir.path())
        .arg("no-such-pipeline")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E5001"));

    assert!(!dir.path().join("runs").exists());
}

#[test]
fn test_module_failure_exit_code_and_run_log() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());
    std::fs::remove_file(dir.path().join("data/raw/oil.csv")).unwrap();

    al_engine(dir.path())
        .arg("preprocess")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("CleanEngineer"));

    let runs = run_folders(dir.path());
    assert_eq!(runs.len(), 1);
    let log = std::fs::read_to_string(runs[0].join("logs/run.log")).unwrap();
    assert!(log.contains("Start of module CleanEngineer..."));
    assert!(!log.contains("End of module CleanEngineer..."));
    assert!(!log.contains("Start of module Scaling..."));
}

#[test]
fn test_full_pipeline_from_definition_file() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());
    std::fs::create_dir_all(dir.path().join("orchestrate")).unwrap();
    std::fs::write(
        dir.path().join("orchestrate/full.yaml"),
        "modules:\n  - CleanEngineer\n  - Scaling\n  - Differencing\n  - PrepareTraining\n  - LinearModel\n",
    )
    .unwrap();

    al_engine(dir.path()).arg("full").assert().success();

    let processed = dir.path().join("data/processed");
    for file in [
        "cleaned_data.csv",
        "scaled_cleaned_data.csv",
        "differenced_scaled_cleaned_data.csv",
    ] {
        assert!(processed.join(file).is_file(), "missing {file}");
    }

    let modelling = dir.path().join("data/modelling");
    for file in [
        "training_unshifted.csv",
        "testing_unshifted.csv",
        "training_shifted.csv",
        "testing_shifted.csv",
        "linear_regression_train_results.csv",
        "linear_regression_test_results.csv",
        "ridge_regression_train_results.csv",
        "ridge_regression_test_results.csv",
    ] {
        assert!(modelling.join(file).is_file(), "missing {file}");
    }

    let runs = run_folders(dir.path());
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert!(run.join("run.json").is_file());
    assert!(run
        .join("plots/linear_regression_prediction_out_of_sample.png")
        .is_file());

    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(run.join("run.json")).unwrap()).unwrap();
    assert_eq!(
        metadata["run_id"].as_str(),
        run.file_name().and_then(|n| n.to_str())
    );

    let log = std::fs::read_to_string(run.join("logs/run.log")).unwrap();
    assert!(log.contains("End of module LinearModel..."));
}

#[test]
fn test_two_runs_get_distinct_folders() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    al_engine(dir.path()).arg("preprocess").assert().success();
    al_engine(dir.path()).arg("preprocess").assert().success();

    let runs = run_folders(dir.path());
    assert_eq!(runs.len(), 2);
    assert_ne!(runs[0], runs[1]);
}
