//! End-to-end tests for the abtest binary on CSV input

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn abtest_csv() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abtest");
    cmd.arg("--control")
        .arg(fixture("control.csv"))
        .arg("--test")
        .arg(fixture("test.csv"));
    cmd
}

#[test]
fn test_text_report_covers_default_metrics() {
    abtest_csv()
        .assert()
        .success()
        .stdout(predicate::str::contains("=== A/B Test"))
        .stdout(predicate::str::contains(
            "Descriptive statistics: control group (12 rows)",
        ))
        .stdout(predicate::str::contains(
            "Descriptive statistics: test group (12 rows)",
        ))
        .stdout(predicate::str::contains("--- Purchase ---"))
        .stdout(predicate::str::contains("--- Click/Impression ---"))
        .stdout(predicate::str::contains("--- Earning/Click ---"))
        .stdout(predicate::str::contains("Mann-Whitney U"))
        .stdout(predicate::str::contains("Welch"))
        .stdout(predicate::str::contains("test group is higher"));
}

#[test]
fn test_json_report_parses() {
    let output = abtest_csv().arg("--format").arg("json").output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["significance_level"], 0.05);
    assert_eq!(parsed["control"]["rows"], 12);
    assert_eq!(parsed["test"]["rows"], 12);

    let assessments = parsed["assessments"].as_array().unwrap();
    let tests: Vec<&str> = assessments
        .iter()
        .map(|a| a["test"].as_str().unwrap())
        .collect();
    assert_eq!(tests, vec!["mann_whitney_u", "student_t", "welch_t"]);

    let epc = &assessments[2];
    assert_eq!(epc["metric"], "earning_per_click");
    assert_eq!(epc["verdict"]["decision"], "significant");
    assert_eq!(epc["verdict"]["leader"], "test");
    assert!(epc["assumptions"]["homogeneity"].is_object());
    assert!(assessments[0]["assumptions"]["homogeneity"].is_null());
}

#[test]
fn test_single_metric_flag() {
    let output = abtest_csv()
        .arg("--metric")
        .arg("epc")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let assessments = parsed["assessments"].as_array().unwrap();
    assert_eq!(assessments.len(), 1);
    assert_eq!(assessments[0]["metric"], "earning_per_click");
}

#[test]
fn test_config_file_sets_alpha_and_metrics() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("abtest.toml");
    fs::write(
        &config,
        "significance_level = 0.01\nmetrics = [\"click\", \"earning\"]\n",
    )
    .unwrap();

    let output = abtest_csv()
        .arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["significance_level"], 0.01);
    let metrics: Vec<&str> = parsed["assessments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["metric"].as_str().unwrap())
        .collect();
    assert_eq!(metrics, vec!["click", "earning"]);
}

#[test]
fn test_alpha_flag_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("abtest.toml");
    fs::write(&config, "significance_level = 0.01\n").unwrap();

    abtest_csv()
        .arg("--config")
        .arg(&config)
        .arg("--alpha")
        .arg("0.1")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"significance_level\": 0.1"));
}

#[test]
fn test_alpha_flag_repairs_invalid_config_value() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("abtest.toml");
    fs::write(&config, "significance_level = 0\n").unwrap();

    abtest_csv()
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("significance_level must be in (0, 1)"));

    abtest_csv()
        .arg("--config")
        .arg(&config)
        .arg("--alpha")
        .arg("0.05")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"significance_level\": 0.05"));
}

#[test]
fn test_invalid_alpha_fails() {
    abtest_csv()
        .arg("--alpha")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("significance_level must be in (0, 1)"));
}

#[test]
fn test_missing_input_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abtest");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "Must specify either WORKBOOK or both --control and --test",
        ));
}

#[test]
fn test_control_without_test_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abtest");
    cmd.arg("--control")
        .arg(fixture("control.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--control and --test must be given together",
        ));
}

#[test]
fn test_nonexistent_csv_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abtest");
    cmd.arg("--control")
        .arg("/nonexistent/control.csv")
        .arg("--test")
        .arg(fixture("test.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_missing_column_fails() {
    let dir = TempDir::new().unwrap();
    let control = dir.path().join("control.csv");
    fs::write(&control, "Impression,Click,Purchase\n1000,50,5\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abtest");
    cmd.arg("--control")
        .arg(&control)
        .arg("--test")
        .arg(fixture("test.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column 'Earning'"));
}

#[test]
fn test_too_few_rows_fails() {
    let dir = TempDir::new().unwrap();
    let control = dir.path().join("control.csv");
    fs::write(
        &control,
        "Impression,Click,Purchase,Earning\n1000,50,5,200\n1010,52,6,203\n",
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abtest");
    cmd.arg("--control")
        .arg(&control)
        .arg("--test")
        .arg(fixture("test.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient data"));
}

#[test]
fn test_missing_cells_are_reported() {
    let dir = TempDir::new().unwrap();
    let control = dir.path().join("control.csv");
    let mut contents = fs::read_to_string(fixture("control.csv")).unwrap();
    contents.push_str("1120,,6,236\n");
    fs::write(&control, contents).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abtest");
    cmd.arg("--control")
        .arg(&control)
        .arg("--test")
        .arg(fixture("test.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing values: Click=1"));
}

#[test]
fn test_debug_logs_to_stderr() {
    abtest_csv()
        .arg("--debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded control group from CSV"));
}
