//! End-to-end tests driving the `bounty` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};

fn bounty_binary() -> String {
    env!("CARGO_BIN_EXE_bounty").to_string()
}

/// Runs `bounty` with `home` as both home and config directory, so only the
/// given `--config` file (if any) is read.
fn run_bounty(home: &Path, args: &[&str]) -> Output {
    Command::new(bounty_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run bounty")
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const APRIL_CONFIG: &str = r#"
reference_date = "2022-03-31"
reference_balance = 10.0
hours_on_holidays = 0.0
"#;

#[test]
fn test_balance_with_explicit_hours() {
    let home = TempDir::new().unwrap();
    let config = write_config(APRIL_CONFIG);
    let output = run_bounty(
        home.path(),
        &[
            "--config",
            config.path().to_str().unwrap(),
            "balance",
            "--hours",
            "135",
            "--to",
            "2022-04-30",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Balance:   17.50 (17:30)"));
}

#[test]
fn test_balance_json_output() {
    let home = TempDir::new().unwrap();
    let config = write_config(APRIL_CONFIG);
    let output = run_bounty(
        home.path(),
        &[
            "balance",
            "--config",
            config.path().to_str().unwrap(),
            "--hours",
            "127.5",
            "--to",
            "2022-04-30",
            "--json",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["balance"], 10.0);
    assert_eq!(value["breakdown"]["holidays_on_workdays"], 4);
}

#[test]
fn test_environment_overrides_config_file() {
    let home = TempDir::new().unwrap();
    let config = write_config(APRIL_CONFIG);
    let output = Command::new(bounty_binary())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("BOUNTY_REFERENCE_BALANCE", "-2.5")
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "balance",
            "--hours",
            "127.5",
            "--to",
            "2022-04-30",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Balance:   -2.50 (-02:30)"));
}

#[test]
fn test_environment_sets_specific_holiday_hours() {
    let home = TempDir::new().unwrap();
    let config = write_config("reference_date = \"2021-12-23\"\nreference_balance = \"01:00\"\n");
    let output = Command::new(bounty_binary())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("BOUNTY_HOURS_ON_SPECIFIC_HOLIDAYS__CHRISTMASEVE", "03:45")
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "balance",
            "--hours",
            "0",
            "--to",
            "2021-12-24",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Balance:   -2.75 (-02:45)"), "stdout: {}", stdout(&output));
}

#[test]
fn test_empty_entry_filter_fails_to_load() {
    let home = TempDir::new().unwrap();
    let config = write_config(
        "integration = \"clockify\"\nreference_date = \"2022-03-31\"\n[clockify]\napi_key = \"k\"\nworkspace_id = \"w\"\nentries_to_ignore = [{}]\n",
    );
    let output = run_bounty(
        home.path(),
        &["--config", config.path().to_str().unwrap(), "balance", "--to", "2022-04-30"],
    );

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("entries_to_ignore filters cannot be empty"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_balance_before_reference_date_fails() {
    let home = TempDir::new().unwrap();
    let config = write_config(APRIL_CONFIG);
    let output = run_bounty(
        home.path(),
        &[
            "--config",
            config.path().to_str().unwrap(),
            "balance",
            "--hours",
            "0",
            "--to",
            "2022-03-01",
        ],
    );

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("\"referenceDate\" date cannot be later than \"to\" date"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_balance_without_reference_date_fails() {
    let home = TempDir::new().unwrap();
    let output = run_bounty(home.path(), &["balance", "--hours", "1"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("reference_date is not configured"));
}

#[test]
fn test_unknown_holiday_name_fails_to_load() {
    let home = TempDir::new().unwrap();
    let config = write_config("[hours_on_specific_holidays]\nmidsummerEve = 3.75\n");
    let output = run_bounty(
        home.path(),
        &["--config", config.path().to_str().unwrap(), "days", "--from", "2022-01-01", "--to", "2022-01-02"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown holiday name: midsummerEve"));
}

#[test]
fn test_missing_placeholder_variable_fails() {
    let home = TempDir::new().unwrap();
    let config = write_config(
        "integration = \"xledger\"\n[xledger]\napi_key = \"${BOUNTY_TEST_UNSET_KEY}\"\nemployee_id = 1\n",
    );
    let output = Command::new(bounty_binary())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("BOUNTY_TEST_UNSET_KEY")
        .args(["--config", config.path().to_str().unwrap(), "holidays"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("BOUNTY_TEST_UNSET_KEY"));
}

#[test]
fn test_holidays_listing() {
    let home = TempDir::new().unwrap();
    let output = run_bounty(
        home.path(),
        &["holidays", "--from", "2022-12-24", "--to", "2023-01-01", "--json"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let rows: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    let dates: Vec<&str> = rows.iter().map(|row| row["date"].as_str().unwrap()).collect();
    assert_eq!(
        dates,
        ["2022-12-24", "2022-12-25", "2022-12-26", "2022-12-31", "2023-01-01"]
    );
}

#[test]
fn test_days_rejects_reversed_range() {
    let home = TempDir::new().unwrap();
    let output = run_bounty(home.path(), &["days", "--from", "2022-02-01", "--to", "2022-01-01"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("\"from\" date cannot be later than \"to\" date"));
}

#[test]
fn test_init_then_load() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom").join("bounty.toml");
    let path_str = path.to_str().unwrap();

    let output = run_bounty(home.path(), &["--config", path_str, "init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(path.exists());

    let output = run_bounty(home.path(), &["--config", path_str, "init"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));

    let output = run_bounty(home.path(), &["--config", path_str, "init", "--force"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_bounty(
        home.path(),
        &["--config", path_str, "days", "--from", "2022-04-01", "--to", "2022-04-30"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Off-days: 9"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let home = TempDir::new().unwrap();
    let output = run_bounty(home.path(), &[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}
