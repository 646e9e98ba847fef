#![allow(missing_docs)]

use std::process::{Command, Output};

use recast_testkit::fixture_path;
use serde_json::Value;

#[test]
fn unmarshal_json_output_is_valid_and_structured() {
	let json = run_json(&[
		"unmarshal",
		&fixture("account.catalog.json"),
		&fixture("account.json"),
		"--root",
		"Account",
		"--json",
	]);

	assert_eq!(json["root"], "Account");
	let instance = &json["instance"];
	assert_eq!(instance["type"], "Account");
	assert_eq!(instance["fields"]["account_number"], 12345678);
	assert_eq!(instance["fields"]["date_opened"], "2020-11-03 12:32:12");
	assert_eq!(instance["fields"]["account_holder"]["fields"]["date_of_birth"], "1980-02-28");
	assert!(instance["fields"]["account_holder"]["fields"].get("middle_names").is_none());
}

#[test]
fn unmarshal_list_root_reports_list_label() {
	let json = run_json(&[
		"unmarshal",
		&fixture("account.catalog.json"),
		&fixture("accounts.json"),
		"--root",
		"Account",
		"--list",
		"--json",
	]);

	assert_eq!(json["root"], "List[Account]");
	assert!(json["instance"].as_array().is_some_and(|items| items.len() == 2));
}

#[test]
fn unmarshal_text_output_prints_indented_tree() {
	let output = run(&["unmarshal", &fixture("account.catalog.json"), &fixture("account.json"), "--root", "Account"]);
	assert!(output.status.success());

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.starts_with("root: Account\ninstance:\n  Account {\n"), "stdout: {stdout}");
	assert!(stdout.contains("    account_type = \"SAVING\""));
	assert!(stdout.contains("    date_opened = datetime 2020-11-03 12:32:12"));
	assert!(stdout.contains("        middle_names = <absent>"));
}

#[test]
fn unmarshal_parses_custom_date_formats() {
	let json = run_json(&[
		"unmarshal",
		&fixture("account.catalog.json"),
		&fixture("account_custom_formats.json"),
		"--root",
		"Account",
		"--date-format",
		"%d %B %y",
		"--datetime-format",
		"%d %B %y %I %M %S %p",
		"--json",
	]);

	assert_eq!(json["instance"]["fields"]["account_holder"]["fields"]["date_of_birth"], "1980-02-28");
}

#[test]
fn unmarshal_rejects_invalid_format_pattern() {
	let output = run(&[
		"unmarshal",
		&fixture("account.catalog.json"),
		&fixture("account.json"),
		"--root",
		"Account",
		"--date-format",
		"%Q",
	]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("invalid time format"));
}

#[test]
fn roundtrip_with_custom_formats_is_equal() {
	let json = run_json(&[
		"roundtrip",
		&fixture("account.catalog.json"),
		&fixture("account_custom_formats.json"),
		"--root",
		"Account",
		"--date-format",
		"%d %B %y",
		"--datetime-format",
		"%d %B %y %I %M %S %p",
		"--json",
	]);

	assert_eq!(json["equal"], true);
	assert_eq!(json["output"]["dateOpened"], "03 November 20 12 32 12 PM");
}

#[test]
fn roundtrip_reports_dropped_keys_as_unequal() {
	let json = run_json(&[
		"roundtrip",
		&fixture("account.catalog.json"),
		&fixture("accounts.json"),
		"--root",
		"Account",
		"--list",
		"--json",
	]);

	assert_eq!(json["equal"], false);
	assert!(json["output"][1]["accountHolder"].get("nickname").is_none());
}

#[test]
fn check_lists_records() {
	let output = run(&["check", &fixture("account.catalog.json")]);
	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("records: 3"));
	assert!(stdout.contains("Account: 5 fields"));
	assert!(stdout.contains("date_of_birth (dob): String [date] required"));
}

#[test]
fn errors_go_to_stderr_with_failure_status() {
	let output = run(&["check", &fixture("union_record.catalog.json")]);
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.starts_with("error: invalid union schema"), "stderr: {stderr}");

	let output = run(&[
		"unmarshal",
		&fixture("account.catalog.json"),
		&fixture("account.json"),
		"--root",
		"Nope",
	]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("unknown record Nope"));
}

fn fixture(name: &str) -> String {
	fixture_path(name).display().to_string()
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_recast"))
		.args(args)
		.env_remove("RUST_LOG")
		.output()
		.expect("command executes")
}

fn run_json(args: &[&str]) -> Value {
	let output = run(args);
	assert!(
		output.status.success(),
		"recast command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}
