//! Integration tests for the `woz-decode` binary entry point.
//!
//! Verifies the report stream, exit statuses, and that logs stay off
//! standard output.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn woz_decode() -> assert_cmd::Command {
    let mut command = cargo_bin_cmd!("woz-decode");
    for key in [
        "WOZ_CONSTANTS_PATH",
        "WOZ_SCENARIO_DIR",
        "WOZ_LOG_FILTER",
        "WOZ_LOG_FORMAT",
    ] {
        command.env_remove(key);
    }
    command
}

#[test]
fn decodes_messages_from_stdin() {
    woz_decode()
        .write_stdin(concat!(
            r#"{"sender": "Wizard", "message": {"text": "[DONE] finished early"}}"#,
            "\n",
            r#"{"sender": "Wizard", "message": {"text": "[SELECT_REFERENCE]"}}"#,
            "\n",
        ))
        .assert()
        .success()
        .stdout(contains(
            r#"{"line":1,"kind":"task_done","outbound":{"id":"Wizard","text":""}}"#,
        ))
        .stdout(contains(r#"{"line":2,"kind":"select_secondary""#));
}

#[test]
fn failed_lines_exit_with_failure() {
    woz_decode()
        .write_stdin("{\"sender\": \"User\", \"message\": {\"text\": \"[PICK_SUGGESTION]\"}}\n")
        .assert()
        .code(1)
        .stdout(contains("requires field 'extracted_from_text'"));
}

#[test]
fn compact_logs_go_to_stderr() {
    woz_decode()
        .args(["--log-format", "compact", "--log-filter", "woz_decode=debug"])
        .write_stdin("{\"sender\": \"User\", \"message\": {\"text\": \"hi\"}}\n")
        .assert()
        .success()
        .stdout(contains("line decoded").not())
        .stderr(contains("woz_decode::report"))
        .stderr(contains("line decoded"));
}

#[test]
fn protocol_logs_follow_the_crate_filter() {
    woz_decode()
        .args(["--log-format", "compact", "--log-filter", "woz_protocol=debug"])
        .write_stdin("{\"sender\": \"User\", \"message\": {\"text\": \"hi\"}}\n")
        .assert()
        .success()
        .stderr(contains("woz_protocol::decoder"))
        .stderr(contains("decoding message"))
        .stderr(contains("woz_decode::report").not());
}

#[test]
fn custom_constants_change_the_prefixes() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mut tables: serde_json::Value =
        serde_json::from_str(include_str!("../../woz-protocol/data/constants.json"))?;
    if let Some(prefixes) = tables
        .get_mut("front_to_back")
        .and_then(serde_json::Value::as_object_mut)
    {
        prefixes.insert("done_prefix".to_owned(), "/done".into());
    }
    let path = dir.path().join("constants.json");
    fs::write(&path, serde_json::to_string(&tables)?)?;

    woz_decode()
        .env("WOZ_CONSTANTS_PATH", &path)
        .write_stdin("{\"sender\": \"User\", \"message\": {\"text\": \"/done\"}}\n")
        .assert()
        .success()
        .stdout(contains(r#""kind":"task_done""#));
    Ok(())
}

#[test]
fn setup_uses_the_scenario_directory() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("ride.json"),
        r#"{"instructions": {"Wizard": {
            "task_description": "Book the ride.",
            "completion_requirements": ["The ride is booked"],
            "completion_questions": []
        }}}"#,
    )?;

    woz_decode()
        .arg("--scenario-dir")
        .arg(dir.path())
        .write_stdin("{\"setup\": {\"scenario\": \"ride\", \"role\": \"wizard\"}}\n")
        .assert()
        .success()
        .stdout(contains(r#""task_description":"Book the ride.""#));
    Ok(())
}

#[test]
fn invalid_configuration_exits_with_two() {
    woz_decode()
        .args(["--log-filter", "  "])
        .assert()
        .code(2)
        .stderr(contains("log filter must not be empty"));
}
