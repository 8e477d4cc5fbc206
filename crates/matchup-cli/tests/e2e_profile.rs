//! E2E tests for sign-in, preferences, screens, and the maintenance commands.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a config whose profile lives inside `dir`.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let config = dir.join("config.toml");
    let profile = dir.join("profile.json");
    fs::write(
        &config,
        format!(
            "[storage]\npath = {:?}\n{extra}",
            profile.to_string_lossy()
        ),
    )
    .expect("write config");
    config
}

fn matchup_cmd(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("matchup"));
    cmd.arg("--config").arg(config);
    cmd.env("MATCHUP_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn json_of(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn login_whoami_logout_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");

    let whoami = json_of(matchup_cmd(&config).arg("whoami"));
    assert_eq!(whoami["signed_in"], false);
    assert!(whoami["user"].is_null());

    let login = json_of(matchup_cmd(&config).args(["login", "  Zara  "]));
    assert_eq!(login["user"], "Zara");

    let profile = fs::read_to_string(dir.path().join("profile.json")).expect("profile written");
    let stored: Value = serde_json::from_str(&profile).expect("profile is JSON");
    assert_eq!(stored["userName"], "Zara");
    assert_eq!(stored["isNameEntered"], "true");

    matchup_cmd(&config)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("user=Zara"));

    matchup_cmd(&config).arg("logout").assert().success();
    let whoami = json_of(matchup_cmd(&config).arg("whoami"));
    assert_eq!(whoami["signed_in"], false);
}

#[test]
fn short_names_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");

    matchup_cmd(&config)
        .args(["login", " Al "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 3 characters"));
    assert!(!dir.path().join("profile.json").exists());
}

#[test]
fn prefs_clamp_and_persist() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");

    let defaults = json_of(matchup_cmd(&config).arg("prefs"));
    assert_eq!(defaults["speech_rate"], 0.75);
    assert_eq!(defaults["volume"], 1.0);

    let saved = json_of(matchup_cmd(&config).args(["prefs", "--speech-rate", "9", "--volume", "0.5"]));
    assert_eq!(saved["speech_rate"], 2.0);
    assert_eq!(saved["volume"], 0.5);

    matchup_cmd(&config)
        .arg("prefs")
        .assert()
        .success()
        .stdout(predicate::str::contains("speech_rate=2 volume=0.5"));
}

#[test]
fn screens_include_configured_decks() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(
        dir.path(),
        r#"
[[screens]]
id = "colors"
title = "Colours"
pairs = [["Red", "Laal"], ["Green", "Hara"], ["Blue", "Neela"]]
"#,
    );

    let screens = json_of(matchup_cmd(&config).arg("screens"));
    let ids: Vec<&str> = screens
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|screen| screen["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["numbers", "tables", "genders", "colors"]);
    assert_eq!(screens[0]["pairs"], 9);
    assert_eq!(screens[3]["pairs"], 3);
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("config.toml");
    fs::write(&config, "[game\n").expect("write config");

    matchup_cmd(&config)
        .arg("screens")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn sim_campaign_passes() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");

    let report = json_of(matchup_cmd(&config).args(["sim", "--seeds", "0..8", "--screen", "genders"]));
    assert_eq!(report["seeds_run"], 8);
    assert_eq!(report["all_passed"], true);
}

#[test]
fn sim_replay_lists_players() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");

    let trace = json_of(matchup_cmd(&config).args(["sim", "--replay", "3", "--players", "2"]));
    assert_eq!(trace["seed"], 3);
    assert_eq!(trace["players"].as_array().map(Vec::len), Some(2));
    assert_eq!(trace["oracle"]["passed"], true);
}

#[test]
fn completions_mention_binary() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");

    matchup_cmd(&config)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matchup"));
}
