//! E2E tests for `matchup drill` driven through stdin.

use assert_cmd::Command;
use matchup_core::{Drill, DrillKind, LearningBoard};
use predicates::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &Path) -> PathBuf {
    let config = dir.join("config.toml");
    fs::write(
        &config,
        format!(
            "[storage]\npath = {:?}\n",
            dir.join("profile.json").to_string_lossy()
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

fn signed_in() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path());
    matchup_cmd(&config)
        .args(["login", "Bilal"])
        .assert()
        .success();
    (dir, config)
}

/// Correct answers for the first `count` questions `drill --seed` asks.
fn answer_script(kind: DrillKind, seed: u64, count: usize) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut drill = Drill::new(kind, &mut rng);
    let mut script = String::new();
    for _ in 0..count {
        let answer = drill.question().answer().to_string();
        script.push_str(&answer);
        script.push('\n');
        drill.submit(&answer, &mut rng);
    }
    script
}

#[test]
fn drill_requires_sign_in() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path());

    matchup_cmd(&config)
        .args(["drill", "subtraction"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sign in first"));
}

#[test]
fn ten_right_answers_clear_the_level() {
    let (_dir, config) = signed_in();
    // Two extra lines after the tenth answer are never read.
    let script = answer_script(DrillKind::Subtraction, 17, 12);

    let output = matchup_cmd(&config)
        .args(["drill", "subtraction", "--seed", "17", "--json"])
        .write_stdin(script)
        .output()
        .expect("drill should not crash");
    assert!(
        output.status.success(),
        "drill failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(result["player"], "Bilal");
    assert_eq!(result["mode"], "subtraction");
    assert_eq!(result["score"], 10);
    assert_eq!(result["attempts"], 10);
    assert_eq!(result["cleared"], true);
    let answers = result["answers"].as_array().expect("answers");
    assert_eq!(answers.len(), 10);
    assert_eq!(answers.last().map(|a| &a["level_cleared"]), Some(&Value::from(true)));
}

#[test]
fn wrong_and_garbage_answers_are_counted() {
    let (_dir, config) = signed_in();

    matchup_cmd(&config)
        .args(["drill", "tens", "--seed", "3"])
        .write_stdin("1\nforty\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("drill player=Bilal mode=tens"))
        .stdout(predicate::str::contains("given=1"))
        .stdout(predicate::str::contains("given=none"))
        .stdout(predicate::str::contains("cue wrong"))
        .stdout(predicate::str::contains("result score=0 attempts=2 cleared=false"));
}

#[test]
fn learning_board_speaks_and_replaces_a_pair() {
    let (_dir, config) = signed_in();
    let mut rng = StdRng::seed_from_u64(6);
    let first = LearningBoard::new(&mut rng).pairs()[0].clone();

    matchup_cmd(&config)
        .args(["drill", "learn", "--seed", "6"])
        .write_stdin("1\n9\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "say text={:?}",
            first.masculine
        )))
        .stdout(predicate::str::contains(format!(
            "say text={:?}",
            first.feminine
        )))
        .stdout(predicate::str::contains("unrecognised input \"9\""))
        .stdout(predicate::str::contains("result reveals=1"));
}
