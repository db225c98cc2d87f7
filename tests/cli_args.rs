//! Tests for the simulator's command line, run against the built binary.

mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::temp_config;

fn makub_sim(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_makub-sim"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("MAKUB_LOG")
        .output()
        .expect("Failed to execute command")
}

fn instant_config() -> (tempfile::TempDir, std::path::PathBuf) {
    temp_config("[simulation]\nlatency_ms = 0\n")
}

#[test]
fn test_help_lists_subcommands() {
    let output = Command::new(env!("CARGO_BIN_EXE_makub-sim"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for subcommand in ["news", "game", "games"] {
        assert!(stdout.contains(subcommand), "missing {}", subcommand);
    }
}

#[test]
fn test_news_prints_states_and_feed() {
    let (_dir, config) = instant_config();
    let output = makub_sim(&config, &["news"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("state: loading"));
    assert!(stdout.contains("state: ready"));
    assert!(stdout.contains("user: Elena Ivanova"));
    assert!(stdout.contains("news 1: Season opening"));
}

#[test]
fn test_games_filter_keeps_matching_types() {
    let (_dir, config) = instant_config();
    let output = makub_sim(&config, &["games", "--filter", "type=friendly"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("game 101"));
    assert!(stdout.contains("game 103"));
    assert!(!stdout.contains("game 102"));
}

#[test]
fn test_malformed_filter_is_rejected() {
    let (_dir, config) = instant_config();
    let output = makub_sim(&config, &["games", "--filter", "friendly"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("KEY=VALUE"));
}

#[test]
fn test_unknown_game_exits_with_error() {
    let (_dir, config) = instant_config();
    let output = makub_sim(&config, &["game", "999"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Game '999' not found"));
}

#[test]
fn test_scripted_failure_reaches_observer() {
    let (_dir, config) =
        temp_config("[simulation]\nlatency_ms = 0\n\n[simulation.failures]\nnews = -1009\n");
    let output = makub_sim(&config, &["news"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("state: error(-1009)"));
}

#[test]
fn test_invalid_config_exits_with_error() {
    let (_dir, config) = temp_config("[pagination]\npage_size = 0\n");
    let output = makub_sim(&config, &["games"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"));
}
