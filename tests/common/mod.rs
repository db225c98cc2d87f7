//! Shared test utilities and fixtures.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use makub_core::fetch::FetchTask;
use makub_core::service::{Game, ScriptedService, ServiceError};
use makub_core::state::{LifecycleState, StateController};
use parking_lot::Mutex;
use tempfile::TempDir;

pub type StateLog = Arc<Mutex<Vec<LifecycleState>>>;

/// Register an observer that records every delivered state.
pub fn record_states(controller: &StateController) -> StateLog {
    let log: StateLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    controller.observe(move |state| sink.lock().push(state));
    log
}

/// Demo fixtures answering without latency.
pub fn instant_demo() -> ScriptedService {
    ScriptedService::demo().with_latency(Duration::ZERO)
}

/// `count` games with ids from 1, cycling through three game types.
pub fn sample_games(count: usize) -> Vec<Game> {
    const TYPES: [&str; 3] = ["Friendly", "Ranked", "friendly"];
    (1..=count)
        .map(|id| Game {
            id: id.to_string(),
            game_type: TYPES[(id - 1) % TYPES.len()].to_string(),
            status: "finished".to_string(),
            stage: "0".to_string(),
            player1: format!("Player {}", id),
            player2: format!("Player {}", id + 1),
            ..Game::default()
        })
        .collect()
}

/// Task that waits `delay` and then pushes `value` onto the snapshot.
pub fn delayed_push(name: &'static str, delay: Duration, value: u32) -> FetchTask<Vec<u32>> {
    FetchTask::new(
        name,
        async move {
            tokio::time::sleep(delay).await;
            Ok(value)
        },
        |snapshot: &mut Vec<u32>, value| snapshot.push(value),
    )
}

/// Task that waits `delay` and then fails with `code`.
pub fn delayed_failure(name: &'static str, delay: Duration, code: i32) -> FetchTask<Vec<u32>> {
    FetchTask::new(
        name,
        async move {
            tokio::time::sleep(delay).await;
            Err::<u32, _>(ServiceError::new(code, format!("{} failed", name)))
        },
        |snapshot: &mut Vec<u32>, value| snapshot.push(value),
    )
}

/// Write `content` to a config file inside a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
