use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fetch::ErrorPolicy;
use crate::service::Operation;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Fetch cycle behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Upper bound for a whole cycle in milliseconds. Absent means cycles
    /// wait for every task however long it takes.
    #[serde(default)]
    pub cycle_timeout_ms: Option<u64>,
    /// Which failure code to surface when several tasks fail.
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

/// Paging for list screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Items in the first page (default: 80).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Items added by each "load more" (default: 20).
    #[serde(default = "default_increment")]
    pub increment: usize,
}

/// Scripted service behaviour for the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Latency of every scripted call in milliseconds (default: 50).
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Error code each listed operation fails with. Unknown operation
    /// names are rejected while parsing.
    #[serde(default)]
    pub failures: BTreeMap<Operation, i32>,
}

fn default_page_size() -> usize {
    80
}

fn default_increment() -> usize {
    20
}

fn default_latency_ms() -> u64 {
    50
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            increment: default_increment(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            failures: BTreeMap::new(),
        }
    }
}
