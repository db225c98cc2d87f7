//! Configuration loading for the coordinator, list paging and the simulator.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, CoordinatorConfig, PaginationConfig, SimulationConfig};
