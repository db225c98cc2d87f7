//! Aggregate fetching: tasks, the counting barrier, the coordinator and the
//! windowed list fetcher built on it.

mod barrier;
mod coordinator;
mod filter;
mod task;
mod window;
mod windowed;

pub use barrier::FetchBarrier;
pub use coordinator::{
    AggregateCoordinator, CoordinatorError, CoordinatorOptions, CycleId, CycleReport, ErrorPolicy,
};
pub use filter::{FilterSet, Filterable};
pub use task::{FetchOutcome, FetchTask, TaskFailure};
pub use window::{Window, WindowError};
pub use windowed::{ListSource, WindowedListFetcher};
