//! Lifecycle state model and its observer plumbing.

mod controller;
mod lifecycle;

pub use controller::StateController;
pub use lifecycle::LifecycleState;
