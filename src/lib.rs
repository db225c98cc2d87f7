//! Aggregate fetch coordination for the Makub client.
//!
//! Screens issue several independent service calls at once, wait for all of
//! them behind a counting barrier, merge the results into one snapshot and
//! publish a single `Loading` / `Ready` / `Error` lifecycle to an observer.
//!
//! - [`fetch`]: tasks, the barrier, [`fetch::AggregateCoordinator`] and
//!   [`fetch::WindowedListFetcher`]
//! - [`state`]: [`state::LifecycleState`] and [`state::StateController`]
//! - [`service`]: service traits, error codes and a scripted implementation
//! - [`screens`]: view models and the news, game and games-list drivers

pub mod config;
pub mod fetch;
pub mod logging;
pub mod screens;
pub mod service;
pub mod state;
