//! Fan-out/fan-in engine behind every screen fetch.
//!
//! A cycle dispatches all of its tasks at once, waits on a counting barrier
//! until each task has produced exactly one outcome, then publishes a single
//! terminal state. Failed tasks never cancel the others.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::CoordinatorConfig;
use crate::service::{ErrorKind, TASK_PANICKED_CODE, TIMED_OUT_CODE};
use crate::state::{LifecycleState, StateController};

use super::barrier::FetchBarrier;
use super::task::{FetchOutcome, FetchTask, MergeFn, TaskFailure};

/// Identifies one cycle in logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleId(Uuid);

impl CycleId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which failure code a cycle with several failures surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The failure recorded last wins.
    ///
    /// Failures are sequenced as they take the cycle lock, so "last" is
    /// well defined even when completions race.
    #[default]
    LastObserved,
    /// The failure recorded first wins.
    FirstObserved,
    /// The failing task declared earliest wins, regardless of timing.
    DeclarationOrder,
}

impl ErrorPolicy {
    pub fn select<'a>(&self, failures: &'a [TaskFailure]) -> Option<&'a TaskFailure> {
        match self {
            ErrorPolicy::LastObserved => failures.iter().max_by_key(|f| f.sequence),
            ErrorPolicy::FirstObserved => failures.iter().min_by_key(|f| f.sequence),
            ErrorPolicy::DeclarationOrder => failures.iter().min_by_key(|f| f.index),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorOptions {
    pub error_policy: ErrorPolicy,
    /// `None` waits for every task indefinitely.
    pub cycle_timeout: Option<Duration>,
}

impl From<&CoordinatorConfig> for CoordinatorOptions {
    fn from(config: &CoordinatorConfig) -> Self {
        Self {
            error_policy: config.error_policy,
            cycle_timeout: config.cycle_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("a fetch cycle is already in progress")]
    CycleInProgress,
}

/// Everything a driver learns from one completed cycle.
#[derive(Debug)]
pub struct CycleReport<S> {
    pub cycle_id: CycleId,
    /// The snapshot after every successful merge.
    pub snapshot: S,
    /// The terminal state that was delivered to the observer.
    pub state: LifecycleState,
    /// All failures, in observation order.
    pub failures: Vec<TaskFailure>,
    pub timed_out: bool,
}

impl<S> CycleReport<S> {
    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    /// Category of the cycle's failure, `Aggregate` when more than one task
    /// failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.failures.as_slice() {
            [] => None,
            [only] => Some(ErrorKind::from_code(only.code)),
            _ => Some(ErrorKind::Aggregate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Announce {
    Loading,
    Silent,
}

/// Runs fetch cycles and reports their outcome to a [`StateController`].
///
/// At most one cycle may be active per coordinator.
pub struct AggregateCoordinator {
    controller: Arc<StateController>,
    options: CoordinatorOptions,
    active: AtomicBool,
}

impl AggregateCoordinator {
    pub fn new(controller: Arc<StateController>, options: CoordinatorOptions) -> Self {
        Self {
            controller,
            options,
            active: AtomicBool::new(false),
        }
    }

    pub fn controller(&self) -> &Arc<StateController> {
        &self.controller
    }

    pub fn options(&self) -> CoordinatorOptions {
        self.options
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Announce `Loading`, run every task, deliver the terminal state.
    ///
    /// `seed` is the snapshot the merges are applied to.
    ///
    /// # Errors
    /// Returns `CycleInProgress` without touching state if another cycle is
    /// still running on this coordinator.
    pub async fn run<S: Send + 'static>(
        &self,
        seed: S,
        tasks: Vec<FetchTask<S>>,
    ) -> Result<CycleReport<S>, CoordinatorError> {
        self.run_cycle(seed, tasks, Announce::Loading).await
    }

    /// Like [`run`](Self::run) but without announcing `Loading`.
    ///
    /// Used for background updates such as appending a page, where the
    /// observer goes straight from one terminal state to the next.
    pub async fn run_silent<S: Send + 'static>(
        &self,
        seed: S,
        tasks: Vec<FetchTask<S>>,
    ) -> Result<CycleReport<S>, CoordinatorError> {
        self.run_cycle(seed, tasks, Announce::Silent).await
    }

    async fn run_cycle<S: Send + 'static>(
        &self,
        seed: S,
        tasks: Vec<FetchTask<S>>,
        announce: Announce,
    ) -> Result<CycleReport<S>, CoordinatorError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Fetch cycle rejected: another cycle is in progress");
            return Err(CoordinatorError::CycleInProgress);
        }
        let _active = scopeguard::guard(&self.active, |active| {
            active.store(false, Ordering::Release)
        });

        let cycle_id = CycleId::new();
        let span = tracing::info_span!("fetch_cycle", cycle_id = %cycle_id, tasks = tasks.len());
        let report = self
            .drive(cycle_id, seed, tasks, announce)
            .instrument(span)
            .await;
        Ok(report)
    }

    async fn drive<S: Send + 'static>(
        &self,
        cycle_id: CycleId,
        seed: S,
        tasks: Vec<FetchTask<S>>,
        announce: Announce,
    ) -> CycleReport<S> {
        if announce == Announce::Loading {
            self.controller.set_state(LifecycleState::Loading);
        }

        let names = tasks.iter().map(FetchTask::name).collect();
        let barrier = Arc::new(FetchBarrier::new(CycleState::new(seed, names)));

        for (index, task) in tasks.into_iter().enumerate() {
            barrier.enter();
            tokio::spawn(run_task(Arc::clone(&barrier), index, task).in_current_span());
        }

        let timed_out = match self.options.cycle_timeout {
            Some(limit) => tokio::time::timeout(limit, barrier.wait()).await.is_err(),
            None => {
                barrier.wait().await;
                false
            }
        };

        if timed_out {
            tracing::warn!(
                pending = barrier.pending(),
                "Fetch cycle timed out, sealing with outstanding tasks"
            );
        }

        let (snapshot, failures) = barrier
            .with_payload(|cycle| cycle.seal(timed_out))
            .expect("fetch cycle sealed more than once");

        let state = match self.options.error_policy.select(&failures) {
            Some(failure) => LifecycleState::Error { code: failure.code },
            None => LifecycleState::Ready,
        };

        match state {
            LifecycleState::Error { code } => tracing::warn!(
                code,
                failures = failures.len(),
                policy = ?self.options.error_policy,
                "Fetch cycle failed"
            ),
            _ => tracing::info!("Fetch cycle ready"),
        }

        self.controller.set_state(state);

        CycleReport {
            cycle_id,
            snapshot,
            state,
            failures,
            timed_out,
        }
    }
}

async fn run_task<S: Send + 'static>(
    barrier: Arc<FetchBarrier<CycleState<S>>>,
    index: usize,
    task: FetchTask<S>,
) {
    let (name, future) = task.into_parts();

    // Leaves the barrier even if the task unwinds, so the cycle never stalls
    // on a panicking service call.
    let guard = scopeguard::guard(Arc::clone(&barrier), move |barrier| {
        tracing::error!(task = name, "Fetch task ended without an outcome");
        barrier.leave_with(|cycle| cycle.record_failure(index, TASK_PANICKED_CODE));
    });

    let result = future.await;
    scopeguard::ScopeGuard::into_inner(guard);

    match &result {
        Ok(_) => tracing::debug!(task = name, "Fetch task succeeded"),
        Err(err) => tracing::warn!(task = name, code = err.code, error = %err, "Fetch task failed"),
    }

    barrier.leave_with(|cycle| match result {
        Ok(merge) => cycle.record_success(index, merge),
        Err(err) => cycle.record_failure(index, err.code),
    });
}

/// Per-cycle payload guarded by the barrier's lock.
struct CycleState<S> {
    /// `None` once the cycle has been sealed.
    snapshot: Option<S>,
    names: Vec<&'static str>,
    outcomes: Vec<Option<FetchOutcome>>,
    failures: Vec<TaskFailure>,
    observed: usize,
}

impl<S> CycleState<S> {
    fn new(seed: S, names: Vec<&'static str>) -> Self {
        Self {
            snapshot: Some(seed),
            outcomes: vec![None; names.len()],
            names,
            failures: Vec::new(),
            observed: 0,
        }
    }

    /// Whether a completion for `index` may still be recorded.
    fn accepts(&self, index: usize) -> bool {
        if self.snapshot.is_none() {
            tracing::debug!(task = self.names[index], "Discarding completion of sealed cycle");
            return false;
        }
        if self.outcomes[index].is_some() {
            tracing::error!(task = self.names[index], "Duplicate outcome for fetch task");
            return false;
        }
        true
    }

    /// Apply a task's merge. A merge that panics counts as a failed task.
    fn record_success(&mut self, index: usize, merge: MergeFn<S>) {
        if !self.accepts(index) {
            return;
        }
        let merged = match self.snapshot.as_mut() {
            Some(snapshot) => panic::catch_unwind(AssertUnwindSafe(|| merge(snapshot))).is_ok(),
            None => true,
        };
        if !merged {
            tracing::error!(task = self.names[index], "Merge panicked");
            self.record_failure(index, TASK_PANICKED_CODE);
            return;
        }
        self.outcomes[index] = Some(FetchOutcome::Success);
        self.observed += 1;
    }

    fn record_failure(&mut self, index: usize, code: i32) {
        if !self.accepts(index) {
            return;
        }
        self.outcomes[index] = Some(FetchOutcome::Failure { code });
        self.failures.push(TaskFailure {
            task: self.names[index],
            index,
            code,
            sequence: self.observed,
        });
        self.observed += 1;
    }

    /// Close the cycle and hand out the snapshot and failures.
    ///
    /// On timeout, tasks without an outcome are recorded as timed out.
    /// Completions arriving after this point are discarded.
    fn seal(&mut self, timed_out: bool) -> Option<(S, Vec<TaskFailure>)> {
        if timed_out {
            for index in 0..self.outcomes.len() {
                if self.outcomes[index].is_none() {
                    self.record_failure(index, TIMED_OUT_CODE);
                }
            }
        }
        debug_assert!(self.outcomes.iter().all(Option::is_some));

        let snapshot = self.snapshot.take()?;
        Some((snapshot, std::mem::take(&mut self.failures)))
    }
}
