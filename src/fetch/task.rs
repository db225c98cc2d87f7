//! A single unit of work inside a fetch cycle.

use std::future::Future;
use std::pin::Pin;

use crate::service::ServiceError;

/// Applies a successful result to the cycle's snapshot.
pub(crate) type MergeFn<S> = Box<dyn FnOnce(&mut S) + Send>;

pub(crate) type TaskFuture<S> = Pin<Box<dyn Future<Output = Result<MergeFn<S>, ServiceError>> + Send>>;

/// One service call plus the merge applied to the snapshot on success.
///
/// The merge must only write the snapshot field(s) it owns. Tasks in one
/// cycle complete in any order, so a merge may not read what another task
/// writes; a task that needs another's result belongs in a later cycle.
pub struct FetchTask<S> {
    name: &'static str,
    future: TaskFuture<S>,
}

impl<S: 'static> FetchTask<S> {
    /// Build a task from a service call and the merge applied to its model.
    pub fn new<M, Fut, F>(name: &'static str, operation: Fut, merge: F) -> Self
    where
        M: Send + 'static,
        Fut: Future<Output = Result<M, ServiceError>> + Send + 'static,
        F: FnOnce(&mut S, M) + Send + 'static,
    {
        let future = async move {
            let model = operation.await?;
            let merge: MergeFn<S> = Box::new(move |snapshot: &mut S| merge(snapshot, model));
            Ok(merge)
        };
        Self {
            name,
            future: Box::pin(future),
        }
    }

    /// A task that fails immediately, for inputs rejected before dispatch.
    ///
    /// Keeps the failure inside the cycle so it reaches the observer as an
    /// `Error` state like any other failure.
    pub fn failing(name: &'static str, error: ServiceError) -> Self {
        Self {
            name,
            future: Box::pin(async move { Err(error) }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn into_parts(self) -> (&'static str, TaskFuture<S>) {
        (self.name, self.future)
    }
}

impl<S> std::fmt::Debug for FetchTask<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchTask").field("name", &self.name).finish()
    }
}

/// Result of one task within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The task succeeded and its merge has been applied.
    Success,
    Failure { code: i32 },
}

/// A failed task as reported at the end of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: &'static str,
    /// Position of the task in the list passed to the coordinator.
    pub index: usize,
    pub code: i32,
    /// Order in which the failure was observed within the cycle, from 0.
    pub sequence: usize,
}
