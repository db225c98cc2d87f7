//! Holds the current lifecycle state and the screen's observer.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::lifecycle::LifecycleState;

type Handler = Arc<dyn Fn(LifecycleState) + Send + Sync>;

/// Current lifecycle state plus at most one observer.
///
/// Registering a new observer replaces the previous one. Each `set_state`
/// invokes the observer exactly once, synchronously, on the caller's task,
/// after the internal lock has been released (so the observer may read
/// [`StateController::current`]). Concurrent setters must be serialized by
/// the caller; the coordinator does this by allowing one active cycle.
#[derive(Default)]
pub struct StateController {
    inner: Mutex<ControllerInner>,
}

#[derive(Default)]
struct ControllerInner {
    current: Option<LifecycleState>,
    handler: Option<Handler>,
    delivered: u64,
}

impl StateController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the observer. Latest registration wins.
    pub fn observe<F>(&self, handler: F)
    where
        F: Fn(LifecycleState) + Send + Sync + 'static,
    {
        self.inner.lock().handler = Some(Arc::new(handler));
    }

    /// Replace the observer with one that forwards every state into a channel.
    ///
    /// Lets a driver consume states on its own task (the UI loop) instead of
    /// the task that completed the cycle.
    pub fn observe_channel(&self) -> mpsc::UnboundedReceiver<LifecycleState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observe(move |state| {
            if tx.send(state).is_err() {
                tracing::trace!(%state, "State observer channel closed");
            }
        });
        rx
    }

    pub fn clear_observer(&self) {
        self.inner.lock().handler = None;
    }

    pub fn set_state(&self, state: LifecycleState) {
        let handler = {
            let mut inner = self.inner.lock();
            if !LifecycleState::permits(inner.current, state) {
                tracing::warn!(
                    previous = ?inner.current,
                    next = %state,
                    "Unexpected lifecycle transition"
                );
            }
            inner.current = Some(state);
            inner.delivered += 1;
            inner.handler.clone()
        };

        tracing::debug!(%state, "Lifecycle state changed");

        if let Some(handler) = handler {
            handler(state);
        }
    }

    /// The last state set, or `None` before the first cycle.
    pub fn current(&self) -> Option<LifecycleState> {
        self.inner.lock().current
    }

    /// Number of states delivered since creation.
    pub fn delivered(&self) -> u64 {
        self.inner.lock().delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_state() {
        let controller = StateController::new();
        assert_eq!(controller.current(), None);
        assert_eq!(controller.delivered(), 0);
    }

    #[test]
    fn set_state_notifies_observer_once() {
        let controller = StateController::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.observe(move |state| sink.lock().push(state));

        controller.set_state(LifecycleState::Loading);
        controller.set_state(LifecycleState::Ready);

        assert_eq!(
            *seen.lock(),
            vec![LifecycleState::Loading, LifecycleState::Ready]
        );
        assert_eq!(controller.current(), Some(LifecycleState::Ready));
    }

    #[test]
    fn latest_observer_wins() {
        let controller = StateController::new();
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&first);
        controller.observe(move |_| *sink.lock() += 1);
        let sink = Arc::clone(&second);
        controller.observe(move |_| *sink.lock() += 1);

        controller.set_state(LifecycleState::Loading);

        assert_eq!(*first.lock(), 0);
        assert_eq!(*second.lock(), 1);
    }

    #[test]
    fn observer_can_read_current_state() {
        let controller = Arc::new(StateController::new());
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let reader = Arc::clone(&controller);
        controller.observe(move |_| *sink.lock() = reader.current());

        controller.set_state(LifecycleState::Error { code: 7 });

        assert_eq!(*seen.lock(), Some(LifecycleState::Error { code: 7 }));
    }

    #[test]
    fn cleared_observer_is_not_called() {
        let controller = StateController::new();
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        controller.observe(move |_| *sink.lock() += 1);
        controller.clear_observer();

        controller.set_state(LifecycleState::Ready);

        assert_eq!(*count.lock(), 0);
        assert_eq!(controller.delivered(), 1);
    }

    #[tokio::test]
    async fn channel_observer_receives_states() {
        let controller = StateController::new();
        let mut rx = controller.observe_channel();

        controller.set_state(LifecycleState::Loading);
        controller.set_state(LifecycleState::Ready);

        assert_eq!(rx.recv().await, Some(LifecycleState::Loading));
        assert_eq!(rx.recv().await, Some(LifecycleState::Ready));
    }
}
