//! Enter/leave counting barrier guarding a cycle's shared payload.

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Counting barrier whose counters and payload share one lock.
///
/// Every `enter` must be matched by exactly one `leave_with`. The payload
/// mutation passed to `leave_with` happens under the same lock that counts
/// the leave, so a waiter released by the last leave always sees every
/// mutation.
pub struct FetchBarrier<T> {
    inner: Mutex<BarrierInner<T>>,
    released: Notify,
}

struct BarrierInner<T> {
    entered: usize,
    left: usize,
    payload: T,
}

impl<T> FetchBarrier<T> {
    pub fn new(payload: T) -> Self {
        Self {
            inner: Mutex::new(BarrierInner {
                entered: 0,
                left: 0,
                payload,
            }),
            released: Notify::new(),
        }
    }

    pub fn enter(&self) {
        self.inner.lock().entered += 1;
    }

    /// Mutate the payload and count one leave, atomically.
    ///
    /// A leave without a matching enter is logged and ignored.
    pub fn leave_with<R>(&self, mutate: impl FnOnce(&mut T) -> R) -> R {
        let (result, released) = {
            let mut inner = self.inner.lock();
            let result = mutate(&mut inner.payload);
            if inner.left < inner.entered {
                inner.left += 1;
            } else {
                tracing::error!(
                    entered = inner.entered,
                    left = inner.left,
                    "Barrier leave without matching enter"
                );
            }
            (result, inner.left == inner.entered)
        };

        if released {
            self.released.notify_waiters();
        }
        result
    }

    /// Access the payload without counting a leave.
    pub fn with_payload<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock().payload)
    }

    /// Number of enters still waiting for their leave.
    pub fn pending(&self) -> usize {
        let inner = self.inner.lock();
        inner.entered - inner.left
    }

    pub fn is_released(&self) -> bool {
        self.pending() == 0
    }

    /// Wait until every enter has been matched by a leave.
    ///
    /// Returns immediately when nothing was entered.
    pub async fn wait(&self) {
        loop {
            // Register interest before checking the counters so a leave that
            // lands between the check and the await still wakes us.
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_released() {
                return;
            }
            notified.await;
        }
    }
}
