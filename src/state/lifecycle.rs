//! Lifecycle states published to screen observers.

use std::fmt;

use crate::service::ErrorKind;

/// The state of a screen's data, as seen by its observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// A fetch cycle is in flight.
    Loading,
    /// The last cycle succeeded and the view data is complete.
    Ready,
    /// The last cycle had at least one failure.
    Error { code: i32 },
}

impl LifecycleState {
    /// True for states that end a cycle.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LifecycleState::Loading)
    }

    pub fn error_code(&self) -> Option<i32> {
        match self {
            LifecycleState::Error { code } => Some(*code),
            _ => None,
        }
    }

    /// Category of the failure code carried by an `Error` state.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_code().map(ErrorKind::from_code)
    }

    /// Whether `next` may follow `previous`.
    ///
    /// Announced cycles go `Loading` then a terminal state. Silent cycles
    /// (appending a page, reloading after a delete) skip `Loading`, so a
    /// terminal state may also follow `Ready` or `Error`. The first state
    /// must be `Loading`, and `Loading` never follows itself.
    pub fn permits(previous: Option<LifecycleState>, next: LifecycleState) -> bool {
        use LifecycleState::*;

        match (previous, next) {
            (None, Loading) => true,
            (None, _) => false,
            (Some(Loading), Loading) => false,
            (Some(Loading), Ready | Error { .. }) => true,
            (Some(Ready | Error { .. }), Loading) => true,
            // Silent cycle after an earlier terminal state.
            (Some(Ready | Error { .. }), Ready | Error { .. }) => true,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Loading => write!(f, "loading"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Error { code } => write!(f, "error({})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!LifecycleState::Loading.is_terminal());
        assert!(LifecycleState::Ready.is_terminal());
        assert!(LifecycleState::Error { code: 1 }.is_terminal());
    }

    #[test]
    fn error_kind_follows_code() {
        assert_eq!(
            LifecycleState::Error { code: -1009 }.error_kind(),
            Some(ErrorKind::Transport)
        );
        assert_eq!(LifecycleState::Ready.error_kind(), None);
    }

    #[test]
    fn transition_table() {
        use LifecycleState::*;

        assert!(LifecycleState::permits(None, Loading));
        assert!(LifecycleState::permits(Some(Loading), Ready));
        assert!(LifecycleState::permits(Some(Loading), Error { code: 500 }));
        assert!(LifecycleState::permits(Some(Ready), Loading));
        assert!(LifecycleState::permits(Some(Error { code: 1 }), Loading));
        assert!(!LifecycleState::permits(Some(Loading), Loading));
    }

    #[test]
    fn first_state_must_be_loading() {
        assert!(!LifecycleState::permits(None, LifecycleState::Ready));
        assert!(!LifecycleState::permits(
            None,
            LifecycleState::Error { code: 500 }
        ));
    }

    #[test]
    fn silent_cycles_follow_terminal_states() {
        use LifecycleState::*;

        assert!(LifecycleState::permits(Some(Ready), Ready));
        assert!(LifecycleState::permits(Some(Ready), Error { code: 500 }));
        assert!(LifecycleState::permits(Some(Error { code: 500 }), Ready));
        assert!(LifecycleState::permits(
            Some(Error { code: 500 }),
            Error { code: 404 }
        ));
    }

    #[test]
    fn display() {
        assert_eq!(LifecycleState::Loading.to_string(), "loading");
        assert_eq!(LifecycleState::Error { code: -1001 }.to_string(), "error(-1001)");
    }
}
