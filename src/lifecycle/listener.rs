//! Listener hooks for container lifecycle transitions.

use crate::error::Error;

use super::State;

/// Observer of a [`Container`](super::Container)'s transitions.
///
/// All hooks default to no-ops. Hooks run on the thread performing the
/// transition, while the transition lock is held.
pub trait LifeCycleListener: Send + Sync {
    /// Called before any bean is started.
    fn on_starting(&self, _container: &str) {}

    /// Called after every managed bean started.
    fn on_started(&self, _container: &str) {}

    /// Called when a start or stop sequence fails.
    ///
    /// `state` is the state the container was in when the failure happened.
    fn on_failure(&self, _container: &str, _state: State, _error: &Error) {}

    /// Called before any bean is stopped.
    fn on_stopping(&self, _container: &str) {}

    /// Called after every managed bean stopped.
    fn on_stopped(&self, _container: &str) {}
}
