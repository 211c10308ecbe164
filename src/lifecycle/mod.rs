//! Lifecycle primitives shared by the container and its collaborators.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LifeCycle`] | Start/stop capability implemented by every collaborator |
//! | [`State`] | Container lifecycle state |
//! | [`LifeCycleListener`] | Hooks notified on container transitions |
//! | [`Container`] | Ordered set of beans driven by one lifecycle |
//!
//! # State Machine
//!
//! ```text
//! Unstarted ──start──▶ Starting ──ok──▶ Started ──stop──▶ Stopping ──▶ Stopped
//!                         │                                   │           │
//!                         └──err──▶ Failed ◀──────err─────────┘           │
//!                                     ▲                                   │
//!                                     └──────────── start (err) ──────────┘
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Ordered bean container with start/stop propagation.
pub mod container;

/// Listener hooks for lifecycle transitions.
pub mod listener;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use container::{BeanMode, Container};
pub use listener::LifeCycleListener;

// ============================================================================
// LifeCycle
// ============================================================================

/// A component whose start and stop are driven by an owning container.
///
/// Implementations must be idempotent: starting a running component or
/// stopping a stopped one is a no-op.
pub trait LifeCycle: Send + Sync {
    /// Name used in logs, errors and dumps.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Starts the component.
    ///
    /// # Errors
    ///
    /// Returns an error if the component cannot be started.
    fn start(&self) -> Result<()>;

    /// Stops the component.
    ///
    /// # Errors
    ///
    /// Returns an error if the component cannot be stopped cleanly.
    fn stop(&self) -> Result<()>;

    /// Returns `true` while the component is started.
    fn is_running(&self) -> bool;
}

// ============================================================================
// State
// ============================================================================

/// Lifecycle state of a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    /// Created, never started.
    Unstarted = 0,
    /// Start sequence in progress.
    Starting = 1,
    /// All managed beans started.
    Started = 2,
    /// Stop sequence in progress.
    Stopping = 3,
    /// All managed beans stopped.
    Stopped = 4,
    /// A start or stop sequence failed.
    Failed = 5,
}

impl State {
    /// Decodes a state stored as `u8`.
    #[inline]
    #[must_use]
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Unstarted,
            1 => Self::Starting,
            2 => Self::Started,
            3 => Self::Stopping,
            4 => Self::Stopped,
            _ => Self::Failed,
        }
    }

    /// Returns the state's label.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Starting => "starting",
            Self::Started => "started",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for [`State::Starting`] and [`State::Started`].
    #[inline]
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Starting | Self::Started)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_u8_round_trip_covers_all_states() {
        for state in [
            State::Unstarted,
            State::Starting,
            State::Started,
            State::Stopping,
            State::Stopped,
            State::Failed,
        ] {
            assert_eq!(State::from_u8(state as u8), state);
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(State::Started.to_string(), "started");
        assert_eq!(State::Unstarted.to_string(), "unstarted");
    }

    #[test]
    fn test_is_running() {
        assert!(State::Starting.is_running());
        assert!(State::Started.is_running());
        assert!(!State::Stopping.is_running());
        assert!(!State::Failed.is_running());
    }
}
