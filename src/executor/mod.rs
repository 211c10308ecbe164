//! Executors for asynchronous work units.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Executor`] | Capability to submit work |
//! | [`ThreadPoolExecutor`] | Default worker pool backed by a Tokio runtime |
//! | [`ThreadPoolConfig`] | Worker pool sizing and naming |

// ============================================================================
// Submodules
// ============================================================================

/// Tokio-backed worker pool.
pub mod thread_pool;

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::lifecycle::LifeCycle;

// ============================================================================
// Re-exports
// ============================================================================

pub use thread_pool::{ThreadPoolConfig, ThreadPoolExecutor};

// ============================================================================
// Types
// ============================================================================

/// A unit of work submitted to an [`Executor`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

// ============================================================================
// Executor
// ============================================================================

/// Runs submitted work units asynchronously.
pub trait Executor: LifeCycle {
    /// Submits `task` for execution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`](crate::Error::Rejected) if the executor
    /// is not accepting work.
    fn execute(&self, task: Task) -> Result<()>;
}
