//! Tokio-backed worker pool.
//!
//! The runtime is built on [`start`](LifeCycle::start) and shut down on
//! [`stop`](LifeCycle::stop). Tasks run on the runtime's blocking pool, so
//! they may block freely; at most `max_threads` run at once and the rest
//! queue. Stopping does not wait for or cancel tasks already running.
//!
//! # Example
//!
//! ```
//! use std::sync::mpsc;
//! use websocket_components::executor::{Executor, ThreadPoolExecutor};
//! use websocket_components::lifecycle::LifeCycle;
//!
//! # fn example() -> websocket_components::Result<()> {
//! let executor = ThreadPoolExecutor::new()?;
//! executor.start()?;
//!
//! let (tx, rx) = mpsc::channel();
//! executor.execute(Box::new(move || tx.send(21 * 2).unwrap()))?;
//! assert_eq!(rx.recv().unwrap(), 42);
//!
//! executor.stop()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lifecycle::LifeCycle;

use super::{Executor, Task};

// ============================================================================
// Constants
// ============================================================================

/// Default number of async runtime worker threads.
const DEFAULT_WORKER_THREADS: usize = 8;

/// Default cap on concurrently running tasks.
const DEFAULT_MAX_THREADS: usize = 200;

/// Default keep-alive for idle task threads.
const DEFAULT_IDLE_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// ThreadPoolConfig
// ============================================================================

/// Sizing and naming of a [`ThreadPoolExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadPoolConfig {
    /// Thread name; a unique `qtp-…` name is generated when unset.
    pub name: Option<String>,

    /// Async worker threads of the runtime, used by [`ThreadPoolExecutor::handle`].
    ///
    /// Submitted tasks do not run on these threads.
    pub worker_threads: usize,

    /// Maximum blocking-pool threads, and so tasks running at once.
    ///
    /// Task threads are spawned on demand; none are kept warm.
    pub max_threads: usize,

    /// Milliseconds an idle task thread lingers before exiting.
    pub idle_timeout_ms: u64,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            name: None,
            worker_threads: DEFAULT_WORKER_THREADS,
            max_threads: DEFAULT_MAX_THREADS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }
}

impl ThreadPoolConfig {
    /// Sets the thread name.
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the async worker count and the task thread cap.
    #[inline]
    #[must_use]
    pub fn with_threads(mut self, worker_threads: usize, max_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self.max_threads = max_threads;
        self
    }

    /// Sets the idle keep-alive.
    #[inline]
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout_ms = u64::try_from(idle_timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Validates thread counts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] if `worker_threads` or
    /// `max_threads` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::initialization(
                "ThreadPoolExecutor",
                "worker_threads must be at least 1",
            ));
        }
        if self.max_threads == 0 {
            return Err(Error::initialization(
                "ThreadPoolExecutor",
                "max_threads must be at least 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// ThreadPoolExecutor
// ============================================================================

/// General-purpose worker pool.
pub struct ThreadPoolExecutor {
    /// Resolved thread name.
    name: String,

    config: ThreadPoolConfig,

    /// Present while started.
    runtime: RwLock<Option<Runtime>>,
}

impl fmt::Debug for ThreadPoolExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolExecutor")
            .field("name", &self.name)
            .field("worker_threads", &self.config.worker_threads)
            .field("max_threads", &self.config.max_threads)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ThreadPoolExecutor - Constructors
// ============================================================================

impl ThreadPoolExecutor {
    /// Creates an executor with the default configuration.
    ///
    /// # Errors
    ///
    /// Never fails with the default configuration; see [`with_config`](Self::with_config).
    pub fn new() -> Result<Self> {
        Self::with_config(ThreadPoolConfig::default())
    }

    /// Creates an executor with `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] if the config is invalid.
    pub fn with_config(config: ThreadPoolConfig) -> Result<Self> {
        config.validate()?;

        let name = config.name.clone().unwrap_or_else(|| {
            let id = Uuid::new_v4().simple().to_string();
            format!("qtp-{}", &id[..8])
        });

        Ok(Self {
            name,
            config,
            runtime: RwLock::new(None),
        })
    }
}

// ============================================================================
// ThreadPoolExecutor - Accessors
// ============================================================================

impl ThreadPoolExecutor {
    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ThreadPoolConfig {
        &self.config
    }

    /// Returns a handle for spawning async work while started.
    #[must_use]
    pub fn handle(&self) -> Option<Handle> {
        self.runtime.read().as_ref().map(|rt| rt.handle().clone())
    }

    fn build_runtime(&self) -> Result<Runtime> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .max_blocking_threads(self.config.max_threads)
            .thread_keep_alive(Duration::from_millis(self.config.idle_timeout_ms))
            .thread_name(self.name.clone())
            .enable_all()
            .build()?;
        Ok(runtime)
    }
}

// ============================================================================
// ThreadPoolExecutor - Executor
// ============================================================================

impl Executor for ThreadPoolExecutor {
    fn execute(&self, task: Task) -> Result<()> {
        let runtime = self.runtime.read();
        let runtime = runtime.as_ref().ok_or_else(|| Error::rejected(&self.name))?;

        drop(runtime.spawn_blocking(task));
        Ok(())
    }
}

// ============================================================================
// ThreadPoolExecutor - LifeCycle
// ============================================================================

impl LifeCycle for ThreadPoolExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        let mut runtime = self.runtime.write();
        if runtime.is_some() {
            return Ok(());
        }

        *runtime = Some(self.build_runtime()?);
        info!(
            name = %self.name,
            worker_threads = self.config.worker_threads,
            max_threads = self.config.max_threads,
            "Thread pool started"
        );
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let runtime = self.runtime.write().take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
            debug!(name = %self.name, "Thread pool stopped");
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.runtime.read().is_some()
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(5);

    fn small() -> ThreadPoolConfig {
        ThreadPoolConfig::default().with_threads(1, 4)
    }

    #[test]
    fn test_rejects_before_start() {
        let executor = ThreadPoolExecutor::with_config(small()).unwrap();
        let err = executor.execute(Box::new(|| {})).unwrap_err();
        assert!(matches!(err, Error::Rejected { .. }));
    }

    #[test]
    fn test_runs_tasks_on_named_threads() {
        let executor = ThreadPoolExecutor::with_config(small().with_name("ws-worker")).unwrap();
        executor.start().unwrap();

        let (tx, rx) = mpsc::channel();
        executor
            .execute(Box::new(move || {
                let name = std::thread::current().name().map(str::to_owned);
                tx.send(name).unwrap();
            }))
            .unwrap();

        assert_eq!(rx.recv_timeout(WAIT).unwrap().as_deref(), Some("ws-worker"));
        executor.stop().unwrap();
    }

    #[test]
    fn test_rejects_after_stop_and_restarts() {
        let executor = ThreadPoolExecutor::with_config(small()).unwrap();
        executor.start().unwrap();
        executor.stop().unwrap();

        assert!(!executor.is_running());
        assert!(executor.execute(Box::new(|| {})).is_err());

        executor.start().unwrap();
        let (tx, rx) = mpsc::channel();
        executor.execute(Box::new(move || tx.send(()).unwrap())).unwrap();
        assert!(rx.recv_timeout(WAIT).is_ok());
    }

    #[test]
    fn test_handle_available_only_while_started() {
        let executor = ThreadPoolExecutor::with_config(small()).unwrap();
        assert!(executor.handle().is_none());

        executor.start().unwrap();
        let handle = executor.handle().unwrap();
        let (tx, rx) = mpsc::channel();
        handle.spawn(async move { tx.send(7).unwrap() });

        assert_eq!(rx.recv_timeout(WAIT).unwrap(), 7);
    }

    #[test]
    fn test_generated_name_is_unique() {
        let a = ThreadPoolExecutor::new().unwrap();
        let b = ThreadPoolExecutor::new().unwrap();

        assert!(LifeCycle::name(&a).starts_with("qtp-"));
        assert_ne!(LifeCycle::name(&a), LifeCycle::name(&b));
    }

    #[test]
    fn test_invalid_config_fails_initialization() {
        let no_workers = ThreadPoolExecutor::with_config(ThreadPoolConfig::default().with_threads(0, 4));
        let no_task_threads = ThreadPoolExecutor::with_config(ThreadPoolConfig::default().with_threads(8, 0));

        assert!(no_workers.unwrap_err().is_initialization_error());
        assert!(no_task_threads.unwrap_err().is_initialization_error());
    }

    #[test]
    fn test_task_threads_capped_by_max_threads_not_workers() {
        let executor =
            ThreadPoolExecutor::with_config(ThreadPoolConfig::default().with_threads(4, 1)).unwrap();
        executor.start().unwrap();

        let (tx, rx) = mpsc::channel();
        for _ in 0..3 {
            let tx = tx.clone();
            executor
                .execute(Box::new(move || tx.send(thread::current().id()).unwrap()))
                .unwrap();
        }

        let ids: Vec<_> = (0..3).map(|_| rx.recv_timeout(WAIT).unwrap()).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));

        executor.stop().unwrap();
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ThreadPoolConfig = serde_json::from_str(r#"{"max_threads": 32}"#).unwrap();
        assert_eq!(config.max_threads, 32);
        assert_eq!(config.worker_threads, DEFAULT_WORKER_THREADS);
        assert_eq!(config.name, None);
    }
}
