//! Ordered bean container with start/stop propagation.
//!
//! A [`Container`] keeps its beans in attachment order. Starting the
//! container starts every managed bean in that order; stopping it stops
//! them in reverse.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use websocket_components::lifecycle::{BeanMode, Container, State};
//! use websocket_components::io::MappedBufferPool;
//!
//! # fn example() -> websocket_components::Result<()> {
//! let container = Container::new("server");
//! container.add_bean(Arc::new(MappedBufferPool::new()), BeanMode::Auto)?;
//!
//! container.start()?;
//! assert_eq!(container.state(), State::Started);
//!
//! container.stop()?;
//! assert_eq!(container.state(), State::Stopped);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::{LifeCycle, LifeCycleListener, State};

// ============================================================================
// BeanMode
// ============================================================================

/// How a bean's lifecycle relates to its container's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeanMode {
    /// Started and stopped with the container.
    Managed,
    /// Held by the container but never started or stopped by it.
    Unmanaged,
    /// Managed unless the bean is already running when attached.
    #[default]
    Auto,
}

// ============================================================================
// Bean
// ============================================================================

/// An attached component and its resolved management mode.
#[derive(Clone)]
struct Bean {
    component: Arc<dyn LifeCycle>,
    managed: bool,
}

// ============================================================================
// Container
// ============================================================================

/// Drives the lifecycle of an ordered set of beans.
///
/// Transitions are serialized by an internal lock, so concurrent calls to
/// [`start`](Self::start) run exactly one start sequence. [`state`](Self::state)
/// never blocks.
pub struct Container {
    /// Container name for logs and dumps.
    name: String,

    /// Attached beans in attachment order.
    beans: RwLock<Vec<Bean>>,

    /// Registered transition listeners.
    listeners: RwLock<Vec<Arc<dyn LifeCycleListener>>>,

    /// Current [`State`] encoded as `u8`.
    state: AtomicU8,

    /// Serializes start/stop/attach.
    transition: Mutex<()>,
}

// ============================================================================
// Container - Display
// ============================================================================

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("bean_count", &self.bean_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Container - Constructor
// ============================================================================

impl Container {
    /// Creates an empty, unstarted container.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            beans: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            state: AtomicU8::new(State::Unstarted as u8),
            transition: Mutex::new(()),
        }
    }
}

// ============================================================================
// Container - Beans
// ============================================================================

impl Container {
    /// Attaches a bean after all existing beans.
    ///
    /// Returns `Ok(false)` if the same bean is already attached. A managed
    /// bean attached to a started container is started immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] if the container is started and the
    /// newly attached managed bean fails to start.
    pub fn add_bean(&self, component: Arc<dyn LifeCycle>, mode: BeanMode) -> Result<bool> {
        let _guard = self.transition.lock();

        if self
            .beans
            .read()
            .iter()
            .any(|bean| Arc::ptr_eq(&bean.component, &component))
        {
            debug!(container = %self.name, bean = component.name(), "Bean already attached");
            return Ok(false);
        }

        let managed = match mode {
            BeanMode::Managed => true,
            BeanMode::Unmanaged => false,
            BeanMode::Auto => !component.is_running(),
        };

        if managed && self.state() == State::Started && !component.is_running() {
            component
                .start()
                .map_err(|cause| Error::lifecycle(component.name(), cause))?;
        }

        debug!(
            container = %self.name,
            bean = component.name(),
            managed,
            "Bean attached"
        );

        self.beans.write().push(Bean { component, managed });
        Ok(true)
    }

    /// Returns the attached beans in attachment order.
    #[must_use]
    pub fn beans(&self) -> Vec<Arc<dyn LifeCycle>> {
        self.beans
            .read()
            .iter()
            .map(|bean| Arc::clone(&bean.component))
            .collect()
    }

    /// Returns the number of attached beans.
    #[inline]
    #[must_use]
    pub fn bean_count(&self) -> usize {
        self.beans.read().len()
    }

    /// Returns `true` if `component` is attached and managed.
    #[must_use]
    pub fn is_managed(&self, component: &Arc<dyn LifeCycle>) -> bool {
        self.beans
            .read()
            .iter()
            .any(|bean| bean.managed && Arc::ptr_eq(&bean.component, component))
    }

    /// Snapshot of the managed beans in attachment order.
    fn managed_beans(&self) -> Vec<Arc<dyn LifeCycle>> {
        self.beans
            .read()
            .iter()
            .filter(|bean| bean.managed)
            .map(|bean| Arc::clone(&bean.component))
            .collect()
    }
}

// ============================================================================
// Container - Listeners
// ============================================================================

impl Container {
    /// Registers a transition listener.
    pub fn add_listener(&self, listener: Arc<dyn LifeCycleListener>) {
        self.listeners.write().push(listener);
    }

    /// Removes a previously registered listener.
    ///
    /// Returns `true` if the listener was registered.
    pub fn remove_listener(&self, listener: &Arc<dyn LifeCycleListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    fn notify(&self, hook: impl Fn(&dyn LifeCycleListener)) {
        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            hook(listener.as_ref());
        }
    }
}

// ============================================================================
// Container - Lifecycle
// ============================================================================

impl Container {
    /// Returns the container name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn set_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Starts every managed bean in attachment order.
    ///
    /// A no-op when already started. If a bean fails, the beans started by
    /// this call are stopped in reverse order and the container moves to
    /// [`State::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] wrapping the failing bean's error.
    pub fn start(&self) -> Result<()> {
        let _guard = self.transition.lock();

        if self.state().is_running() {
            debug!(container = %self.name, "Container already started");
            return Ok(());
        }

        self.set_state(State::Starting);
        let _unwind = FailOnUnwind(self);
        self.notify(|l| l.on_starting(&self.name));

        let beans = self.managed_beans();
        let mut started: Vec<Arc<dyn LifeCycle>> = Vec::with_capacity(beans.len());

        for bean in beans {
            if bean.is_running() {
                continue;
            }

            debug!(container = %self.name, bean = bean.name(), "Starting bean");

            if let Err(cause) = bean.start() {
                let err = Error::lifecycle(bean.name(), cause);
                warn!(container = %self.name, error = %err, "Bean failed to start");

                Self::stop_all(&self.name, started.iter().rev());
                self.fail(State::Starting, &err);
                return Err(err);
            }

            started.push(bean);
        }

        self.set_state(State::Started);
        self.notify(|l| l.on_started(&self.name));
        info!(container = %self.name, beans = started.len(), "Container started");

        Ok(())
    }

    /// Stops every running managed bean in reverse attachment order.
    ///
    /// A no-op before the first start or when already stopped. Every bean is
    /// attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] wrapping the first bean failure; the
    /// container is then [`State::Failed`].
    pub fn stop(&self) -> Result<()> {
        let _guard = self.transition.lock();

        match self.state() {
            State::Unstarted | State::Stopped | State::Stopping => {
                debug!(container = %self.name, state = %self.state(), "Stop ignored");
                return Ok(());
            }
            State::Starting | State::Started | State::Failed => {}
        }

        self.set_state(State::Stopping);
        let _unwind = FailOnUnwind(self);
        self.notify(|l| l.on_stopping(&self.name));

        let beans = self.managed_beans();
        let running: Vec<_> = beans.iter().rev().filter(|b| b.is_running()).collect();

        if let Some(err) = Self::stop_all(&self.name, running.into_iter()) {
            self.fail(State::Stopping, &err);
            return Err(err);
        }

        self.set_state(State::Stopped);
        self.notify(|l| l.on_stopped(&self.name));
        info!(container = %self.name, "Container stopped");

        Ok(())
    }

    /// Stops each bean in iteration order, returning the first failure.
    fn stop_all<'a>(
        container: &str,
        beans: impl Iterator<Item = &'a Arc<dyn LifeCycle>>,
    ) -> Option<Error> {
        let mut first = None;

        for bean in beans {
            debug!(container, bean = bean.name(), "Stopping bean");

            if let Err(cause) = bean.stop() {
                let err = Error::lifecycle(bean.name(), cause);
                warn!(container, error = %err, "Bean failed to stop");
                first.get_or_insert(err);
            }
        }

        first
    }

    fn fail(&self, during: State, err: &Error) {
        self.set_state(State::Failed);
        self.notify(|l| l.on_failure(&self.name, during, err));
    }
}

/// Moves the container to [`State::Failed`] if a transition unwinds.
struct FailOnUnwind<'a>(&'a Container);

impl Drop for FailOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!(container = %self.0.name, "Transition panicked");
            self.0.set_state(State::Failed);
        }
    }
}

// ============================================================================
// Container - Dump
// ============================================================================

impl Container {
    /// Renders the container and its beans as a tree.
    ///
    /// Managed beans are marked `+=`, unmanaged beans `+~`.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} [{}]", self.name, self.state());

        for bean in self.beans.read().iter() {
            let marker = if bean.managed { "+=" } else { "+~" };
            let status = if bean.component.is_running() {
                "running"
            } else {
                "stopped"
            };
            let _ = writeln!(out, " {marker} {} [{status}]", bean.component.name());
        }

        out
    }
}

// ============================================================================
// Container - LifeCycle
// ============================================================================

impl LifeCycle for Container {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        Container::start(self)
    }

    fn stop(&self) -> Result<()> {
        Container::stop(self)
    }

    fn is_running(&self) -> bool {
        self.state().is_running()
    }
}

// ============================================================================
// Tests
// ============================================================================
