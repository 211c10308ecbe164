//! WebSocket components container.
//!
//! [`WebSocketComponents`] owns one instance of each shared resource and
//! ties their lifecycle to its own.
//!
//! # Attachment Order
//!
//! | # | Collaborator |
//! |---|--------------|
//! | 1 | Inflater pool |
//! | 2 | Deflater pool |
//! | 3 | Buffer pool |
//! | 4 | Extension registry |
//! | 5 | Object factory |
//! | 6 | Executor |
//!
//! Start follows this order and stop reverses it, so the executor stops
//! first and no new work is accepted while the pools are torn down.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::compression::{DeflaterPool, InflaterPool};
use crate::error::Result;
use crate::executor::Executor;
use crate::extension::ExtensionRegistry;
use crate::factory::ObjectFactory;
use crate::io::BufferPool;
use crate::lifecycle::{BeanMode, Container, LifeCycle, LifeCycleListener, State};

use super::builder::ComponentsBuilder;

// ============================================================================
// Constants
// ============================================================================

/// Container name used in logs and dumps.
const CONTAINER_NAME: &str = "WebSocketComponents";

// ============================================================================
// Types
// ============================================================================

/// Resolved collaborators handed over by the builder.
pub(crate) struct Collaborators {
    pub extension_registry: Arc<dyn ExtensionRegistry>,
    pub object_factory: Arc<dyn ObjectFactory>,
    pub buffer_pool: Arc<dyn BufferPool>,
    pub inflater_pool: Arc<dyn InflaterPool>,
    pub deflater_pool: Arc<dyn DeflaterPool>,
    pub executor: Arc<dyn Executor>,
}

// ============================================================================
// WebSocketComponents
// ============================================================================

/// Shared resources of a WebSocket implementation.
///
/// The set of collaborators is fixed at construction; accessors return the
/// same reference for the lifetime of the instance and never lock.
///
/// # Examples
///
/// ```
/// use websocket_components::{State, WebSocketComponents};
///
/// # fn example() -> websocket_components::Result<()> {
/// let components = WebSocketComponents::new()?;
///
/// components.start()?;
/// assert_eq!(components.state(), State::Started);
///
/// components.stop()?;
/// assert_eq!(components.state(), State::Stopped);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct WebSocketComponents {
    extension_registry: Arc<dyn ExtensionRegistry>,
    object_factory: Arc<dyn ObjectFactory>,
    buffer_pool: Arc<dyn BufferPool>,
    inflater_pool: Arc<dyn InflaterPool>,
    deflater_pool: Arc<dyn DeflaterPool>,
    executor: Arc<dyn Executor>,

    /// Drives the collaborators' lifecycle.
    container: Container,
}

// ============================================================================
// WebSocketComponents - Display
// ============================================================================

impl fmt::Debug for WebSocketComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketComponents")
            .field("state", &self.state())
            .field("extension_registry", &self.extension_registry.name())
            .field("object_factory", &self.object_factory.name())
            .field("buffer_pool", &self.buffer_pool.name())
            .field("inflater_pool", &self.inflater_pool.name())
            .field("deflater_pool", &self.deflater_pool.name())
            .field("executor", &self.executor.name())
            .finish()
    }
}

// ============================================================================
// WebSocketComponents - Constructors
// ============================================================================

impl WebSocketComponents {
    /// Creates components with a default for every collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`](crate::Error::Initialization) if a
    /// default cannot be built.
    pub fn new() -> Result<Self> {
        ComponentsBuilder::new().build()
    }

    /// Creates a builder for supplying pre-built collaborators.
    #[inline]
    #[must_use]
    pub fn builder() -> ComponentsBuilder {
        ComponentsBuilder::new()
    }

    /// Attaches the collaborators to a fresh container in the fixed order.
    pub(crate) fn assemble(collaborators: Collaborators) -> Result<Self> {
        let Collaborators {
            extension_registry,
            object_factory,
            buffer_pool,
            inflater_pool,
            deflater_pool,
            executor,
        } = collaborators;

        let container = Container::new(CONTAINER_NAME);

        let beans: [Arc<dyn LifeCycle>; 6] = [
            inflater_pool.clone(),
            deflater_pool.clone(),
            buffer_pool.clone(),
            extension_registry.clone(),
            object_factory.clone(),
            executor.clone(),
        ];
        for bean in beans {
            container.add_bean(bean, BeanMode::Auto)?;
        }

        debug!(beans = container.bean_count(), "WebSocketComponents assembled");

        Ok(Self {
            extension_registry,
            object_factory,
            buffer_pool,
            inflater_pool,
            deflater_pool,
            executor,
            container,
        })
    }
}

// ============================================================================
// WebSocketComponents - Accessors
// ============================================================================

impl WebSocketComponents {
    /// Returns the extension registry.
    #[inline]
    #[must_use]
    pub fn extension_registry(&self) -> &Arc<dyn ExtensionRegistry> {
        &self.extension_registry
    }

    /// Returns the object factory.
    #[inline]
    #[must_use]
    pub fn object_factory(&self) -> &Arc<dyn ObjectFactory> {
        &self.object_factory
    }

    /// Returns the buffer pool.
    #[inline]
    #[must_use]
    pub fn buffer_pool(&self) -> &Arc<dyn BufferPool> {
        &self.buffer_pool
    }

    /// Returns the inflater pool.
    #[inline]
    #[must_use]
    pub fn inflater_pool(&self) -> &Arc<dyn InflaterPool> {
        &self.inflater_pool
    }

    /// Returns the deflater pool.
    #[inline]
    #[must_use]
    pub fn deflater_pool(&self) -> &Arc<dyn DeflaterPool> {
        &self.deflater_pool
    }

    /// Returns the executor.
    #[inline]
    #[must_use]
    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }
}

// ============================================================================
// WebSocketComponents - Lifecycle
// ============================================================================

impl WebSocketComponents {
    /// Starts every collaborator in attachment order.
    ///
    /// A no-op when already started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`](crate::Error::Lifecycle) if a
    /// collaborator fails to start; those already started are stopped in
    /// reverse order and the state becomes [`State::Failed`].
    pub fn start(&self) -> Result<()> {
        self.container.start()
    }

    /// Stops every collaborator in reverse attachment order.
    ///
    /// A no-op before the first start. In-flight executor work is not
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`](crate::Error::Lifecycle) if a
    /// collaborator fails to stop.
    pub fn stop(&self) -> Result<()> {
        self.container.stop()
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.container.state()
    }

    /// Returns `true` while starting or started.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.container.state().is_running()
    }

    /// Registers a lifecycle listener.
    pub fn add_listener(&self, listener: Arc<dyn LifeCycleListener>) {
        self.container.add_listener(listener);
    }

    /// Removes a lifecycle listener; returns `true` if it was registered.
    pub fn remove_listener(&self, listener: &Arc<dyn LifeCycleListener>) -> bool {
        self.container.remove_listener(listener)
    }

    /// Renders the container and its collaborators as a tree.
    #[must_use]
    pub fn dump(&self) -> String {
        self.container.dump()
    }
}

impl LifeCycle for WebSocketComponents {
    fn name(&self) -> &str {
        CONTAINER_NAME
    }

    fn start(&self) -> Result<()> {
        WebSocketComponents::start(self)
    }

    fn stop(&self) -> Result<()> {
        WebSocketComponents::stop(self)
    }

    fn is_running(&self) -> bool {
        WebSocketComponents::is_running(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
