//! Builder pattern for components construction.
//!
//! Each collaborator slot is optional; [`ComponentsBuilder::build`] fills
//! every empty slot with a freshly constructed default.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use websocket_components::{LifeCycle, WebSocketComponents};
//! use websocket_components::io::MappedBufferPool;
//!
//! # fn example() -> websocket_components::Result<()> {
//! let pool = Arc::new(MappedBufferPool::with_limits(4096, Some(64), None));
//!
//! let components = WebSocketComponents::builder()
//!     .buffer_pool(pool)
//!     .build()?;
//!
//! assert_eq!(components.buffer_pool().name(), "MappedBufferPool");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::compression::{CompressionPool, DeflaterPool, InflaterPool};
use crate::error::{Error, Result};
use crate::executor::{Executor, ThreadPoolExecutor};
use crate::extension::{ExtensionRegistry, WebSocketExtensionRegistry};
use crate::factory::{DecoratedObjectFactory, ObjectFactory};
use crate::io::{BufferPool, MappedBufferPool};

use super::core::{Collaborators, WebSocketComponents};
use super::options::ComponentsOptions;

// ============================================================================
// ComponentsBuilder
// ============================================================================

/// Builder for [`WebSocketComponents`].
///
/// Use [`WebSocketComponents::builder()`] to create a new builder.
#[derive(Clone, Default)]
pub struct ComponentsBuilder {
    /// Extension registry slot.
    extension_registry: Option<Arc<dyn ExtensionRegistry>>,
    /// Object factory slot.
    object_factory: Option<Arc<dyn ObjectFactory>>,
    /// Buffer pool slot.
    buffer_pool: Option<Arc<dyn BufferPool>>,
    /// Inflater pool slot.
    inflater_pool: Option<Arc<dyn InflaterPool>>,
    /// Deflater pool slot.
    deflater_pool: Option<Arc<dyn DeflaterPool>>,
    /// Executor slot.
    executor: Option<Arc<dyn Executor>>,
    /// Tuning for defaults.
    options: ComponentsOptions,
}

impl fmt::Debug for ComponentsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentsBuilder")
            .field("extension_registry", &self.extension_registry.is_some())
            .field("object_factory", &self.object_factory.is_some())
            .field("buffer_pool", &self.buffer_pool.is_some())
            .field("inflater_pool", &self.inflater_pool.is_some())
            .field("deflater_pool", &self.deflater_pool.is_some())
            .field("executor", &self.executor.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// ComponentsBuilder Implementation
// ============================================================================

impl ComponentsBuilder {
    /// Creates a builder with every slot empty.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the extension registry.
    #[inline]
    #[must_use]
    pub fn extension_registry(mut self, registry: Arc<dyn ExtensionRegistry>) -> Self {
        self.extension_registry = Some(registry);
        self
    }

    /// Supplies the object factory.
    #[inline]
    #[must_use]
    pub fn object_factory(mut self, factory: Arc<dyn ObjectFactory>) -> Self {
        self.object_factory = Some(factory);
        self
    }

    /// Supplies the buffer pool.
    #[inline]
    #[must_use]
    pub fn buffer_pool(mut self, pool: Arc<dyn BufferPool>) -> Self {
        self.buffer_pool = Some(pool);
        self
    }

    /// Supplies the inflater pool.
    #[inline]
    #[must_use]
    pub fn inflater_pool(mut self, pool: Arc<dyn InflaterPool>) -> Self {
        self.inflater_pool = Some(pool);
        self
    }

    /// Supplies the deflater pool.
    #[inline]
    #[must_use]
    pub fn deflater_pool(mut self, pool: Arc<dyn DeflaterPool>) -> Self {
        self.deflater_pool = Some(pool);
        self
    }

    /// Supplies the executor.
    #[inline]
    #[must_use]
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the options used for default collaborators.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ComponentsOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the components, constructing defaults for empty slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`](crate::Error::Initialization) if a
    /// default collaborator cannot be built from the options. Options for
    /// supplied slots are not checked.
    pub fn build(self) -> Result<WebSocketComponents> {
        let collaborators = Collaborators {
            extension_registry: self.resolve_extension_registry(),
            object_factory: self.resolve_object_factory(),
            buffer_pool: self.resolve_buffer_pool()?,
            inflater_pool: self.resolve_inflater_pool(),
            deflater_pool: self.resolve_deflater_pool()?,
            executor: self.resolve_executor()?,
        };

        WebSocketComponents::assemble(collaborators)
    }
}

// ============================================================================
// Defaults
// ============================================================================

impl ComponentsBuilder {
    fn resolve_extension_registry(&self) -> Arc<dyn ExtensionRegistry> {
        if let Some(registry) = &self.extension_registry {
            return Arc::clone(registry);
        }

        debug!("Using default extension registry");
        Arc::new(WebSocketExtensionRegistry::new())
    }

    fn resolve_object_factory(&self) -> Arc<dyn ObjectFactory> {
        if let Some(factory) = &self.object_factory {
            return Arc::clone(factory);
        }

        debug!("Using default object factory");
        Arc::new(DecoratedObjectFactory::new())
    }

    fn resolve_buffer_pool(&self) -> Result<Arc<dyn BufferPool>> {
        if let Some(pool) = &self.buffer_pool {
            return Ok(Arc::clone(pool));
        }

        if self.options.buffer_factor == 0 {
            return Err(Error::initialization(
                "BufferPool",
                "buffer_factor must be greater than zero",
            ));
        }

        debug!(factor = self.options.buffer_factor, "Using default buffer pool");
        Ok(Arc::new(MappedBufferPool::with_limits(
            self.options.buffer_factor,
            self.options.max_bucket_size,
            self.options.max_buffer_memory,
        )))
    }

    fn resolve_inflater_pool(&self) -> Arc<dyn InflaterPool> {
        if let Some(pool) = &self.inflater_pool {
            return Arc::clone(pool);
        }

        debug!(capacity = self.options.inflater_capacity, "Using default inflater pool");
        Arc::new(CompressionPool::inflaters(
            self.options.inflater_capacity,
            self.options.nowrap,
        ))
    }

    fn resolve_deflater_pool(&self) -> Result<Arc<dyn DeflaterPool>> {
        if let Some(pool) = &self.deflater_pool {
            return Ok(Arc::clone(pool));
        }

        debug!(
            capacity = self.options.deflater_capacity,
            level = self.options.compression_level,
            "Using default deflater pool"
        );
        Ok(Arc::new(CompressionPool::deflaters(
            self.options.deflater_capacity,
            self.options.compression_level,
            self.options.nowrap,
        )?))
    }

    fn resolve_executor(&self) -> Result<Arc<dyn Executor>> {
        if let Some(executor) = &self.executor {
            return Ok(Arc::clone(executor));
        }

        debug!("Using default thread pool executor");
        Ok(Arc::new(ThreadPoolExecutor::with_config(
            self.options.thread_pool.clone(),
        )?))
    }
}

// ============================================================================
// Tests
// ============================================================================
