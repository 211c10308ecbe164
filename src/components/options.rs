//! Options for the default collaborators.
//!
//! Only consulted for slots the caller leaves empty.
//!
//! # Example
//!
//! ```
//! use websocket_components::ComponentsOptions;
//!
//! let options = ComponentsOptions::from_json(r#"{
//!     "compression_level": 1,
//!     "thread_pool": { "name": "ws", "max_threads": 16 }
//! }"#).unwrap();
//!
//! assert_eq!(options.compression_level, 1);
//! assert_eq!(options.buffer_factor, 1024);
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::compression::{DEFAULT_CAPACITY, DEFAULT_COMPRESSION};
use crate::error::{Error, Result};
use crate::executor::ThreadPoolConfig;
use crate::io::DEFAULT_FACTOR;

// ============================================================================
// ComponentsOptions
// ============================================================================

/// Tuning for default collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsOptions {
    /// Bucket width of the default buffer pool.
    pub buffer_factor: usize,

    /// Buffers retained per bucket; unbounded when unset.
    pub max_bucket_size: Option<usize>,

    /// Total bytes retained by the buffer pool; unbounded when unset.
    pub max_buffer_memory: Option<usize>,

    /// Idle inflaters retained.
    pub inflater_capacity: i32,

    /// Idle deflaters retained.
    pub deflater_capacity: i32,

    /// Deflate level, `0..=9` or `-1` for the codec default.
    pub compression_level: i32,

    /// Use raw deflate streams without zlib framing.
    pub nowrap: bool,

    /// Default executor configuration.
    pub thread_pool: ThreadPoolConfig,
}

impl Default for ComponentsOptions {
    fn default() -> Self {
        Self {
            buffer_factor: DEFAULT_FACTOR,
            max_bucket_size: None,
            max_buffer_memory: None,
            inflater_capacity: DEFAULT_CAPACITY,
            deflater_capacity: DEFAULT_CAPACITY,
            compression_level: DEFAULT_COMPRESSION,
            nowrap: true,
            thread_pool: ThreadPoolConfig::default(),
        }
    }
}

impl ComponentsOptions {
    /// Parses options from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the document is malformed
    /// - [`Error::Config`] if a value fails [`validate`](Self::validate)
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Sets the compression level.
    #[inline]
    #[must_use]
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets both compression pool capacities.
    #[inline]
    #[must_use]
    pub fn with_compression_capacity(mut self, capacity: i32) -> Self {
        self.inflater_capacity = capacity;
        self.deflater_capacity = capacity;
        self
    }

    /// Sets the buffer pool bucket width and retention limits.
    #[inline]
    #[must_use]
    pub fn with_buffer_limits(
        mut self,
        factor: usize,
        max_bucket_size: Option<usize>,
        max_memory: Option<usize>,
    ) -> Self {
        self.buffer_factor = factor;
        self.max_bucket_size = max_bucket_size;
        self.max_buffer_memory = max_memory;
        self
    }

    /// Sets the default executor configuration.
    #[inline]
    #[must_use]
    pub fn with_thread_pool(mut self, config: ThreadPoolConfig) -> Self {
        self.thread_pool = config;
        self
    }

    /// Checks values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `buffer_factor` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_factor == 0 {
            return Err(Error::config("buffer_factor must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
