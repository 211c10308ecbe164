//! WebSocket components container.
//!
//! This module provides the composition root that owns the shared
//! resources of a WebSocket implementation.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`WebSocketComponents`] | Owns the six collaborators and drives their lifecycle |
//! | [`ComponentsBuilder`] | Supplies pre-built collaborators; absent slots get defaults |
//! | [`ComponentsOptions`] | Tuning for the default collaborators |
//!
//! # Example
//!
//! ```
//! use websocket_components::{BufferPool, Result, WebSocketComponents};
//!
//! # fn example() -> Result<()> {
//! let components = WebSocketComponents::new()?;
//! components.start()?;
//!
//! let buffer = components.buffer_pool().acquire(4096);
//! components.buffer_pool().release(buffer);
//!
//! components.stop()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Builder accepting optional pre-built collaborators.
pub mod builder;

/// Core container implementation.
pub mod core;

/// Options for default collaborators.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ComponentsBuilder;
pub use core::WebSocketComponents;
pub use options::ComponentsOptions;
