//! WebSocket Components - lifecycle-managed shared resources for WebSockets.
//!
//! This library provides the composition root a WebSocket implementation
//! draws its shared resources from, and ties the lifecycle of every
//! resource to the lifecycle of the root.
//!
//! # Architecture
//!
//! [`WebSocketComponents`] owns exactly one of each collaborator:
//!
//! - **Buffer pool**: reusable byte buffers keyed by capacity
//! - **Inflater / deflater pools**: reusable `permessage-deflate` contexts
//! - **Extension registry**: named protocol extensions
//! - **Object factory**: decoration of user endpoints
//! - **Executor**: worker pool for asynchronous work
//!
//! Key design principles:
//!
//! - Absent collaborators are replaced by defaults at construction time
//! - Collaborators are attached in a fixed order; start follows it, stop reverses it
//! - A failed start rolls back whatever it already started
//! - Accessors never lock and always return the same reference
//!
//! # Quick Start
//!
//! ```
//! use websocket_components::{Result, WebSocketComponents};
//! use websocket_components::io::BufferPool;
//!
//! fn main() -> Result<()> {
//!     let components = WebSocketComponents::new()?;
//!     components.start()?;
//!
//!     let buffer = components.buffer_pool().acquire(8192);
//!     assert!(buffer.capacity() >= 8192);
//!     components.buffer_pool().release(buffer);
//!
//!     components.stop()?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`components`] | [`WebSocketComponents`] container and builder |
//! | [`lifecycle`] | [`LifeCycle`] trait, [`State`] machine, [`Container`] |
//! | [`io`] | Byte buffer pooling |
//! | [`compression`] | Inflater and deflater pools |
//! | [`extension`] | Extension registry |
//! | [`factory`] | Endpoint decoration |
//! | [`executor`] | Worker pool |
//! | [`error`] | Error types and [`Result`] alias |

// ============================================================================
// Modules
// ============================================================================

/// Components container, builder and options.
///
/// Use [`WebSocketComponents::builder()`] to supply pre-built collaborators.
pub mod components;

/// Pools of reusable compression contexts.
pub mod compression;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Executors for asynchronous work units.
pub mod executor;

/// WebSocket protocol extension registry.
pub mod extension;

/// Decoration of user-supplied endpoint instances.
pub mod factory;

/// Byte buffer pooling.
pub mod io;

/// Lifecycle primitives and the bean container.
pub mod lifecycle;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Container types
pub use components::{ComponentsBuilder, ComponentsOptions, WebSocketComponents};

// Lifecycle types
pub use lifecycle::{BeanMode, Container, LifeCycle, LifeCycleListener, State};

// Capability traits
pub use compression::{DeflaterPool, InflaterPool};
pub use executor::Executor;
pub use extension::ExtensionRegistry;
pub use factory::ObjectFactory;
pub use io::BufferPool;

// Error types
pub use error::{Error, Result};
