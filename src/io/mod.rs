//! Byte buffer pooling.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BufferPool`] | Acquire/release capability |
//! | [`MappedBufferPool`] | Default pool with buffers bucketed by capacity |

// ============================================================================
// Submodules
// ============================================================================

/// Capacity-bucketed buffer pool.
pub mod buffer_pool;

// ============================================================================
// Re-exports
// ============================================================================

pub use buffer_pool::{BufferPool, DEFAULT_FACTOR, MappedBufferPool};
