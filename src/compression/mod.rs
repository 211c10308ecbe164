//! Pools of reusable compression contexts.
//!
//! Creating a deflate context allocates its window and dictionary, so
//! WebSocket connections using `permessage-deflate` borrow contexts from a
//! shared pool instead.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`InflaterPool`] | Capability lending [`Decompress`] contexts |
//! | [`DeflaterPool`] | Capability lending [`Compress`] contexts |
//! | [`CompressionPool`] | Default bounded pool for either context type |

// ============================================================================
// Submodules
// ============================================================================

/// Generic bounded pool and the inflater/deflater constructors.
pub mod pool;

// ============================================================================
// Imports
// ============================================================================

use flate2::{Compress, Decompress};

use crate::lifecycle::LifeCycle;

// ============================================================================
// Re-exports
// ============================================================================

pub use pool::{CompressionPool, DEFAULT_CAPACITY, DEFAULT_COMPRESSION};

// ============================================================================
// Capabilities
// ============================================================================

/// Lends decompression contexts.
pub trait InflaterPool: LifeCycle {
    /// Returns a ready-to-use decompression context.
    fn acquire(&self) -> Decompress;

    /// Returns a context to the pool; it is reset before reuse.
    fn release(&self, inflater: Decompress);
}

/// Lends compression contexts.
pub trait DeflaterPool: LifeCycle {
    /// Returns a ready-to-use compression context.
    fn acquire(&self) -> Compress;

    /// Returns a context to the pool; it is reset before reuse.
    fn release(&self, deflater: Compress);
}
