//! Capacity-bucketed byte buffer pool.
//!
//! Buffers are grouped in buckets of `factor` bytes: a request for `size`
//! bytes is served from bucket `ceil(size / factor)`, so every buffer in a
//! bucket has room for any request mapped to it.
//!
//! # Example
//!
//! ```
//! use websocket_components::io::{BufferPool, MappedBufferPool};
//! use websocket_components::lifecycle::LifeCycle;
//!
//! # fn example() -> websocket_components::Result<()> {
//! let pool = MappedBufferPool::new();
//! pool.start()?;
//!
//! let buffer = pool.acquire(1500);
//! assert!(buffer.capacity() >= 1500);
//! pool.release(buffer);
//!
//! assert_eq!(pool.retained_count(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::BytesMut;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::Result;
use crate::lifecycle::LifeCycle;

// ============================================================================
// Constants
// ============================================================================

/// Default bucket width in bytes.
pub const DEFAULT_FACTOR: usize = 1024;

// ============================================================================
// BufferPool
// ============================================================================

/// Pool of reusable byte buffers.
pub trait BufferPool: LifeCycle {
    /// Returns an empty buffer with capacity of at least `size` bytes.
    fn acquire(&self, size: usize) -> BytesMut;

    /// Returns a buffer to the pool.
    ///
    /// The pool may drop the buffer instead of retaining it.
    fn release(&self, buffer: BytesMut);
}

// ============================================================================
// MappedBufferPool
// ============================================================================

/// Buffer pool keyed by capacity bucket.
///
/// Retention is bounded per bucket by `max_bucket_size` and overall by
/// `max_memory`; buffers beyond either bound are dropped on release.
/// Buffers are only retained while the pool is running, and stopping the
/// pool drops every retained buffer.
pub struct MappedBufferPool {
    /// Bucket width in bytes.
    factor: usize,

    /// Maximum buffers kept per bucket.
    max_bucket_size: Option<usize>,

    /// Maximum total retained capacity in bytes.
    max_memory: Option<usize>,

    /// Retained buffers and their byte total.
    retained: Mutex<Retained>,

    running: AtomicBool,
}

/// Bucket map and the capacity it holds, updated together.
#[derive(Default)]
struct Retained {
    buckets: FxHashMap<usize, VecDeque<BytesMut>>,
    bytes: usize,
}

impl fmt::Debug for MappedBufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedBufferPool")
            .field("factor", &self.factor)
            .field("max_bucket_size", &self.max_bucket_size)
            .field("max_memory", &self.max_memory)
            .field("retained_bytes", &self.retained_bytes())
            .finish_non_exhaustive()
    }
}

impl Default for MappedBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MappedBufferPool - Constructors
// ============================================================================

impl MappedBufferPool {
    /// Creates an unbounded pool with [`DEFAULT_FACTOR`] buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_FACTOR, None, None)
    }

    /// Creates a pool with explicit bucket width and retention limits.
    ///
    /// A `factor` of zero is treated as [`DEFAULT_FACTOR`].
    #[must_use]
    pub fn with_limits(
        factor: usize,
        max_bucket_size: Option<usize>,
        max_memory: Option<usize>,
    ) -> Self {
        let factor = if factor == 0 { DEFAULT_FACTOR } else { factor };

        Self {
            factor,
            max_bucket_size,
            max_memory,
            retained: Mutex::new(Retained::default()),
            running: AtomicBool::new(false),
        }
    }
}

// ============================================================================
// MappedBufferPool - Accessors
// ============================================================================

impl MappedBufferPool {
    /// Returns the bucket width.
    #[inline]
    #[must_use]
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Returns the number of retained buffers across all buckets.
    #[must_use]
    pub fn retained_count(&self) -> usize {
        self.retained.lock().buckets.values().map(VecDeque::len).sum()
    }

    /// Returns the total capacity of retained buffers.
    #[must_use]
    pub fn retained_bytes(&self) -> usize {
        self.retained.lock().bytes
    }

    /// Bucket serving requests of `size` bytes.
    #[inline]
    fn bucket_for_request(&self, size: usize) -> usize {
        size.div_ceil(self.factor)
    }

    /// Drops every retained buffer.
    pub fn clear(&self) {
        let mut retained = self.retained.lock();
        retained.buckets.clear();
        retained.bytes = 0;
    }
}

// ============================================================================
// MappedBufferPool - BufferPool
// ============================================================================

impl BufferPool for MappedBufferPool {
    fn acquire(&self, size: usize) -> BytesMut {
        let bucket = self.bucket_for_request(size);

        let pooled = {
            let mut retained = self.retained.lock();
            let buffer = retained.buckets.get_mut(&bucket).and_then(VecDeque::pop_front);
            if let Some(buffer) = &buffer {
                retained.bytes -= buffer.capacity();
            }
            buffer
        };

        match pooled {
            Some(buffer) => {
                trace!(size, bucket, "Reusing pooled buffer");
                buffer
            }
            None => BytesMut::with_capacity(bucket * self.factor),
        }
    }

    fn release(&self, mut buffer: BytesMut) {
        let capacity = buffer.capacity();
        // Buckets are floor-keyed on release so a buffer only serves
        // requests it can hold.
        let bucket = capacity / self.factor;
        if bucket == 0 {
            return;
        }

        buffer.clear();

        let mut retained = self.retained.lock();

        // Stop clears under the same lock.
        if !self.running.load(Ordering::Acquire) {
            return;
        }

        if let Some(limit) = self.max_memory
            && retained.bytes.saturating_add(capacity) > limit
        {
            trace!(capacity, limit, "Dropping buffer over memory limit");
            return;
        }

        let queue = retained.buckets.entry(bucket).or_default();

        if let Some(limit) = self.max_bucket_size
            && queue.len() >= limit
        {
            trace!(bucket, limit, "Dropping buffer over bucket limit");
            return;
        }

        queue.push_back(buffer);
        retained.bytes += capacity;
    }
}

// ============================================================================
// MappedBufferPool - LifeCycle
// ============================================================================

impl LifeCycle for MappedBufferPool {
    fn name(&self) -> &str {
        "MappedBufferPool"
    }

    fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        if self.running.swap(false, Ordering::AcqRel) {
            debug!(
                buffers = self.retained_count(),
                bytes = self.retained_bytes(),
                "Clearing buffer pool"
            );
            self.clear();
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;

    fn started(factor: usize, max_bucket_size: Option<usize>, max_memory: Option<usize>) -> MappedBufferPool {
        let pool = MappedBufferPool::with_limits(factor, max_bucket_size, max_memory);
        pool.start().unwrap();
        pool
    }

    #[test]
    fn test_acquire_rounds_up_to_bucket() {
        let pool = MappedBufferPool::new();
        let buffer = pool.acquire(1500);

        assert!(buffer.capacity() >= 2048);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_released_buffer_is_reused() {
        let pool = started(DEFAULT_FACTOR, None, None);
        let mut buffer = pool.acquire(100);
        buffer.extend_from_slice(b"payload");
        let ptr = buffer.as_ptr();

        pool.release(buffer);
        let again = pool.acquire(900);

        assert_eq!(again.as_ptr(), ptr);
        assert!(again.is_empty());
        assert_eq!(pool.retained_count(), 0);
        assert_eq!(pool.retained_bytes(), 0);
    }

    #[test]
    fn test_different_bucket_allocates_fresh() {
        let pool = started(DEFAULT_FACTOR, None, None);
        pool.release(pool.acquire(100));

        let large = pool.acquire(5000);

        assert!(large.capacity() >= 5000);
        assert_eq!(pool.retained_count(), 1);
    }

    #[test]
    fn test_bucket_limit_drops_excess() {
        let pool = started(1024, Some(1), None);
        let a = pool.acquire(10);
        let b = pool.acquire(10);

        pool.release(a);
        pool.release(b);

        assert_eq!(pool.retained_count(), 1);
    }

    #[test]
    fn test_memory_limit_drops_excess() {
        let pool = started(1024, None, Some(1024));
        let a = pool.acquire(1024);
        let b = pool.acquire(4096);

        pool.release(a);
        pool.release(b);

        assert_eq!(pool.retained_count(), 1);
        assert!(pool.retained_bytes() <= 1024);
    }

    #[test]
    fn test_small_foreign_buffer_is_not_retained() {
        let pool = started(DEFAULT_FACTOR, None, None);
        pool.release(BytesMut::with_capacity(16));
        assert_eq!(pool.retained_count(), 0);
    }

    #[test]
    fn test_unstarted_pool_does_not_retain() {
        let pool = MappedBufferPool::new();
        pool.release(pool.acquire(10));

        assert_eq!(pool.retained_count(), 0);
        assert_eq!(pool.retained_bytes(), 0);
    }

    #[test]
    fn test_stop_clears_retained_buffers() {
        let pool = started(DEFAULT_FACTOR, None, None);
        pool.release(pool.acquire(10));
        assert_eq!(pool.retained_count(), 1);

        pool.stop().unwrap();

        assert!(!pool.is_running());
        assert_eq!(pool.retained_count(), 0);
        assert_eq!(pool.retained_bytes(), 0);
    }

    #[test]
    fn test_release_after_stop_is_dropped() {
        let pool = started(DEFAULT_FACTOR, None, None);
        let in_flight = pool.acquire(10);

        pool.stop().unwrap();
        pool.release(in_flight);

        assert_eq!(pool.retained_count(), 0);
        assert_eq!(pool.retained_bytes(), 0);
    }

    #[test]
    fn test_concurrent_release_respects_memory_limit() {
        let pool = Arc::new(started(1024, None, Some(1024)));

        for _ in 0..500 {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let pool = Arc::clone(&pool);
                    thread::spawn(move || pool.release(BytesMut::with_capacity(1024)))
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert!(pool.retained_bytes() <= 1024);
            assert!(pool.retained_count() <= 1);
            pool.clear();
        }
    }

    #[test]
    fn test_clear_racing_acquire_keeps_byte_total_consistent() {
        let pool = Arc::new(started(1024, None, Some(64 * 1024)));
        let done = Arc::new(AtomicBool::new(false));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        let buffer = pool.acquire(10);
                        pool.release(buffer);
                    }
                })
            })
            .collect();

        for _ in 0..20_000 {
            pool.clear();
            assert!(pool.retained_bytes() <= 64 * 1024);
        }

        done.store(true, Ordering::Relaxed);
        for worker in workers {
            worker.join().unwrap();
        }

        assert!(pool.retained_bytes() >= pool.retained_count() * 1024);
        assert!(pool.retained_bytes() <= 64 * 1024);
    }

    #[test]
    fn test_zero_factor_uses_default() {
        let pool = MappedBufferPool::with_limits(0, None, None);
        assert_eq!(pool.factor(), DEFAULT_FACTOR);
    }

    proptest! {
        #[test]
        fn prop_acquired_capacity_fits_request(size in 0usize..200_000, factor in 1usize..8192) {
            let pool = MappedBufferPool::with_limits(factor, None, None);
            let buffer = pool.acquire(size);
            prop_assert!(buffer.capacity() >= size);
        }

        #[test]
        fn prop_reused_buffer_fits_request(first in 1usize..50_000, second in 1usize..50_000) {
            let pool = started(DEFAULT_FACTOR, None, None);
            pool.release(pool.acquire(first));
            let buffer = pool.acquire(second);
            prop_assert!(buffer.capacity() >= second);
        }
    }
}
