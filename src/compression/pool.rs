//! Bounded pool of compression contexts.
//!
//! `capacity` bounds how many idle contexts are retained. A capacity of zero
//! or less disables retention: every acquire builds a new context and every
//! release drops it. Contexts are only retained while the pool is running.
//!
//! The `nowrap` flag selects raw deflate streams without the zlib header
//! and checksum, which is the framing `permessage-deflate` uses.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use flate2::{Compress, Compression, Decompress};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lifecycle::LifeCycle;

use super::{DeflaterPool, InflaterPool};

// ============================================================================
// Constants
// ============================================================================

/// Default number of idle contexts retained.
pub const DEFAULT_CAPACITY: i32 = 1024;

/// Compression level selecting the codec's default (level 6).
pub const DEFAULT_COMPRESSION: i32 = -1;

// ============================================================================
// Types
// ============================================================================

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;
type Reset<T> = Box<dyn Fn(&mut T) + Send + Sync>;

// ============================================================================
// CompressionPool
// ============================================================================

/// Bounded pool of reusable compression contexts.
///
/// Build one with [`CompressionPool::inflaters`] or
/// [`CompressionPool::deflaters`].
pub struct CompressionPool<T> {
    /// Name used in logs and dumps.
    label: &'static str,

    /// Maximum idle contexts retained; `<= 0` disables retention.
    capacity: i32,

    /// Builds a fresh context.
    factory: Factory<T>,

    /// Returns a used context to its initial state.
    reset: Reset<T>,

    /// Idle contexts.
    pooled: Mutex<Vec<T>>,

    running: AtomicBool,
}

impl<T> fmt::Debug for CompressionPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionPool")
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .field("pooled", &self.pooled.lock().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// CompressionPool - Generic API
// ============================================================================

impl<T: Send> CompressionPool<T> {
    fn new(
        label: &'static str,
        capacity: i32,
        factory: impl Fn() -> T + Send + Sync + 'static,
        reset: impl Fn(&mut T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            label,
            capacity,
            factory: Box::new(factory),
            reset: Box::new(reset),
            pooled: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Returns the retention capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Returns the number of idle contexts currently retained.
    #[inline]
    #[must_use]
    pub fn pooled_count(&self) -> usize {
        self.pooled.lock().len()
    }

    /// Takes an idle context, or builds one if none is available.
    pub fn acquire(&self) -> T {
        let pooled = self.pooled.lock().pop();
        pooled.unwrap_or_else(|| (self.factory)())
    }

    /// Resets and retains `context`, or drops it if the pool is full or
    /// not running.
    pub fn release(&self, mut context: T) {
        let Ok(limit) = usize::try_from(self.capacity) else {
            return;
        };
        if limit == 0 || !self.running.load(Ordering::Acquire) {
            return;
        }

        (self.reset)(&mut context);

        let mut pooled = self.pooled.lock();
        // Stop drains under the same lock.
        if self.running.load(Ordering::Acquire) && pooled.len() < limit {
            pooled.push(context);
        }
    }
}

// ============================================================================
// CompressionPool - Inflaters
// ============================================================================

impl CompressionPool<Decompress> {
    /// Creates a pool of decompression contexts.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Idle contexts retained (`<= 0` disables retention)
    /// * `nowrap` - Expect raw deflate streams without zlib framing
    #[must_use]
    pub fn inflaters(capacity: i32, nowrap: bool) -> Self {
        let zlib_header = !nowrap;
        Self::new(
            "InflaterPool",
            capacity,
            move || Decompress::new(zlib_header),
            move |inflater: &mut Decompress| inflater.reset(zlib_header),
        )
    }
}

impl InflaterPool for CompressionPool<Decompress> {
    fn acquire(&self) -> Decompress {
        CompressionPool::acquire(self)
    }

    fn release(&self, inflater: Decompress) {
        CompressionPool::release(self, inflater);
    }
}

// ============================================================================
// CompressionPool - Deflaters
// ============================================================================

impl CompressionPool<Compress> {
    /// Creates a pool of compression contexts.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Idle contexts retained (`<= 0` disables retention)
    /// * `level` - Compression level `0..=9`, or [`DEFAULT_COMPRESSION`]
    /// * `nowrap` - Produce raw deflate streams without zlib framing
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] if `level` is out of range.
    pub fn deflaters(capacity: i32, level: i32, nowrap: bool) -> Result<Self> {
        let compression = compression_level(level)?;
        let zlib_header = !nowrap;

        Ok(Self::new(
            "DeflaterPool",
            capacity,
            move || Compress::new(compression, zlib_header),
            Compress::reset,
        ))
    }
}

impl DeflaterPool for CompressionPool<Compress> {
    fn acquire(&self) -> Compress {
        CompressionPool::acquire(self)
    }

    fn release(&self, deflater: Compress) {
        CompressionPool::release(self, deflater);
    }
}

/// Maps a numeric level onto the codec's [`Compression`].
fn compression_level(level: i32) -> Result<Compression> {
    match level {
        DEFAULT_COMPRESSION => Ok(Compression::default()),
        0..=9 => Ok(Compression::new(level.unsigned_abs())),
        _ => Err(Error::initialization(
            "DeflaterPool",
            format!("compression level {level} is outside -1..=9"),
        )),
    }
}

// ============================================================================
// CompressionPool - LifeCycle
// ============================================================================

impl<T: Send> LifeCycle for CompressionPool<T> {
    fn name(&self) -> &str {
        self.label
    }

    fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        if self.running.swap(false, Ordering::AcqRel) {
            let drained = std::mem::take(&mut *self.pooled.lock());
            debug!(pool = self.label, contexts = drained.len(), "Released pooled contexts");
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

    use flate2::{FlushCompress, FlushDecompress};

    const PAYLOAD: &[u8] = b"Hello WebSocket! Hello WebSocket! Hello WebSocket!";

    fn deflate(pool: &CompressionPool<Compress>, input: &[u8]) -> Vec<u8> {
        let mut deflater = pool.acquire();
        let mut out = Vec::with_capacity(input.len() + 64);
        deflater
            .compress_vec(input, &mut out, FlushCompress::Finish)
            .unwrap();
        pool.release(deflater);
        out
    }

    fn inflate(pool: &CompressionPool<Decompress>, input: &[u8]) -> Vec<u8> {
        let mut inflater = pool.acquire();
        let mut out = Vec::with_capacity(1024);
        inflater
            .decompress_vec(input, &mut out, FlushDecompress::Finish)
            .unwrap();
        pool.release(inflater);
        out
    }

    #[test]
    fn test_raw_deflate_round_trip() {
        let deflaters = CompressionPool::deflaters(DEFAULT_CAPACITY, DEFAULT_COMPRESSION, true).unwrap();
        let inflaters = CompressionPool::inflaters(DEFAULT_CAPACITY, true);

        let compressed = deflate(&deflaters, PAYLOAD);

        assert_ne!(compressed[0], 0x78, "raw stream must not carry a zlib header");
        assert_eq!(inflate(&inflaters, &compressed), PAYLOAD);
    }

    #[test]
    fn test_wrapped_streams_carry_zlib_header() {
        let deflaters = CompressionPool::deflaters(DEFAULT_CAPACITY, DEFAULT_COMPRESSION, false).unwrap();
        let compressed = deflate(&deflaters, PAYLOAD);
        assert_eq!(compressed[0], 0x78);
    }

    #[test]
    fn test_released_context_is_reset_and_reused() {
        let deflaters = CompressionPool::deflaters(4, 6, true).unwrap();
        deflaters.start().unwrap();

        let first = deflate(&deflaters, PAYLOAD);
        assert_eq!(deflaters.pooled_count(), 1);
        let second = deflate(&deflaters, PAYLOAD);

        assert_eq!(first, second);
        assert_eq!(deflaters.pooled_count(), 1);
    }

    #[test]
    fn test_not_retained_before_start() {
        let inflaters = CompressionPool::inflaters(4, true);
        inflaters.release(inflaters.acquire());
        assert_eq!(inflaters.pooled_count(), 0);
    }

    #[test]
    fn test_zero_capacity_disables_retention() {
        let inflaters = CompressionPool::inflaters(0, true);
        inflaters.start().unwrap();
        inflaters.release(inflaters.acquire());
        assert_eq!(inflaters.pooled_count(), 0);
    }

    #[test]
    fn test_capacity_bounds_retention() {
        let inflaters = CompressionPool::inflaters(1, true);
        inflaters.start().unwrap();
        let a = inflaters.acquire();
        let b = inflaters.acquire();

        inflaters.release(a);
        inflaters.release(b);

        assert_eq!(inflaters.pooled_count(), 1);
    }

    #[test]
    fn test_stop_drains_pool() {
        let inflaters = CompressionPool::inflaters(4, true);
        inflaters.start().unwrap();
        inflaters.release(inflaters.acquire());

        inflaters.stop().unwrap();

        assert!(!inflaters.is_running());
        assert_eq!(inflaters.pooled_count(), 0);
    }

    #[test]
    fn test_release_after_stop_is_dropped() {
        let deflaters = CompressionPool::deflaters(4, DEFAULT_COMPRESSION, true).unwrap();
        deflaters.start().unwrap();
        let in_flight = deflaters.acquire();

        deflaters.stop().unwrap();
        deflaters.release(in_flight);

        assert_eq!(deflaters.pooled_count(), 0);
    }

    #[test]
    fn test_invalid_level_fails_initialization() {
        let err = CompressionPool::deflaters(DEFAULT_CAPACITY, 12, true).unwrap_err();
        assert!(err.is_initialization_error());
        assert!(err.to_string().contains("12"));
    }
}
