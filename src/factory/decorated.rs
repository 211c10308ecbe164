//! Default decorator chain.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::Result;
use crate::lifecycle::LifeCycle;

use super::{Decorator, Endpoint, ObjectFactory};

// ============================================================================
// DecoratedObjectFactory
// ============================================================================

/// Applies decorators in insertion order on decorate and in reverse order
/// on destroy.
pub struct DecoratedObjectFactory {
    decorators: RwLock<Vec<Arc<dyn Decorator>>>,
    running: AtomicBool,
}

impl fmt::Debug for DecoratedObjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedObjectFactory")
            .field("decorators", &self.decorator_count())
            .finish_non_exhaustive()
    }
}

impl Default for DecoratedObjectFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoratedObjectFactory {
    /// Creates a factory with no decorators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decorators: RwLock::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Appends a decorator to the chain.
    pub fn add_decorator(&self, decorator: Arc<dyn Decorator>) {
        self.decorators.write().push(decorator);
        debug!(count = self.decorator_count(), "Decorator added");
    }

    /// Removes a decorator; returns `true` if it was present.
    pub fn remove_decorator(&self, decorator: &Arc<dyn Decorator>) -> bool {
        let mut decorators = self.decorators.write();
        let before = decorators.len();
        decorators.retain(|d| !Arc::ptr_eq(d, decorator));
        decorators.len() != before
    }

    /// Returns the number of installed decorators.
    #[inline]
    #[must_use]
    pub fn decorator_count(&self) -> usize {
        self.decorators.read().len()
    }
}

impl ObjectFactory for DecoratedObjectFactory {
    fn decorate(&self, endpoint: Endpoint) -> Result<Endpoint> {
        let decorators = self.decorators.read().clone();
        trace!(decorators = decorators.len(), "Decorating endpoint");

        decorators
            .iter()
            .try_fold(endpoint, |endpoint, decorator| decorator.decorate(endpoint))
    }

    fn destroy(&self, endpoint: &mut Endpoint) {
        let decorators = self.decorators.read().clone();
        for decorator in decorators.iter().rev() {
            decorator.destroy(endpoint);
        }
    }
}

impl LifeCycle for DecoratedObjectFactory {
    fn name(&self) -> &str {
        "DecoratedObjectFactory"
    }

    fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

// ============================================================================
// Tests
// ============================================================================
