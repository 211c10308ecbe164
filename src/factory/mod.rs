//! Decoration of user-supplied endpoint instances.
//!
//! Containers embedding the WebSocket layer (dependency injection, resource
//! injection, metrics) install [`Decorator`]s; every endpoint handed to the
//! WebSocket layer passes through them before use and again on destroy.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use websocket_components::factory::{create_instance, DecoratedObjectFactory, Decorator, Endpoint};
//! use websocket_components::Result;
//!
//! #[derive(Default)]
//! struct ChatEndpoint {
//!     injected: bool,
//! }
//!
//! struct Inject;
//!
//! impl Decorator for Inject {
//!     fn decorate(&self, mut endpoint: Endpoint) -> Result<Endpoint> {
//!         if let Some(chat) = endpoint.downcast_mut::<ChatEndpoint>() {
//!             chat.injected = true;
//!         }
//!         Ok(endpoint)
//!     }
//! }
//!
//! let factory = DecoratedObjectFactory::new();
//! factory.add_decorator(Arc::new(Inject));
//!
//! let chat: Box<ChatEndpoint> = create_instance(&factory).unwrap();
//! assert!(chat.injected);
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Default decorator chain.
pub mod decorated;

// ============================================================================
// Imports
// ============================================================================

use std::any::{Any, type_name};

use crate::error::{Error, Result};
use crate::lifecycle::LifeCycle;

// ============================================================================
// Re-exports
// ============================================================================

pub use decorated::DecoratedObjectFactory;

// ============================================================================
// Types
// ============================================================================

/// A type-erased endpoint instance.
pub type Endpoint = Box<dyn Any + Send>;

// ============================================================================
// Decorator
// ============================================================================

/// Hook applied to endpoints as they are created and destroyed.
pub trait Decorator: Send + Sync {
    /// Decorates `endpoint`, possibly replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error to abort creation of the endpoint.
    fn decorate(&self, endpoint: Endpoint) -> Result<Endpoint>;

    /// Releases anything `decorate` attached to `endpoint`.
    fn destroy(&self, _endpoint: &mut Endpoint) {}
}

// ============================================================================
// ObjectFactory
// ============================================================================

/// Decorates user-supplied endpoint instances.
pub trait ObjectFactory: LifeCycle {
    /// Passes `endpoint` through every decorator.
    ///
    /// # Errors
    ///
    /// Returns the first decorator failure.
    fn decorate(&self, endpoint: Endpoint) -> Result<Endpoint>;

    /// Passes `endpoint` through every decorator's destroy hook.
    fn destroy(&self, endpoint: &mut Endpoint);
}

/// Creates a `T::default()` and decorates it.
///
/// # Errors
///
/// - Any decorator failure
/// - [`Error::Decoration`] if a decorator replaced the instance with a
///   different type
pub fn create_instance<T>(factory: &dyn ObjectFactory) -> Result<Box<T>>
where
    T: Default + Send + 'static,
{
    let endpoint: Endpoint = Box::new(T::default());

    factory.decorate(endpoint)?.downcast::<T>().map_err(|_| {
        Error::decoration(format!(
            "decorator replaced {} with a different type",
            type_name::<T>()
        ))
    })
}
