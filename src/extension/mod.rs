//! WebSocket protocol extensions.
//!
//! Only lookup and instantiation by name lives here; negotiation and frame
//! processing belong to the protocol implementation.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ExtensionConfig`] | Extension name and parameters |
//! | [`Extension`] | A configured extension instance |
//! | [`ExtensionRegistry`] | Capability to look up and instantiate extensions |
//! | [`WebSocketExtensionRegistry`] | Default registry with the built-in extensions |

// ============================================================================
// Submodules
// ============================================================================

/// Extension name and parameter list.
pub mod config;

/// Default registry and built-in extensions.
pub mod registry;

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::lifecycle::LifeCycle;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ExtensionConfig;
pub use registry::{ExtensionFactory, WebSocketExtensionRegistry};

// ============================================================================
// Extension
// ============================================================================

/// A configured extension instance.
pub trait Extension: Send + Sync {
    /// Returns the configuration this instance was built from.
    fn config(&self) -> &ExtensionConfig;

    /// Returns the registered extension name.
    fn name(&self) -> &str {
        self.config().name()
    }

    /// Returns `true` if the extension claims the RSV1 frame bit.
    fn is_rsv1_user(&self) -> bool {
        false
    }

    /// Returns `true` if the extension claims the RSV2 frame bit.
    fn is_rsv2_user(&self) -> bool {
        false
    }

    /// Returns `true` if the extension claims the RSV3 frame bit.
    fn is_rsv3_user(&self) -> bool {
        false
    }
}

// ============================================================================
// ExtensionRegistry
// ============================================================================

/// Looks up and instantiates extensions by name.
pub trait ExtensionRegistry: LifeCycle {
    /// Returns `true` if an extension is registered under `name`.
    fn is_available(&self, name: &str) -> bool;

    /// Returns the registered names in sorted order.
    fn available_extension_names(&self) -> Vec<String>;

    /// Builds an extension instance for `config`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownExtension`](crate::Error::UnknownExtension) if no
    ///   extension is registered under the config's name
    /// - [`Error::InvalidExtension`](crate::Error::InvalidExtension) if the
    ///   parameters are rejected
    fn new_instance(&self, config: &ExtensionConfig) -> Result<Box<dyn Extension>>;
}
