//! Default extension registry.
//!
//! # Built-in Extensions
//!
//! | Name | Parameters | RSV1 |
//! |------|------------|------|
//! | `identity` | any | no |
//! | `fragment` | `maxLength` (positive integer) | no |
//! | `permessage-deflate` | RFC 7692 parameters only | yes |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lifecycle::LifeCycle;

use super::{Extension, ExtensionConfig, ExtensionRegistry};

// ============================================================================
// Constants
// ============================================================================

/// Parameters accepted by `permessage-deflate`.
const DEFLATE_PARAMETERS: &[&str] = &[
    "server_no_context_takeover",
    "client_no_context_takeover",
    "server_max_window_bits",
    "client_max_window_bits",
];

// ============================================================================
// Types
// ============================================================================

/// Builds an extension instance from its config.
pub type ExtensionFactory =
    Arc<dyn Fn(&ExtensionConfig) -> Result<Box<dyn Extension>> + Send + Sync>;

// ============================================================================
// BuiltinExtension
// ============================================================================

/// Configured instance of a built-in extension.
#[derive(Debug, Clone)]
struct BuiltinExtension {
    config: ExtensionConfig,
    rsv1: bool,
}

impl Extension for BuiltinExtension {
    fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    fn is_rsv1_user(&self) -> bool {
        self.rsv1
    }
}

// ============================================================================
// WebSocketExtensionRegistry
// ============================================================================

/// Registry mapping extension names to factories.
///
/// [`WebSocketExtensionRegistry::new`] pre-registers the built-in
/// extensions; further factories may be added at any time.
pub struct WebSocketExtensionRegistry {
    factories: RwLock<FxHashMap<String, ExtensionFactory>>,
    running: AtomicBool,
}

impl fmt::Debug for WebSocketExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketExtensionRegistry")
            .field("extensions", &self.available_extension_names())
            .finish_non_exhaustive()
    }
}

impl Default for WebSocketExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// WebSocketExtensionRegistry - Constructors
// ============================================================================

impl WebSocketExtensionRegistry {
    /// Creates a registry with the built-in extensions.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register("identity", |config| {
            Ok(Box::new(BuiltinExtension {
                config: config.clone(),
                rsv1: false,
            }) as Box<dyn Extension>)
        });
        registry.register("fragment", fragment);
        registry.register("permessage-deflate", permessage_deflate);
        registry
    }

    /// Creates a registry with no extensions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: RwLock::new(FxHashMap::default()),
            running: AtomicBool::new(false),
        }
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ExtensionConfig) -> Result<Box<dyn Extension>> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(extension = %name, "Registering extension");
        self.factories.write().insert(name, Arc::new(factory));
    }

    /// Removes the extension registered under `name`.
    ///
    /// Returns `true` if an entry was removed.
    pub fn unregister(&self, name: &str) -> bool {
        self.factories.write().remove(name).is_some()
    }
}

// ============================================================================
// WebSocketExtensionRegistry - ExtensionRegistry
// ============================================================================

impl ExtensionRegistry for WebSocketExtensionRegistry {
    fn is_available(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    fn available_extension_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn new_instance(&self, config: &ExtensionConfig) -> Result<Box<dyn Extension>> {
        let factory = self
            .factories
            .read()
            .get(config.name())
            .cloned()
            .ok_or_else(|| Error::unknown_extension(config.name()))?;

        factory(config)
    }
}

// ============================================================================
// WebSocketExtensionRegistry - LifeCycle
// ============================================================================

impl LifeCycle for WebSocketExtensionRegistry {
    fn name(&self) -> &str {
        "WebSocketExtensionRegistry"
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
// Built-in Factories
// ============================================================================

fn fragment(config: &ExtensionConfig) -> Result<Box<dyn Extension>> {
    if let Some(value) = config.parameter("maxLength") {
        match value.parse::<u64>() {
            Ok(n) if n > 0 => {}
            _ => {
                return Err(Error::invalid_extension(
                    config.name(),
                    format!("maxLength must be a positive integer, got {value:?}"),
                ));
            }
        }
    }

    Ok(Box::new(BuiltinExtension {
        config: config.clone(),
        rsv1: false,
    }))
}

fn permessage_deflate(config: &ExtensionConfig) -> Result<Box<dyn Extension>> {
    for (key, value) in config.parameters() {
        if !DEFLATE_PARAMETERS.contains(&key) {
            return Err(Error::invalid_extension(
                config.name(),
                format!("unsupported parameter {key:?}"),
            ));
        }

        if key.ends_with("_max_window_bits")
            && let Some(value) = value
            && !matches!(value.parse::<u8>(), Ok(8..=15))
        {
            return Err(Error::invalid_extension(
                config.name(),
                format!("{key} must be within 8..=15, got {value:?}"),
            ));
        }
    }

    Ok(Box::new(BuiltinExtension {
        config: config.clone(),
        rsv1: true,
    }))
}

// ============================================================================
// Tests
// ============================================================================
