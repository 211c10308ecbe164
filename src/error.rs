//! Error types for WebSocket components.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```
//! use websocket_components::{Result, WebSocketComponents};
//!
//! fn example() -> Result<()> {
//!     let components = WebSocketComponents::new()?;
//!     components.start()?;
//!     components.stop()?;
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Construction | [`Error::Initialization`], [`Error::Config`] |
//! | Lifecycle | [`Error::Lifecycle`], [`Error::Component`] |
//! | Executor | [`Error::Rejected`] |
//! | Extensions | [`Error::UnknownExtension`], [`Error::InvalidExtension`] |
//! | Decoration | [`Error::Decoration`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes the name of the component involved.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// A default collaborator could not be built.
    ///
    /// Returned from construction when an absent slot cannot be filled.
    #[error("Failed to initialize {component}: {message}")]
    Initialization {
        /// Component that failed to build.
        component: String,
        /// Description of the failure.
        message: String,
    },

    /// Configuration error.
    ///
    /// Returned when options cannot be parsed or are out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// A dependent failed to start or stop.
    ///
    /// Wraps the error raised by the dependent.
    #[error("Lifecycle failure in {component}: {source}")]
    Lifecycle {
        /// Dependent whose transition failed.
        component: String,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// Failure raised by a collaborator itself.
    #[error("{component} failed: {message}")]
    Component {
        /// Collaborator that raised the failure.
        component: String,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Executor Errors
    // ========================================================================
    /// Work was submitted to an executor that is not running.
    #[error("Task rejected by {executor}: not running")]
    Rejected {
        /// Name of the rejecting executor.
        executor: String,
    },

    // ========================================================================
    // Extension Errors
    // ========================================================================
    /// No extension is registered under the requested name.
    #[error("Unknown extension: {name}")]
    UnknownExtension {
        /// Requested extension name.
        name: String,
    },

    /// Extension configuration is malformed or carries bad parameters.
    #[error("Invalid extension {name}: {message}")]
    InvalidExtension {
        /// Extension name.
        name: String,
        /// Description of the problem.
        message: String,
    },

    // ========================================================================
    // Decoration Errors
    // ========================================================================
    /// A decorator refused or failed to decorate an endpoint.
    #[error("Decoration failed: {message}")]
    Decoration {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an initialization error.
    #[inline]
    pub fn initialization(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Initialization {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a lifecycle error wrapping `cause`.
    #[inline]
    pub fn lifecycle(component: impl Into<String>, cause: Error) -> Self {
        Self::Lifecycle {
            component: component.into(),
            source: Box::new(cause),
        }
    }

    /// Creates a component failure.
    #[inline]
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Creates a rejected-task error.
    #[inline]
    pub fn rejected(executor: impl Into<String>) -> Self {
        Self::Rejected {
            executor: executor.into(),
        }
    }

    /// Creates an unknown extension error.
    #[inline]
    pub fn unknown_extension(name: impl Into<String>) -> Self {
        Self::UnknownExtension { name: name.into() }
    }

    /// Creates an invalid extension error.
    #[inline]
    pub fn invalid_extension(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExtension {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a decoration error.
    #[inline]
    pub fn decoration(message: impl Into<String>) -> Self {
        Self::Decoration {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a lifecycle error.
    #[inline]
    #[must_use]
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(self, Self::Lifecycle { .. })
    }

    /// Returns `true` if this error happened while constructing components.
    #[inline]
    #[must_use]
    pub fn is_initialization_error(&self) -> bool {
        matches!(self, Self::Initialization { .. } | Self::Config { .. })
    }

    /// Returns the innermost cause of a chain of lifecycle errors.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Lifecycle { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_initialization_display() {
        let err = Error::initialization("ThreadPoolExecutor", "max_threads must be >= 1");
        assert_eq!(
            err.to_string(),
            "Failed to initialize ThreadPoolExecutor: max_threads must be >= 1"
        );
        assert!(err.is_initialization_error());
    }

    #[test]
    fn test_lifecycle_wraps_cause() {
        let cause = Error::component("executor", "boom");
        let err = Error::lifecycle("executor", cause);

        assert!(err.is_lifecycle_error());
        assert_eq!(
            err.to_string(),
            "Lifecycle failure in executor: executor failed: boom"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_root_cause_unwraps_nested() {
        let inner = Error::lifecycle("pool", Error::rejected("qtp"));
        let outer = Error::lifecycle("components", inner);

        assert!(matches!(outer.root_cause(), Error::Rejected { .. }));
    }

    #[test]
    fn test_is_lifecycle_error() {
        let lifecycle = Error::lifecycle("x", Error::config("bad"));
        let other = Error::unknown_extension("x-foo");

        assert!(lifecycle.is_lifecycle_error());
        assert!(!other.is_lifecycle_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::Other, "thread spawn failed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
