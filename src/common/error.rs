//! Unified error types for the Longan library.
//!
//! This module provides a single error type spanning the automation seam,
//! the resolvers, and the persistence registry, presenting a consistent
//! API to users.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input could not be resolved to the expected handle kind
    #[error("Cannot resolve {concept} from input: {input}")]
    Resolution {
        /// The domain concept that was being resolved
        concept: &'static str,
        /// Description of the offending input
        input: String,
    },

    /// A previously obtained handle has been invalidated by the host
    #[error("Stale handle: {0}")]
    StaleHandle(String),

    /// A dotted-path read against a handle that does not expose that path
    #[error("Missing attribute '{path}' on {interface}")]
    MissingAttribute {
        /// Interface name of the handle the read was issued against
        interface: String,
        /// The offending dotted path
        path: String,
    },

    /// A property write or method call was rejected by the host
    #[error("Invalid value for '{path}': {reason}")]
    InvalidValue {
        /// The offending dotted path or method name
        path: String,
        /// Host-supplied rejection reason
        reason: String,
    },

    /// Geometric intersection of disjoint sets
    #[error("Empty set: the operands do not intersect")]
    EmptySet,

    /// No automation host is reachable
    #[error("Automation host unavailable: {0}")]
    HostUnavailable(String),

    /// A variant carried a different type than the caller expected
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// The expected variant kind
        expected: &'static str,
        /// The variant kind actually present
        got: &'static str,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persistence registry error
    #[error("Registry error: {0}")]
    Registry(String),

    /// Unsupported operation or sub-type
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a resolution failure, formatting the offending input.
    pub fn resolution<T: std::fmt::Debug>(concept: &'static str, input: &T) -> Self {
        Error::Resolution {
            concept,
            input: format!("{input:?}"),
        }
    }

    /// Shorthand for a host write rejection.
    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a host-side write rejection.
    ///
    /// Only these are dropped by invalidity filtering during model
    /// construction; every other kind propagates.
    #[inline]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::InvalidValue { .. })
    }
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;
