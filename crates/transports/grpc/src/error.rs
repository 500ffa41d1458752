//! Error types for the Transaction Gateway gRPC client
//!
//! Remote call failures are not represented here: they are classified into an
//! [`Outcome`](crate::Outcome) instead. These types cover everything that can go
//! wrong before a call is put on the wire.

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the client crate
#[derive(Debug, Error)]
pub enum Error {
    /// Channel could not be established or has been released
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Call metadata was rejected before sending
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Client configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures of the connection provider
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Endpoint string is empty or not a valid URI
    #[error("Invalid gRPC endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as supplied by the caller
        endpoint: String,
        /// Parser message
        reason: String,
    },

    /// TLS material could not be loaded or was rejected
    #[error("TLS configuration failed for '{endpoint}': {reason}")]
    Tls {
        /// Endpoint the TLS policy was applied to
        endpoint: String,
        /// Underlying failure
        reason: String,
    },

    /// Resolve or connect failed, or the connect timeout elapsed
    #[error("Failed to connect to gRPC endpoint '{endpoint}': {reason}")]
    Unreachable {
        /// Endpoint that was dialed
        endpoint: String,
        /// Underlying failure
        reason: String,
    },

    /// The connection was closed and cannot carry further calls
    #[error("Connection to '{endpoint}' is closed")]
    Closed {
        /// Endpoint of the released connection
        endpoint: String,
    },
}

/// Invalid call metadata
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Invalid metadata key '{0}'")]
    InvalidKey(String),

    #[error("Invalid value for metadata key '{key}'")]
    InvalidValue { key: String },
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
