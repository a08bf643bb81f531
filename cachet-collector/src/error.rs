//! Error types for registration and serving.

use thiserror::Error;

/// Errors that can occur when registering a collector.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A metric with the same fully-qualified name is already registered.
    #[error("Duplicate metric descriptor: {0}")]
    Duplicate(String),
}

/// Errors that can occur when running the metrics HTTP server.
#[cfg(feature = "server")]
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be parsed.
    #[error("Invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding or accepting on the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
