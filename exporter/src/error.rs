//! Errors raised while starting or stopping the exporter.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur during the exporter lifecycle.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A certificate or key file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadPem {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The endpoint is not a valid URI.
    #[error("Invalid endpoint {endpoint}: {source}")]
    Endpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Underlying transport error.
        #[source]
        source: tonic::transport::Error,
    },

    /// The TLS settings were rejected.
    #[error("TLS configuration error: {0}")]
    Tls(#[source] tonic::transport::Error),

    /// The flusher task terminated abnormally.
    #[error("Flusher task failed: {0}")]
    Flusher(#[from] tokio::task::JoinError),
}
