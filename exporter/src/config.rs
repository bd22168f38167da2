//! Exporter configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Identity stamped on every envelope sent to Loggregator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Validate)]
pub struct SourceInfo {
    /// The envelope source id.
    #[validate(length(min = 1, message = "Source id cannot be empty"))]
    pub source_id: String,

    /// The envelope instance id.
    pub instance_id: String,
}

impl SourceInfo {
    /// Creates a new source identity.
    #[must_use]
    pub fn new(source_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            instance_id: instance_id.into(),
        }
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self::new("OTEL1", "OTEL2")
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Loggregator exporter configuration.
///
/// Configuration values can be set via environment variables:
/// - `LOGGREGATOR_ENDPOINT`: Ingress address as `host:port` (default: "localhost:3458")
/// - `LOGGREGATOR_CA_CERT`: Path to the CA certificate (PEM)
/// - `LOGGREGATOR_CERT`: Path to the client certificate (PEM)
/// - `LOGGREGATOR_KEY`: Path to the client key (PEM)
/// - `LOGGREGATOR_SERVER_NAME`: Name expected on the server certificate (default: "metron")
/// - `LOGGREGATOR_SOURCE_ID`: Envelope source id (default: "OTEL1")
/// - `LOGGREGATOR_INSTANCE_ID`: Envelope instance id (default: "OTEL2")
/// - `LOGGREGATOR_BATCH_MAX_SIZE`: Envelopes per sent batch (default: 100)
/// - `LOGGREGATOR_FLUSH_INTERVAL_MS`: Maximum time an envelope waits before sending (default: 1000)
/// - `LOGGREGATOR_BUFFER_SIZE`: Envelopes held before new ones are dropped (default: 10000)
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Ingress address as `host:port`.
    #[validate(length(min = 1, message = "Endpoint cannot be empty"))]
    pub endpoint: String,

    /// Path to the CA certificate.
    #[validate(length(min = 1, message = "CA certificate path cannot be empty"))]
    pub ca_cert: String,

    /// Path to the client certificate.
    #[validate(length(min = 1, message = "Certificate path cannot be empty"))]
    pub cert: String,

    /// Path to the client key.
    #[validate(length(min = 1, message = "Key path cannot be empty"))]
    pub key: String,

    /// Name expected on the server certificate.
    #[validate(length(min = 1, message = "Server name cannot be empty"))]
    pub server_name: String,

    /// Identity stamped on every envelope.
    #[validate(nested)]
    pub source: SourceInfo,

    /// Number of envelopes that triggers a send.
    #[validate(range(min = 1, message = "Batch size must be at least 1"))]
    pub batch_max_size: usize,

    /// Maximum time an envelope waits before it is sent.
    pub flush_interval: Duration,

    /// Number of envelopes buffered before new ones are dropped.
    #[validate(range(min = 1, message = "Buffer size must be at least 1"))]
    pub buffer_size: usize,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a new configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        let number = |key: &str| -> Result<Option<u64>> {
            lookup(key)
                .map(|v| v.parse::<u64>())
                .transpose()
                .with_context(|| format!("{key} must be a non-negative integer"))
        };

        let batch_max_size = match number("LOGGREGATOR_BATCH_MAX_SIZE")? {
            Some(n) => usize::try_from(n)?,
            None => defaults.batch_max_size,
        };

        let buffer_size = match number("LOGGREGATOR_BUFFER_SIZE")? {
            Some(n) => usize::try_from(n)?,
            None => defaults.buffer_size,
        };

        let flush_interval = number("LOGGREGATOR_FLUSH_INTERVAL_MS")?
            .map_or(defaults.flush_interval, Duration::from_millis);

        Ok(Self {
            endpoint: string("LOGGREGATOR_ENDPOINT", defaults.endpoint),
            ca_cert: string("LOGGREGATOR_CA_CERT", defaults.ca_cert),
            cert: string("LOGGREGATOR_CERT", defaults.cert),
            key: string("LOGGREGATOR_KEY", defaults.key),
            server_name: string("LOGGREGATOR_SERVER_NAME", defaults.server_name),
            source: SourceInfo {
                source_id: string("LOGGREGATOR_SOURCE_ID", defaults.source.source_id),
                instance_id: string("LOGGREGATOR_INSTANCE_ID", defaults.source.instance_id),
            },
            batch_max_size,
            flush_interval,
            buffer_size,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The endpoint, a certificate path or the server name is empty
    /// - The source id is empty
    /// - The batch or buffer size is zero
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Ok(())
    }

    /// Returns the URI of the ingress endpoint.
    ///
    /// A bare `host:port` is reached over `https`.
    #[must_use]
    pub fn endpoint_uri(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("https://{}", self.endpoint)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "localhost:3458".to_string(),
            ca_cert: String::new(),
            cert: String::new(),
            key: String::new(),
            server_name: "metron".to_string(),
            source: SourceInfo::default(),
            batch_max_size: 100,
            flush_interval: Duration::from_secs(1),
            buffer_size: 10_000,
        }
    }
}
