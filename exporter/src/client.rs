//! The wire client seam between the exporter and a Loggregator ingress.

use crate::config::SourceInfo;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors a wire client can report for a single emission.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The send buffer is full; the value was dropped.
    #[error("Send buffer full, envelope dropped")]
    BufferFull,

    /// The client has been shut down.
    #[error("Client is closed")]
    Closed,
}

/// A client for the two Loggregator metric primitives.
///
/// Implementations must be safe to call from several threads at once.
pub trait WireClient: Send + Sync {
    /// Emits an instantaneous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be accepted for sending.
    fn emit_gauge(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        source: &SourceInfo,
    ) -> Result<(), ClientError>;

    /// Emits a monotonic counter increment.
    ///
    /// # Errors
    ///
    /// Returns an error if the increment could not be accepted for sending.
    fn emit_counter(&self, name: &str, delta: u64, source: &SourceInfo)
        -> Result<(), ClientError>;
}

impl<T: WireClient + ?Sized> WireClient for Arc<T> {
    fn emit_gauge(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        source: &SourceInfo,
    ) -> Result<(), ClientError> {
        (**self).emit_gauge(name, value, unit, source)
    }

    fn emit_counter(
        &self,
        name: &str,
        delta: u64,
        source: &SourceInfo,
    ) -> Result<(), ClientError> {
        (**self).emit_counter(name, delta, source)
    }
}

/// A call made on a [`WireClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum WireCall {
    /// An `emit_gauge` call.
    Gauge {
        /// Metric name.
        name: String,
        /// Value.
        value: f64,
        /// Unit.
        unit: String,
        /// Source identity.
        source: SourceInfo,
    },
    /// An `emit_counter` call.
    Counter {
        /// Metric name.
        name: String,
        /// Increment.
        delta: u64,
        /// Source identity.
        source: SourceInfo,
    },
}

/// In-memory wire client that records every call in order.
#[derive(Debug, Default)]
pub struct InMemoryWireClient {
    calls: Arc<RwLock<Vec<WireCall>>>,
}

impl InMemoryWireClient {
    /// Creates a new empty client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty client wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns a copy of every recorded call.
    #[must_use]
    pub fn calls(&self) -> Vec<WireCall> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: WireCall) -> Result<(), ClientError> {
        let mut calls = self.calls.write().map_err(|_| ClientError::Closed)?;
        calls.push(call);
        Ok(())
    }
}

impl WireClient for InMemoryWireClient {
    fn emit_gauge(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        source: &SourceInfo,
    ) -> Result<(), ClientError> {
        self.record(WireCall::Gauge {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            source: source.clone(),
        })
    }

    fn emit_counter(
        &self,
        name: &str,
        delta: u64,
        source: &SourceInfo,
    ) -> Result<(), ClientError> {
        self.record(WireCall::Counter {
            name: name.to_string(),
            delta,
            source: source.clone(),
        })
    }
}
