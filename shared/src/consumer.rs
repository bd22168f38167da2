//! Consumer traits connecting pipeline stages.
//!
//! A stage that accepts logs implements [`LogsConsumer`], a stage that accepts
//! metrics implements [`MetricsConsumer`]. Stages receive batches by reference
//! and declare through [`Capabilities`] whether they modify them, so the host
//! can fan the same batch out to several consumers.

use crate::otlp::{LogBatch, MetricBatch};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors a consumer can report for a batch.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The consumer refused the batch.
    #[error("Batch rejected: {0}")]
    Rejected(String),

    /// The consumer cannot accept data at the moment.
    #[error("Consumer unavailable")]
    Unavailable,
}

/// What a consumer does with the data it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Whether the consumer modifies the batches it receives.
    pub mutates_data: bool,
}

impl Capabilities {
    /// Capabilities of a consumer that only reads its input.
    #[must_use]
    pub const fn read_only() -> Self {
        Self {
            mutates_data: false,
        }
    }
}

/// A pipeline stage that accepts log batches.
pub trait LogsConsumer: Send + Sync {
    /// Declares how the consumer treats the batches it receives.
    fn capabilities(&self) -> Capabilities;

    /// Consumes a batch of logs.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer rejects the batch.
    fn consume_logs(&self, logs: &LogBatch) -> Result<(), ConsumeError>;
}

/// A pipeline stage that accepts metric batches.
pub trait MetricsConsumer: Send + Sync {
    /// Declares how the consumer treats the batches it receives.
    fn capabilities(&self) -> Capabilities;

    /// Consumes a batch of metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer rejects the batch.
    fn consume_metrics(&self, metrics: &MetricBatch) -> Result<(), ConsumeError>;
}

impl<T: LogsConsumer + ?Sized> LogsConsumer for Arc<T> {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn consume_logs(&self, logs: &LogBatch) -> Result<(), ConsumeError> {
        (**self).consume_logs(logs)
    }
}

impl<T: MetricsConsumer + ?Sized> MetricsConsumer for Arc<T> {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn consume_metrics(&self, metrics: &MetricBatch) -> Result<(), ConsumeError> {
        (**self).consume_metrics(metrics)
    }
}

/// In-memory metrics consumer that records every batch it accepts.
///
/// Useful as the downstream sink in development and tests. When created with
/// [`InMemoryMetricsConsumer::rejecting`] it still records each batch but
/// answers with [`ConsumeError::Rejected`].
#[derive(Debug, Default)]
pub struct InMemoryMetricsConsumer {
    batches: Arc<RwLock<Vec<MetricBatch>>>,
    reject: bool,
}

impl InMemoryMetricsConsumer {
    /// Creates a new empty consumer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty consumer wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Creates a consumer that records batches and then rejects them.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            batches: Arc::default(),
            reject: true,
        }
    }

    /// Returns a copy of every recorded batch, in arrival order.
    #[must_use]
    pub fn all_metrics(&self) -> Vec<MetricBatch> {
        self.batches
            .read()
            .map(|batches| batches.clone())
            .unwrap_or_default()
    }

    /// Returns the number of recorded batches.
    #[must_use]
    pub fn count(&self) -> usize {
        self.batches.read().map_or(0, |batches| batches.len())
    }

    /// Removes every recorded batch.
    pub fn clear(&self) {
        if let Ok(mut batches) = self.batches.write() {
            batches.clear();
        }
    }
}

impl MetricsConsumer for InMemoryMetricsConsumer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::read_only()
    }

    fn consume_metrics(&self, metrics: &MetricBatch) -> Result<(), ConsumeError> {
        let mut batches = self
            .batches
            .write()
            .map_err(|_| ConsumeError::Unavailable)?;
        batches.push(metrics.clone());

        if self.reject {
            return Err(ConsumeError::Rejected("rejecting consumer".to_string()));
        }
        Ok(())
    }
}
