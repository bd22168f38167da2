//! Log-to-metrics translation.

use shared::consumer::{Capabilities, ConsumeError, LogsConsumer, MetricsConsumer};
use shared::models::{LogMetric, LogMetricKind, SynthesizedMetric, SynthesizedShape};
use shared::otlp::conversions::{log_body_text, log_record_count, log_records};
use shared::otlp::{proto, LogBatch};
use thiserror::Error;

/// Why a log record produced no metric.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// The body is not a valid metric description.
    #[error("Body is not a metric description: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body names a kind this connector does not know.
    #[error("Unknown metric kind: '{0}'")]
    UnknownKind(String),
}

/// Result of decoding a single log record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// The record described a counter or gauge.
    Translated(SynthesizedMetric),

    /// The record described an event, which has no metric equivalent.
    Unsupported,

    /// The record was not a usable metric description.
    Skipped(SkipReason),
}

/// Connector that decodes metric descriptions from log bodies.
///
/// Records are visited in resource → scope → record order. A `counter` body
/// becomes a delta sum carrying `delta`, a `gauge` body becomes a gauge
/// carrying `value`. Each one is sent to the sink as its own batch.
///
/// Decoding is best effort: malformed bodies and unknown kinds are dropped,
/// `event` bodies are reported through `tracing`, and sink failures are
/// logged. None of these fail the batch.
#[derive(Debug)]
pub struct LogMetricsConnector<S> {
    sink: S,
}

impl<S: MetricsConsumer> LogMetricsConnector<S> {
    /// Creates a new connector forwarding to the given sink.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Returns the downstream sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decodes a single log record without forwarding anything.
    ///
    /// Every record is decoded on its own; fields missing from one body never
    /// take values from a previous record.
    #[must_use]
    pub fn decode_record(log_record: &proto::logs::v1::LogRecord) -> RecordOutcome {
        let metric = match LogMetric::parse(&log_body_text(log_record)) {
            Ok(metric) => metric,
            Err(e) => return RecordOutcome::Skipped(e.into()),
        };

        let LogMetric {
            kind,
            name,
            value,
            delta,
            tags,
        } = metric;

        let synthesized = match kind {
            LogMetricKind::Counter => {
                SynthesizedMetric::new(name, SynthesizedShape::DeltaSum, delta)
            }
            LogMetricKind::Gauge => SynthesizedMetric::new(name, SynthesizedShape::Gauge, value),
            LogMetricKind::Event => return RecordOutcome::Unsupported,
            LogMetricKind::Unknown(kind) => {
                return RecordOutcome::Skipped(SkipReason::UnknownKind(kind))
            }
        };

        RecordOutcome::Translated(synthesized.with_unwired_tags(tags))
    }

    fn forward(&self, metric: &SynthesizedMetric) {
        let batch = metric.to_batch();
        if let Err(e) = self.sink.consume_metrics(&batch) {
            tracing::debug!(error = %e, metric = %metric.name, "Downstream sink rejected metric");
        }
    }
}

impl<S: MetricsConsumer> LogsConsumer for LogMetricsConnector<S> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::read_only()
    }

    fn consume_logs(&self, logs: &LogBatch) -> Result<(), ConsumeError> {
        let mut translated = 0usize;
        let mut skipped = 0usize;

        for log_record in log_records(logs) {
            match Self::decode_record(log_record) {
                RecordOutcome::Translated(metric) => {
                    self.forward(&metric);
                    translated += 1;
                }
                RecordOutcome::Unsupported => {
                    tracing::warn!("Events are not supported");
                    skipped += 1;
                }
                RecordOutcome::Skipped(reason) => {
                    tracing::trace!(%reason, "Skipping log record");
                    skipped += 1;
                }
            }
        }

        tracing::debug!(
            records = log_record_count(logs),
            translated,
            skipped,
            "Processed log batch"
        );
        Ok(())
    }
}
