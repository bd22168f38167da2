//! Metric-to-envelope translation.

use crate::client::WireClient;
use crate::config::SourceInfo;
use shared::consumer::{Capabilities, ConsumeError, LogsConsumer, MetricsConsumer};
use shared::models::{MetricShape, Temporality};
use shared::otlp::conversions::{first_number_value, metric_count, metric_shape, metrics};
use shared::otlp::{proto, LogBatch, MetricBatch};

/// Exporter that hands OTLP metrics to a Loggregator wire client.
///
/// Only the first data point of each metric is read. Gauges become gauge
/// emissions with the metric's unit; sums become counter emissions whose
/// delta is the point value truncated to an unsigned integer. Histograms,
/// summaries and metrics without points are skipped.
///
/// Emission failures are logged and never fail the batch. Logs are accepted
/// and discarded.
#[derive(Debug)]
pub struct LoggregatorExporter<C> {
    client: C,
    source: SourceInfo,
}

impl<C: WireClient> LoggregatorExporter<C> {
    /// Creates a new exporter stamping `source` on every emission.
    pub fn new(client: C, source: SourceInfo) -> Self {
        Self { client, source }
    }

    /// Returns the wire client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the source identity stamped on every emission.
    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// Emits a single metric. Returns whether anything was handed to the client.
    fn export_metric(&self, metric: &proto::metrics::v1::Metric) -> bool {
        let shape = metric_shape(metric);
        let Some(value) = first_number_value(metric) else {
            tracing::trace!(metric = %metric.name, %shape, "Skipping metric without number value");
            return false;
        };

        let result = match shape {
            MetricShape::Gauge => {
                tracing::debug!(metric = %metric.name, "Sending gauge to Loggregator");
                self.client
                    .emit_gauge(&metric.name, value.as_f64(), &metric.unit, &self.source)
            }
            MetricShape::Sum(temporality) => {
                if temporality == Temporality::Cumulative {
                    tracing::debug!(
                        metric = %metric.name,
                        "Forwarding cumulative sum value as counter delta"
                    );
                }
                tracing::debug!(metric = %metric.name, "Sending counter to Loggregator");
                self.client
                    .emit_counter(&metric.name, value.as_delta(), &self.source)
            }
            MetricShape::Histogram
            | MetricShape::ExponentialHistogram
            | MetricShape::Summary
            | MetricShape::Empty => return false,
        };

        if let Err(e) = result {
            tracing::debug!(
                error = %e,
                metric = %metric.name,
                "Loggregator client dropped metric"
            );
        }
        true
    }
}

impl<C: WireClient> MetricsConsumer for LoggregatorExporter<C> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::read_only()
    }

    fn consume_metrics(&self, batch: &MetricBatch) -> Result<(), ConsumeError> {
        let mut exported = 0usize;
        let mut skipped = 0usize;

        for metric in metrics(batch) {
            if self.export_metric(metric) {
                exported += 1;
            } else {
                skipped += 1;
            }
        }

        tracing::debug!(
            metrics = metric_count(batch),
            exported,
            skipped,
            "Processed metric batch"
        );
        Ok(())
    }
}

impl<C: WireClient> LogsConsumer for LoggregatorExporter<C> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::read_only()
    }

    fn consume_logs(&self, _logs: &LogBatch) -> Result<(), ConsumeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InMemoryWireClient, WireCall};
    use proto::metrics::v1::{
        metric::Data, number_data_point::Value, Gauge, Metric, NumberDataPoint, Sum,
    };

    fn point(value: Value) -> NumberDataPoint {
        NumberDataPoint {
            value: Some(value),
            ..Default::default()
        }
    }

    fn sum(name: &str, temporality: i32, points: Vec<NumberDataPoint>) -> Metric {
        Metric {
            name: name.to_string(),
            data: Some(Data::Sum(Sum {
                data_points: points,
                aggregation_temporality: temporality,
                is_monotonic: true,
            })),
            ..Default::default()
        }
    }

    fn batch(metrics: Vec<Metric>) -> MetricBatch {
        MetricBatch {
            resource_metrics: vec![proto::metrics::v1::ResourceMetrics {
                scope_metrics: vec![proto::metrics::v1::ScopeMetrics {
                    metrics,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    fn exporter() -> LoggregatorExporter<InMemoryWireClient> {
        LoggregatorExporter::new(InMemoryWireClient::new(), SourceInfo::default())
    }

    #[test]
    fn test_cumulative_sum_is_forwarded_as_delta() {
        let exporter = exporter();
        let metrics = batch(vec![sum("total", 2, vec![point(Value::AsInt(12))])]);

        exporter.consume_metrics(&metrics).unwrap();

        assert_eq!(
            exporter.client().calls(),
            vec![WireCall::Counter {
                name: "total".to_string(),
                delta: 12,
                source: SourceInfo::default(),
            }]
        );
    }

    #[test]
    fn test_negative_sum_becomes_zero_delta() {
        let exporter = exporter();
        let metrics = batch(vec![sum("c", 1, vec![point(Value::AsInt(-5))])]);

        exporter.consume_metrics(&metrics).unwrap();

        assert!(matches!(
            exporter.client().calls().as_slice(),
            [WireCall::Counter { delta: 0, .. }]
        ));
    }

    #[test]
    fn test_gauge_without_value_is_skipped() {
        let exporter = exporter();
        let metric = Metric {
            name: "g".to_string(),
            data: Some(Data::Gauge(Gauge {
                data_points: vec![NumberDataPoint::default()],
            })),
            ..Default::default()
        };

        exporter.consume_metrics(&batch(vec![metric])).unwrap();

        assert!(exporter.client().calls().is_empty());
    }

    #[test]
    fn test_capabilities_are_read_only() {
        let exporter = exporter();
        assert!(!MetricsConsumer::capabilities(&exporter).mutates_data);
        assert!(!LogsConsumer::capabilities(&exporter).mutates_data);
    }
}
