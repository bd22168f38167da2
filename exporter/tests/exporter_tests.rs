//! Integration tests for the Loggregator exporter.
//!
//! Metric batches are fed to the exporter and the calls reaching an
//! in-memory wire client are inspected.

use logmetrics_connector::LogMetricsConnector;
use loggregator_exporter::{InMemoryWireClient, LoggregatorExporter, SourceInfo, WireCall};
use shared::consumer::{LogsConsumer, MetricsConsumer};
use shared::otlp::{proto, LogBatch, MetricBatch};
use std::sync::Arc;

use proto::metrics::v1::{
    metric::Data, number_data_point::Value, AggregationTemporality, Gauge, Histogram,
    HistogramDataPoint, Metric, NumberDataPoint, Sum,
};

fn point(value: Value) -> NumberDataPoint {
    NumberDataPoint {
        time_unix_nano: 1_700_000_000_000_000_000,
        value: Some(value),
        ..Default::default()
    }
}

fn delta_sum(name: &str, points: Vec<NumberDataPoint>) -> Metric {
    Metric {
        name: name.to_string(),
        data: Some(Data::Sum(Sum {
            data_points: points,
            aggregation_temporality: AggregationTemporality::Delta as i32,
            is_monotonic: true,
        })),
        ..Default::default()
    }
}

fn gauge(name: &str, unit: &str, points: Vec<NumberDataPoint>) -> Metric {
    Metric {
        name: name.to_string(),
        unit: unit.to_string(),
        data: Some(Data::Gauge(Gauge {
            data_points: points,
        })),
        ..Default::default()
    }
}

/// Builds a batch with one resource group per entry and one scope group per inner entry.
fn metric_batch(groups: Vec<Vec<Vec<Metric>>>) -> MetricBatch {
    MetricBatch {
        resource_metrics: groups
            .into_iter()
            .map(|scopes| proto::metrics::v1::ResourceMetrics {
                scope_metrics: scopes
                    .into_iter()
                    .map(|metrics| proto::metrics::v1::ScopeMetrics {
                        metrics,
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            })
            .collect(),
    }
}

fn single(metric: Metric) -> MetricBatch {
    metric_batch(vec![vec![vec![metric]]])
}

fn test_exporter() -> LoggregatorExporter<Arc<InMemoryWireClient>> {
    LoggregatorExporter::new(InMemoryWireClient::new_shared(), SourceInfo::default())
}

fn counter_call(name: &str, delta: u64) -> WireCall {
    WireCall::Counter {
        name: name.to_string(),
        delta,
        source: SourceInfo::default(),
    }
}

#[test]
fn test_empty_batch_makes_no_calls() {
    let exporter = test_exporter();

    assert!(exporter.consume_metrics(&MetricBatch::default()).is_ok());
    assert!(exporter.consume_metrics(&metric_batch(vec![vec![vec![]]])).is_ok());

    assert!(exporter.client().calls().is_empty());
}

#[test]
fn test_int_sum_becomes_counter() {
    let exporter = test_exporter();

    exporter
        .consume_metrics(&single(delta_sum("requests", vec![point(Value::AsInt(42))])))
        .unwrap();

    assert_eq!(exporter.client().calls(), vec![counter_call("requests", 42)]);
}

#[test]
fn test_double_gauge_becomes_gauge_with_unit() {
    let exporter = test_exporter();

    exporter
        .consume_metrics(&single(gauge("cpu", "percent", vec![point(Value::AsDouble(3.5))])))
        .unwrap();

    assert_eq!(
        exporter.client().calls(),
        vec![WireCall::Gauge {
            name: "cpu".to_string(),
            value: 3.5,
            unit: "percent".to_string(),
            source: SourceInfo::default(),
        }]
    );
}

#[test]
fn test_int_gauge_is_widened() {
    let exporter = test_exporter();

    exporter
        .consume_metrics(&single(gauge("queue", "", vec![point(Value::AsInt(7))])))
        .unwrap();

    assert!(matches!(
        exporter.client().calls().as_slice(),
        [WireCall::Gauge { value, .. }] if *value == 7.0
    ));
}

#[test]
fn test_double_sum_is_truncated() {
    let exporter = test_exporter();

    exporter
        .consume_metrics(&single(delta_sum("bytes", vec![point(Value::AsDouble(9.9))])))
        .unwrap();

    assert_eq!(exporter.client().calls(), vec![counter_call("bytes", 9)]);
}

#[test]
fn test_unsupported_shapes_are_skipped() {
    let exporter = test_exporter();
    let histogram = Metric {
        name: "latency".to_string(),
        data: Some(Data::Histogram(Histogram {
            data_points: vec![HistogramDataPoint {
                count: 3,
                sum: Some(1.5),
                ..Default::default()
            }],
            aggregation_temporality: AggregationTemporality::Delta as i32,
        })),
        ..Default::default()
    };
    let empty = Metric {
        name: "nothing".to_string(),
        ..Default::default()
    };
    let no_points = delta_sum("no_points", vec![]);

    let result = exporter.consume_metrics(&metric_batch(vec![vec![vec![
        histogram, empty, no_points,
    ]]]));

    assert!(result.is_ok());
    assert!(exporter.client().calls().is_empty());
}

#[test]
fn test_only_first_data_point_is_read() {
    let exporter = test_exporter();

    exporter
        .consume_metrics(&single(delta_sum(
            "requests",
            vec![point(Value::AsInt(1)), point(Value::AsInt(2)), point(Value::AsInt(3))],
        )))
        .unwrap();

    assert_eq!(exporter.client().calls(), vec![counter_call("requests", 1)]);
}

#[test]
fn test_calls_follow_batch_order() {
    let exporter = test_exporter();
    let batch = metric_batch(vec![
        vec![
            vec![
                delta_sum("a", vec![point(Value::AsInt(1))]),
                delta_sum("b", vec![point(Value::AsInt(2))]),
            ],
            vec![delta_sum("c", vec![point(Value::AsInt(3))])],
        ],
        vec![vec![delta_sum("d", vec![point(Value::AsInt(4))])]],
    ]);

    exporter.consume_metrics(&batch).unwrap();

    assert_eq!(
        exporter.client().calls(),
        vec![
            counter_call("a", 1),
            counter_call("b", 2),
            counter_call("c", 3),
            counter_call("d", 4),
        ]
    );
}

#[test]
fn test_translation_is_repeatable() {
    let batch = metric_batch(vec![vec![vec![
        delta_sum("requests", vec![point(Value::AsInt(5))]),
        gauge("cpu", "percent", vec![point(Value::AsDouble(0.5))]),
    ]]]);

    let first = test_exporter();
    let second = test_exporter();
    first.consume_metrics(&batch).unwrap();
    second.consume_metrics(&batch).unwrap();

    assert_eq!(first.client().calls(), second.client().calls());
    assert_eq!(first.client().calls().len(), 2);
}

#[test]
fn test_configured_source_is_stamped() {
    let source = SourceInfo::new("my-app", "3");
    let exporter = LoggregatorExporter::new(InMemoryWireClient::new(), source.clone());

    exporter
        .consume_metrics(&single(gauge("g", "", vec![point(Value::AsInt(1))])))
        .unwrap();

    assert!(matches!(
        exporter.client().calls().as_slice(),
        [WireCall::Gauge { source: s, .. }] if *s == source
    ));
}

#[test]
fn test_logs_are_accepted_and_ignored() {
    let exporter = test_exporter();
    let logs = LogBatch {
        resource_logs: vec![proto::logs::v1::ResourceLogs {
            scope_logs: vec![proto::logs::v1::ScopeLogs {
                log_records: vec![proto::logs::v1::LogRecord::default()],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    assert!(exporter.consume_logs(&logs).is_ok());
    assert!(exporter.client().calls().is_empty());
}

#[test]
fn test_connector_feeds_exporter() {
    let client = InMemoryWireClient::new_shared();
    let exporter = LoggregatorExporter::new(client.clone(), SourceInfo::default());
    let connector = LogMetricsConnector::new(exporter);

    let bodies = [
        serde_json::json!({"type": "counter", "name": "jobs_done", "delta": 4}),
        serde_json::json!({"type": "event", "name": "deploy"}),
        serde_json::json!({"type": "gauge", "name": "queue_depth", "value": 12}),
    ];
    let logs = LogBatch {
        resource_logs: vec![proto::logs::v1::ResourceLogs {
            scope_logs: vec![proto::logs::v1::ScopeLogs {
                log_records: bodies
                    .iter()
                    .map(|body| proto::logs::v1::LogRecord {
                        body: Some(proto::common::v1::AnyValue {
                            value: Some(proto::common::v1::any_value::Value::StringValue(
                                body.to_string(),
                            )),
                        }),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    connector.consume_logs(&logs).unwrap();

    assert_eq!(
        client.calls(),
        vec![
            counter_call("jobs_done", 4),
            WireCall::Gauge {
                name: "queue_depth".to_string(),
                value: 12.0,
                unit: String::new(),
                source: SourceInfo::default(),
            },
        ]
    );
}
