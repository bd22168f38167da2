//! Signalbridge Log-to-Metrics Connector
//!
//! This crate turns log records whose body is a JSON metric description into
//! metrics. Each qualifying record becomes its own one-metric batch, handed
//! to the downstream [`MetricsConsumer`](shared::consumer::MetricsConsumer).
//!
//! # Example
//!
//! ```
//! use logmetrics_connector::LogMetricsConnector;
//! use shared::consumer::{InMemoryMetricsConsumer, LogsConsumer};
//! use shared::otlp::{proto, LogBatch};
//!
//! let sink = InMemoryMetricsConsumer::new_shared();
//! let connector = LogMetricsConnector::new(sink.clone());
//!
//! let record = proto::logs::v1::LogRecord {
//!     body: Some(proto::common::v1::AnyValue {
//!         value: Some(proto::common::v1::any_value::Value::StringValue(
//!             r#"{"type": "counter", "name": "jobs_done", "delta": 1}"#.to_string(),
//!         )),
//!     }),
//!     ..Default::default()
//! };
//! let logs = LogBatch {
//!     resource_logs: vec![proto::logs::v1::ResourceLogs {
//!         scope_logs: vec![proto::logs::v1::ScopeLogs {
//!             log_records: vec![record],
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//! };
//!
//! connector.consume_logs(&logs).unwrap();
//! assert_eq!(sink.count(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod connector;

pub use connector::{LogMetricsConnector, RecordOutcome, SkipReason};
