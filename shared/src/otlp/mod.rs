//! OpenTelemetry Protocol (OTLP) support.
//!
//! This module re-exports the OTLP protobuf types and names the batch shapes
//! the pipeline stages hand to each other.
//!
//! # Example
//!
//! ```
//! use shared::otlp::{proto, LogBatch};
//!
//! let batch = LogBatch {
//!     resource_logs: vec![proto::logs::v1::ResourceLogs::default()],
//! };
//! assert_eq!(shared::otlp::conversions::log_record_count(&batch), 0);
//! ```

pub mod conversions;

/// Generated protobuf types from the OTLP definitions.
pub use opentelemetry_proto::tonic as proto;

/// A batch of logs: resource groups, each owning scope groups, each owning log records.
pub type LogBatch = proto::collector::logs::v1::ExportLogsServiceRequest;

/// A batch of metrics: resource groups, each owning scope groups, each owning metrics.
pub type MetricBatch = proto::collector::metrics::v1::ExportMetricsServiceRequest;
