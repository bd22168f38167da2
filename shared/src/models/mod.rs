//! Data models for the Signalbridge transcoding pipeline.
//!
//! This module contains the metric description carried in log bodies and the
//! metric shapes read from and written to OTLP batches.

pub mod log_metric;
pub mod metric;

pub use log_metric::{LogMetric, LogMetricKind};
pub use metric::{MetricShape, NumberValue, SynthesizedMetric, SynthesizedShape, Temporality};
