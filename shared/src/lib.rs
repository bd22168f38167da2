//! Signalbridge Shared Library
//!
//! This crate contains the signal data model, consumer traits, and value
//! conversions shared by the log-to-metrics connector and the Loggregator
//! exporter.
//!
//! # Modules
//!
//! - [`otlp`] - OTLP batch types and conversions from OTLP values
//! - [`models`] - Metric descriptions decoded from logs and metrics synthesized from them
//! - [`consumer`] - The consumer traits that connect pipeline stages
//!
//! # Example
//!
//! ```
//! use shared::models::{LogMetric, LogMetricKind};
//!
//! let metric = LogMetric::parse(r#"{"type": "counter", "name": "jobs", "delta": 3}"#).unwrap();
//!
//! assert_eq!(metric.kind, LogMetricKind::Counter);
//! assert_eq!(metric.delta, 3);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod consumer;
pub mod models;
pub mod otlp;

/// Re-export common dependencies for convenience.
pub use serde;
pub use serde_json;
