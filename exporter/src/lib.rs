//! Signalbridge Loggregator Exporter
//!
//! This crate forwards OTLP metrics to a Cloud Foundry Loggregator v2 ingress.
//! [`LoggregatorExporter`] reads the first data point of each gauge or sum and
//! emits it through a [`WireClient`]. The production client,
//! [`IngressClient`], queues envelopes and sends them in batches over
//! mutual-TLS gRPC.
//!
//! # Example
//!
//! ```
//! use loggregator_exporter::{InMemoryWireClient, LoggregatorExporter, SourceInfo, WireCall};
//! use shared::consumer::MetricsConsumer;
//! use shared::models::{SynthesizedMetric, SynthesizedShape};
//!
//! let exporter = LoggregatorExporter::new(InMemoryWireClient::new(), SourceInfo::default());
//!
//! let metric = SynthesizedMetric::new("jobs_done", SynthesizedShape::DeltaSum, 3);
//! exporter.consume_metrics(&metric.to_batch()).unwrap();
//!
//! assert!(matches!(
//!     exporter.client().calls().as_slice(),
//!     [WireCall::Counter { delta: 3, .. }]
//! ));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
mod exporter;
pub mod ingress;

pub use client::{ClientError, InMemoryWireClient, WireCall, WireClient};
pub use config::{Config, ConfigError, SourceInfo};
pub use error::ExporterError;
pub use exporter::LoggregatorExporter;
pub use ingress::{
    BatchSettings, EnvelopeTransport, GrpcTransport, IngressClient, IngressConnection,
};
