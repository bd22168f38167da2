//! Loggregator v2 wire messages.
//!
//! Hand-declared subset of `loggregator.v2` (`envelope.proto`, `ingress.proto`)
//! covering the envelopes this exporter sends. Field tags match the upstream
//! definitions so the messages are wire compatible with any v2 ingress.

use std::collections::HashMap;

/// Fully qualified path of the unary ingress RPC.
pub const SEND_PATH: &str = "/loggregator.v2.Ingress/Send";

/// A single Loggregator envelope.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Envelope {
    /// Nanoseconds since the Unix epoch.
    #[prost(int64, tag = "1")]
    pub timestamp: i64,

    /// Identifies the emitting source.
    #[prost(string, tag = "2")]
    pub source_id: String,

    /// Identifies the instance of the source.
    #[prost(string, tag = "8")]
    pub instance_id: String,

    /// Free-form tags.
    #[prost(map = "string, string", tag = "9")]
    pub tags: HashMap<String, String>,

    /// The payload.
    #[prost(oneof = "envelope::Message", tags = "5, 6")]
    pub message: Option<envelope::Message>,
}

/// Nested types of [`Envelope`].
pub mod envelope {
    /// Payload of an envelope.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Message {
        /// A counter increment.
        #[prost(message, tag = "5")]
        Counter(super::Counter),

        /// One or more gauge values.
        #[prost(message, tag = "6")]
        Gauge(super::Gauge),
    }
}

/// A monotonic counter.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Counter {
    /// Counter name.
    #[prost(string, tag = "1")]
    pub name: String,

    /// Increment since the previous envelope.
    #[prost(uint64, tag = "2")]
    pub delta: u64,

    /// Running total. Left at zero when only deltas are known.
    #[prost(uint64, tag = "3")]
    pub total: u64,
}

/// A set of named gauge values.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Gauge {
    /// Values keyed by metric name.
    #[prost(map = "string, message", tag = "1")]
    pub metrics: HashMap<String, GaugeValue>,
}

/// A single gauge value.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GaugeValue {
    /// Unit of the value.
    #[prost(string, tag = "1")]
    pub unit: String,

    /// The value.
    #[prost(double, tag = "2")]
    pub value: f64,
}

/// The request of the unary ingress RPC.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EnvelopeBatch {
    /// Envelopes in emission order.
    #[prost(message, repeated, tag = "1")]
    pub batch: Vec<Envelope>,
}

/// The (empty) response of the unary ingress RPC.
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct SendResponse {}

impl Envelope {
    /// Returns the counter payload, if any.
    #[must_use]
    pub fn counter(&self) -> Option<&Counter> {
        match &self.message {
            Some(envelope::Message::Counter(counter)) => Some(counter),
            _ => None,
        }
    }

    /// Returns the gauge payload, if any.
    #[must_use]
    pub fn gauge(&self) -> Option<&Gauge> {
        match &self.message {
            Some(envelope::Message::Gauge(gauge)) => Some(gauge),
            _ => None,
        }
    }
}
