//! Metric data model.
//!
//! Defines the shapes the pipeline reads out of OTLP metrics and the
//! `SynthesizedMetric` built from a decoded log body.

use crate::otlp::{proto, MetricBatch};
use std::collections::HashMap;

/// Aggregation temporality of a sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Temporality {
    /// No temporality was declared.
    #[default]
    Unspecified,
    /// Each value is the change since the previous report.
    Delta,
    /// Each value is the running total since the start of the series.
    Cumulative,
}

impl std::fmt::Display for Temporality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified"),
            Self::Delta => write!(f, "delta"),
            Self::Cumulative => write!(f, "cumulative"),
        }
    }
}

/// Shape of an OTLP metric, as far as the exporters care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricShape {
    /// An instantaneous value.
    Gauge,
    /// A sum with its declared temporality.
    Sum(Temporality),
    /// An explicit-bucket histogram.
    Histogram,
    /// An exponential histogram.
    ExponentialHistogram,
    /// A summary.
    Summary,
    /// A metric without data.
    Empty,
}

impl std::fmt::Display for MetricShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Sum(_) => write!(f, "sum"),
            Self::Histogram => write!(f, "histogram"),
            Self::ExponentialHistogram => write!(f, "exponential_histogram"),
            Self::Summary => write!(f, "summary"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// The value of a number data point in its stored representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    /// Stored as a signed 64-bit integer.
    Int(i64),
    /// Stored as a 64-bit float.
    Double(f64),
}

impl NumberValue {
    /// Returns the value as a float, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Double(d) => d,
        }
    }

    /// Returns the value as a non-negative delta magnitude.
    ///
    /// Floats are truncated toward zero. Negative values and `NaN` become `0`,
    /// floats above `u64::MAX` saturate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_delta(self) -> u64 {
        match self {
            Self::Int(i) => u64::try_from(i).unwrap_or(0),
            Self::Double(d) => d as u64,
        }
    }
}

/// Shape of a metric synthesized from a log body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynthesizedShape {
    /// A sum with delta temporality, from a `counter` body.
    DeltaSum,
    /// A gauge, from a `gauge` body.
    Gauge,
}

/// A single-value metric synthesized from a log body.
///
/// # Example
///
/// ```
/// use shared::models::{SynthesizedMetric, SynthesizedShape};
///
/// let metric = SynthesizedMetric::new("jobs_done", SynthesizedShape::DeltaSum, 7);
/// let batch = metric.to_batch();
///
/// assert_eq!(batch.resource_metrics.len(), 1);
/// assert_eq!(batch.resource_metrics[0].scope_metrics[0].metrics[0].name, "jobs_done");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedMetric {
    /// The metric name.
    pub name: String,

    /// Sum or gauge.
    pub shape: SynthesizedShape,

    /// The single data point value.
    pub value: i64,

    /// Tags decoded from the log body.
    ///
    /// Not yet written onto the data point attributes of [`Self::to_batch`];
    /// kept here so the gap is visible to callers.
    pub unwired_tags: HashMap<String, String>,
}

impl SynthesizedMetric {
    /// Creates a new synthesized metric without tags.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: SynthesizedShape, value: i64) -> Self {
        Self {
            name: name.into(),
            shape,
            value,
            unwired_tags: HashMap::new(),
        }
    }

    /// Attaches the decoded tags.
    #[must_use]
    pub fn with_unwired_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.unwired_tags = tags;
        self
    }

    /// Builds the OTLP metric with its single integer data point.
    #[must_use]
    pub fn to_otlp(&self) -> proto::metrics::v1::Metric {
        use proto::metrics::v1::{metric::Data, number_data_point, Gauge, NumberDataPoint, Sum};

        let data_points = vec![NumberDataPoint {
            value: Some(number_data_point::Value::AsInt(self.value)),
            ..Default::default()
        }];

        let data = match self.shape {
            SynthesizedShape::DeltaSum => Data::Sum(Sum {
                data_points,
                aggregation_temporality: proto::metrics::v1::AggregationTemporality::Delta as i32,
                ..Default::default()
            }),
            SynthesizedShape::Gauge => Data::Gauge(Gauge {
                data_points,
                ..Default::default()
            }),
        };

        proto::metrics::v1::Metric {
            name: self.name.clone(),
            data: Some(data),
            ..Default::default()
        }
    }

    /// Builds a fresh batch holding exactly one resource group, one scope
    /// group and this metric.
    #[must_use]
    pub fn to_batch(&self) -> MetricBatch {
        use proto::metrics::v1::{ResourceMetrics, ScopeMetrics};

        MetricBatch {
            resource_metrics: vec![ResourceMetrics {
                scope_metrics: vec![ScopeMetrics {
                    metrics: vec![self.to_otlp()],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }
}
