//! Metric descriptions embedded in log bodies.
//!
//! Applications that cannot emit metrics directly can write one JSON object
//! per log line instead:
//!
//! ```json
//! {"type": "counter", "name": "jobs_done", "delta": 1, "tags": {"queue": "mail"}}
//! ```
//!
//! `LogMetric` is the decoded form of that object.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Kind of metric described by a log body.
///
/// The wire literal is case-sensitive. Anything other than `counter`, `gauge`
/// or `event` is kept verbatim in [`LogMetricKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum LogMetricKind {
    /// A monotonic counter increment, read from `delta`.
    Counter,
    /// An instantaneous value, read from `value`.
    Gauge,
    /// A discrete event. Recognized but not translated.
    Event,
    /// Any other literal, including the empty string of a missing `type`.
    Unknown(String),
}

impl From<String> for LogMetricKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "counter" => Self::Counter,
            "gauge" => Self::Gauge,
            "event" => Self::Event,
            _ => Self::Unknown(kind),
        }
    }
}

impl Default for LogMetricKind {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl std::fmt::Display for LogMetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Counter => write!(f, "counter"),
            Self::Gauge => write!(f, "gauge"),
            Self::Event => write!(f, "event"),
            Self::Unknown(kind) => write!(f, "{kind}"),
        }
    }
}

/// A metric description decoded from a log body.
///
/// Keys are matched exactly first and then ignoring ASCII case, so `"Delta"`
/// fills `delta` when no `"delta"` key is present. A repeated key keeps its
/// last value. Missing fields and fields set to `null` take their zero value.
/// Unknown fields are ignored.
///
/// # Example
///
/// ```
/// use shared::models::{LogMetric, LogMetricKind};
///
/// let metric = LogMetric::parse(r#"{"type": "gauge", "name": "queue_depth", "value": 11}"#).unwrap();
///
/// assert_eq!(metric.kind, LogMetricKind::Gauge);
/// assert_eq!(metric.name, "queue_depth");
/// assert_eq!(metric.value, 11);
/// assert_eq!(metric.delta, 0);
/// assert!(metric.tags.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMetric {
    /// The kind of metric, from the `type` field.
    pub kind: LogMetricKind,

    /// The metric name.
    pub name: String,

    /// The instantaneous value of a gauge.
    pub value: i64,

    /// The increment of a counter.
    pub delta: i64,

    /// Dimensions attached to the metric.
    pub tags: HashMap<String, String>,
}

impl LogMetric {
    /// Decodes a metric description from the text of a log body.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object or a field has the
    /// wrong type (for example a fractional `delta` or a numeric tag value).
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(body)?;

        Ok(Self {
            kind: field(&fields, "type")?,
            name: field(&fields, "name")?,
            value: field(&fields, "value")?,
            delta: field(&fields, "delta")?,
            tags: field(&fields, "tags")?,
        })
    }
}

fn field<T>(fields: &Map<String, Value>, key: &str) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    let value = fields.get(key).or_else(|| {
        fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    });

    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => T::deserialize(value),
    }
}
