//! Conversions from OTLP protobuf values into the forms the pipeline stages read.
//!
//! The traversal helpers walk a batch in resource → scope → record order and
//! never reorder records, so every consumer built on them emits downstream
//! calls in batch order.

use crate::models::{MetricShape, NumberValue, Temporality};
use crate::otlp::{proto, LogBatch, MetricBatch};

/// Converts OTLP `AnyValue` to `serde_json::Value`.
pub fn any_value_to_json(value: &proto::common::v1::AnyValue) -> serde_json::Value {
    use proto::common::v1::any_value::Value;

    match &value.value {
        Some(Value::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Value::BoolValue(b)) => serde_json::Value::Bool(*b),
        Some(Value::IntValue(i)) => serde_json::Value::Number((*i).into()),
        Some(Value::DoubleValue(d)) => double_to_json(*d),
        Some(Value::ArrayValue(arr)) => {
            let values: Vec<serde_json::Value> = arr.values.iter().map(any_value_to_json).collect();
            serde_json::Value::Array(values)
        }
        Some(Value::KvlistValue(kv)) => {
            let mut map = serde_json::Map::new();
            for pair in &kv.values {
                if let Some(ref v) = pair.value {
                    map.insert(pair.key.clone(), any_value_to_json(v));
                }
            }
            serde_json::Value::Object(map)
        }
        Some(Value::BytesValue(b)) => serde_json::Value::String(encode_bytes(b)),
        None => serde_json::Value::Null,
    }
}

/// Whole-number doubles are written without a fractional part, so `7.0`
/// renders as `7` and still reads back as an integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn double_to_json(d: f64) -> serde_json::Value {
    if d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 {
        return serde_json::Value::Number((d as i64).into());
    }
    serde_json::Number::from_f64(d).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

fn encode_bytes(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Renders an OTLP `AnyValue` as text.
///
/// Strings are returned as-is, scalars in their plain textual form, arrays
/// and key-value lists as compact JSON, bytes as standard base64, and an
/// empty value as the empty string.
#[must_use]
pub fn any_value_to_string(value: &proto::common::v1::AnyValue) -> String {
    use proto::common::v1::any_value::Value;

    match &value.value {
        Some(Value::StringValue(s)) => s.clone(),
        Some(Value::BoolValue(b)) => b.to_string(),
        Some(Value::IntValue(i)) => i.to_string(),
        Some(Value::DoubleValue(d)) => d.to_string(),
        Some(Value::BytesValue(b)) => encode_bytes(b),
        Some(Value::ArrayValue(_) | Value::KvlistValue(_)) => {
            serde_json::to_string(&any_value_to_json(value)).unwrap_or_default()
        }
        None => String::new(),
    }
}

/// Returns the body of a log record rendered as text.
#[must_use]
pub fn log_body_text(log_record: &proto::logs::v1::LogRecord) -> String {
    log_record
        .body
        .as_ref()
        .map(any_value_to_string)
        .unwrap_or_default()
}

/// Iterates over every log record of a batch in resource → scope → record order.
pub fn log_records(batch: &LogBatch) -> impl Iterator<Item = &proto::logs::v1::LogRecord> {
    batch
        .resource_logs
        .iter()
        .flat_map(|rl| rl.scope_logs.iter())
        .flat_map(|sl| sl.log_records.iter())
}

/// Iterates over every metric of a batch in resource → scope → metric order.
pub fn metrics(batch: &MetricBatch) -> impl Iterator<Item = &proto::metrics::v1::Metric> {
    batch
        .resource_metrics
        .iter()
        .flat_map(|rm| rm.scope_metrics.iter())
        .flat_map(|sm| sm.metrics.iter())
}

/// Returns the number of log records across all groups of a batch.
#[must_use]
pub fn log_record_count(batch: &LogBatch) -> usize {
    log_records(batch).count()
}

/// Returns the number of metrics across all groups of a batch.
#[must_use]
pub fn metric_count(batch: &MetricBatch) -> usize {
    metrics(batch).count()
}

/// Reads the numeric value of an OTLP number data point.
///
/// Returns `None` when the data point carries no value.
#[must_use]
pub fn number_value(data_point: &proto::metrics::v1::NumberDataPoint) -> Option<NumberValue> {
    use proto::metrics::v1::number_data_point::Value;

    match &data_point.value {
        Some(Value::AsDouble(d)) => Some(NumberValue::Double(*d)),
        Some(Value::AsInt(i)) => Some(NumberValue::Int(*i)),
        None => None,
    }
}

/// Converts the OTLP aggregation temporality code to `Temporality`.
#[must_use]
pub fn temporality(code: i32) -> Temporality {
    use proto::metrics::v1::AggregationTemporality;

    match AggregationTemporality::try_from(code) {
        Ok(AggregationTemporality::Delta) => Temporality::Delta,
        Ok(AggregationTemporality::Cumulative) => Temporality::Cumulative,
        Ok(AggregationTemporality::Unspecified) | Err(_) => Temporality::Unspecified,
    }
}

/// Classifies an OTLP metric by the shape of its data.
#[must_use]
pub fn metric_shape(metric: &proto::metrics::v1::Metric) -> MetricShape {
    use proto::metrics::v1::metric::Data;

    match &metric.data {
        Some(Data::Gauge(_)) => MetricShape::Gauge,
        Some(Data::Sum(sum)) => MetricShape::Sum(temporality(sum.aggregation_temporality)),
        Some(Data::Histogram(_)) => MetricShape::Histogram,
        Some(Data::ExponentialHistogram(_)) => MetricShape::ExponentialHistogram,
        Some(Data::Summary(_)) => MetricShape::Summary,
        None => MetricShape::Empty,
    }
}

/// Returns the value of the first number data point of a gauge or sum metric.
///
/// Only the first data point is read; any further points (for example one per
/// attribute combination) are ignored. Returns `None` for other shapes, for
/// metrics without data points, and for a first point without a value.
#[must_use]
pub fn first_number_value(metric: &proto::metrics::v1::Metric) -> Option<NumberValue> {
    use proto::metrics::v1::metric::Data;

    let data_points = match &metric.data {
        Some(Data::Gauge(gauge)) => &gauge.data_points,
        Some(Data::Sum(sum)) => &sum.data_points,
        _ => return None,
    };

    data_points.first().and_then(number_value)
}


#[cfg(test)]
#[path = "conversions_test.rs"]
mod conversions_test;
