//! Field metadata for describing what the GPU tool can be queried for

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification tag published with every sample
///
/// Only types available in a stock monitoring host type database are used,
/// everything else is reported as a plain gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Percentage (0 to 100)
    Percent,
    /// Temperature in degrees Celsius
    Temperature,
    /// Generic instantaneous value
    #[default]
    Gauge,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Percent => "percent",
            MetricType::Temperature => "temperature",
            MetricType::Gauge => "gauge",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing a single queryable field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Field name as understood by `--query-gpu`
    pub id: String,
    /// Name of the converter applied to raw values, if any
    pub converter: Option<String>,
    /// Metric type the field is published as
    pub metric_type: MetricType,
}

impl FieldMetadata {
    pub fn new(id: impl Into<String>, converter: Option<&str>, metric_type: MetricType) -> Self {
        Self {
            id: id.into(),
            converter: converter.map(str::to_string),
            metric_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_default_is_gauge() {
        assert_eq!(MetricType::default(), MetricType::Gauge);
    }

    #[test]
    fn test_metric_type_serialization() {
        let json = serde_json::to_string(&MetricType::Temperature).unwrap();
        assert_eq!(json, "\"temperature\"");

        let parsed: MetricType = serde_json::from_str("\"percent\"").unwrap();
        assert_eq!(parsed, MetricType::Percent);
        assert_eq!(parsed.to_string(), "percent");
    }
}
