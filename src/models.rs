//! Core value types flowing through the standardization pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use polars::prelude::DataFrame;
use serde::Serialize;

use crate::error::GeoError;

/// The three geophysical data kinds handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Electrical,
    Seismic,
    Radar,
}

impl DataType {
    /// Short lowercase tag used by the dispatcher registry and the CLI.
    pub fn tag(&self) -> &'static str {
        match self {
            DataType::Electrical => "electrical",
            DataType::Seismic => "seismic",
            DataType::Radar => "radar",
        }
    }

    /// Descriptive tag written into metadata by the parser.
    pub fn parsed_tag(&self) -> &'static str {
        match self {
            DataType::Electrical => "electrical_resistivity",
            DataType::Seismic => "seismic",
            DataType::Radar => "radar",
        }
    }

    pub const ALL: &'static [DataType] =
        &[DataType::Electrical, DataType::Seismic, DataType::Radar];
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DataType {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "electrical" => Ok(DataType::Electrical),
            "seismic" => Ok(DataType::Seismic),
            "radar" => Ok(DataType::Radar),
            other => Err(GeoError::UnknownDataType {
                given: other.to_string(),
                available: "electrical, seismic, radar".to_string(),
            }),
        }
    }
}

/// A metadata value.
///
/// A small tagged union keeps sidecar serialization total: every variant has
/// an unambiguous JSON representation, so export never needs to sniff types.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    /// A (min, max) style pair, serialized as a two-element array.
    Pair(f64, f64),
    Map(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            MetaValue::Null => serde_json::Value::Null,
            MetaValue::Int(v) => serde_json::Value::from(*v),
            MetaValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            MetaValue::Str(v) => serde_json::Value::String(v.clone()),
            MetaValue::Pair(lo, hi) => serde_json::Value::Array(vec![
                MetaValue::Float(*lo).to_json(),
                MetaValue::Float(*hi).to_json(),
            ]),
            MetaValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Build a pair from optional bounds, falling back to `Null` when the
    /// source column was absent.
    pub fn pair_or_null(range: Option<(f64, f64)>) -> Self {
        match range {
            Some((lo, hi)) => MetaValue::Pair(lo, hi),
            None => MetaValue::Null,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Str(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Str(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        MetaValue::Int(value as i64)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

/// Metadata accompanying a dataset through the pipeline. Keys are only ever
/// added (or overwritten), never removed.
pub type Metadata = BTreeMap<String, MetaValue>;

/// The central value object produced by parsing and consumed by QC and
/// standardization. Each stage clones the table before mutating, so datasets
/// never alias across stages.
#[derive(Debug, Clone)]
pub struct ParsedDataset {
    pub metadata: Metadata,
    pub table: DataFrame,
}

impl ParsedDataset {
    pub fn new(metadata: Metadata, table: DataFrame) -> Self {
        Self { metadata, table }
    }

    pub fn record_count(&self) -> usize {
        self.table.height()
    }
}

/// Aggregated result of a quality control run.
///
/// QC findings are data, not errors: `issues` are blocking-worthy, `warnings`
/// are informational, and the caller decides whether to halt.
#[derive(Debug, Clone, Serialize)]
pub struct QcReport {
    /// True iff no issues were found. Warnings never affect this.
    pub passed: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    /// Names of the checks that ran, in fixed order regardless of outcome.
    pub checks_run: Vec<String>,
    pub summary: QcSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct QcSummary {
    pub total_records: usize,
    pub total_columns: usize,
    pub issues_found: usize,
    pub warnings_found: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_tags_round_trip() {
        for dt in DataType::ALL {
            assert_eq!(dt.tag().parse::<DataType>().unwrap(), *dt);
        }
        assert_eq!("ELECTRICAL".parse::<DataType>().unwrap(), DataType::Electrical);
        assert!("sonar".parse::<DataType>().is_err());
    }

    #[test]
    fn meta_value_json_is_total() {
        assert_eq!(MetaValue::Null.to_json(), serde_json::Value::Null);
        assert_eq!(MetaValue::Int(3).to_json(), serde_json::json!(3));
        assert_eq!(MetaValue::from("radar").to_json(), serde_json::json!("radar"));
        assert_eq!(
            MetaValue::Pair(0.5, 1.0).to_json(),
            serde_json::json!([0.5, 1.0])
        );
        // Non-finite floats have no JSON representation and degrade to null.
        assert_eq!(MetaValue::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn pair_or_null_handles_absent_columns() {
        assert_eq!(
            MetaValue::pair_or_null(Some((1.0, 2.0))),
            MetaValue::Pair(1.0, 2.0)
        );
        assert_eq!(MetaValue::pair_or_null(None), MetaValue::Null);
    }
}
