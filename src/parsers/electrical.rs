//! Parser for electrical resistivity survey data.

use std::path::PathBuf;

use polars::prelude::DataFrame;
use tracing::info;

use crate::config::variant_config;
use crate::constants::{columns, metadata_keys};
use crate::error::{GeoError, Result};
use crate::models::{DataType, MetaValue, ParsedDataset};

use super::{
    GeoParser, ParserCore, Stage, apply_column_aliases, check_required_columns,
    check_value_ranges, column_min_max, count_negative, count_non_positive, distinct_count,
    read_table,
};

/// Alias table for electrical resistivity exports (lowercased alias to
/// canonical name). Matching is case-insensitive.
const ALIASES: &[(&str, &str)] = &[
    ("station", columns::STATION_ID),
    ("station_id", columns::STATION_ID),
    ("depth", columns::DEPTH_M),
    ("depth_m", columns::DEPTH_M),
    ("resistance", columns::RESISTIVITY_OHM_M),
    ("resistivity", columns::RESISTIVITY_OHM_M),
    ("resistivity_ohm_m", columns::RESISTIVITY_OHM_M),
    ("current", columns::CURRENT_MA),
    ("current_ma", columns::CURRENT_MA),
    ("voltage", columns::VOLTAGE_MV),
    ("voltage_mv", columns::VOLTAGE_MV),
];

/// Parser for electrical resistivity data.
///
/// Canonical columns: `station_id`, `depth_m`, `resistivity_ohm_m`, plus
/// optional `current_ma` and `voltage_mv`.
#[derive(Debug)]
pub struct ElectricalParser {
    core: ParserCore,
}

impl ElectricalParser {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            core: ParserCore::new(path)?,
        })
    }
}

impl GeoParser for ElectricalParser {
    fn data_type(&self) -> DataType {
        DataType::Electrical
    }

    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }

    fn parse(&mut self) -> Result<ParsedDataset> {
        if self.core.stage() >= Stage::Parsed {
            return self
                .dataset()
                .ok_or_else(|| GeoError::parse(self.data_type().tag(), "parsed table missing"));
        }

        let raw = self.core.require_loaded(DataType::Electrical)?;
        let mut df = read_table(raw)
            .map_err(|e| GeoError::parse(DataType::Electrical.tag(), e.to_string()))?;
        apply_column_aliases(&mut df, ALIASES)?;

        let stations = distinct_count(&df, columns::STATION_ID)?;
        let depth_range = column_min_max(&df, columns::DEPTH_M)?;
        let resistivity_range = column_min_max(&df, columns::RESISTIVITY_OHM_M)?;

        let metadata = &mut self.core.metadata;
        metadata.insert(
            metadata_keys::DATA_TYPE.to_string(),
            MetaValue::from(DataType::Electrical.parsed_tag()),
        );
        metadata.insert("stations".to_string(), MetaValue::from(stations));
        metadata.insert(
            "depth_range_m".to_string(),
            MetaValue::pair_or_null(depth_range),
        );
        metadata.insert(
            "resistivity_range_ohm_m".to_string(),
            MetaValue::pair_or_null(resistivity_range),
        );

        info!(
            "Parsed {} records from {}",
            df.height(),
            self.core.file_name()
        );
        Ok(self.core.finish_parse(df))
    }

    fn validate(&mut self, table: Option<&DataFrame>) -> Result<()> {
        if table.is_none() && self.core.stage() >= Stage::Validated {
            return Ok(());
        }

        let config = variant_config(DataType::Electrical);
        let data = self.core.table_for_validation(table)?;

        check_required_columns(data, config.required_columns)?;
        check_value_ranges(data, config.value_ranges)?;

        if count_negative(data, columns::DEPTH_M)? > 0 {
            return Err(GeoError::validation("depth values cannot be negative"));
        }
        if count_non_positive(data, columns::RESISTIVITY_OHM_M)? > 0 {
            return Err(GeoError::validation("resistivity values must be positive"));
        }

        self.core.mark_validated();
        info!("Validation passed for electrical data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::models::MetaValue;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SAMPLE: &str = "station_id,depth_m,resistivity_ohm_m\n\
                          S001,0.5,150.2\n\
                          S001,1.0,145.8\n\
                          S002,0.5,220.1\n";

    #[test]
    fn parses_sample_survey() {
        let file = write_csv(SAMPLE);
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        let dataset = parser.process(true).unwrap();

        assert_eq!(dataset.record_count(), 3);
        assert_eq!(dataset.metadata["stations"], MetaValue::Int(2));
        assert_eq!(dataset.metadata["depth_range_m"], MetaValue::Pair(0.5, 1.0));
        assert_eq!(
            dataset.metadata["resistivity_range_ohm_m"],
            MetaValue::Pair(145.8, 220.1)
        );
        assert_eq!(
            dataset.metadata["data_type"],
            MetaValue::from("electrical_resistivity")
        );
    }

    #[test]
    fn validation_passes_for_sample_survey() {
        let file = write_csv(SAMPLE);
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        parser.process(false).unwrap();
        assert_eq!(parser.core().stage(), Stage::Validated);
    }

    #[test]
    fn alias_variants_yield_identical_canonical_table() {
        let plain = write_csv(SAMPLE);
        let aliased = write_csv(
            "Station,DEPTH,Resistivity\n\
             S001,0.5,150.2\n\
             S001,1.0,145.8\n\
             S002,0.5,220.1\n",
        );

        let mut a = ElectricalParser::new(plain.path()).unwrap();
        let mut b = ElectricalParser::new(aliased.path()).unwrap();
        let left = a.process(true).unwrap();
        let right = b.process(true).unwrap();

        assert!(left.table.equals(&right.table));
    }

    #[test]
    fn missing_required_columns_names_all_of_them() {
        let file = write_csv("col1,col2\n1,2\n3,4\n");
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        parser.load().unwrap();
        parser.parse().unwrap();

        let err = parser.validate(None).unwrap_err();
        assert!(matches!(err, GeoError::Validation { .. }));
        let message = err.to_string();
        assert!(message.contains("station_id"));
        assert!(message.contains("depth_m"));
        assert!(message.contains("resistivity_ohm_m"));
        // Failed validation leaves the stage at parsed.
        assert_eq!(parser.core().stage(), Stage::Parsed);
    }

    #[test]
    fn validate_before_parse_is_a_validation_error() {
        let file = write_csv(SAMPLE);
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        let err = parser.validate(None).unwrap_err();
        assert!(matches!(err, GeoError::Validation { .. }));
    }

    #[test]
    fn parse_before_load_is_a_parse_error() {
        let file = write_csv(SAMPLE);
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        let err = parser.parse().unwrap_err();
        assert!(matches!(err, GeoError::Parse { .. }));
    }

    #[test]
    fn non_positive_resistivity_fails_validation() {
        let file = write_csv(
            "station_id,depth_m,resistivity_ohm_m\n\
             S001,0.5,150.2\n\
             S002,1.0,0.0\n",
        );
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        parser.load().unwrap();
        parser.parse().unwrap();
        let err = parser.validate(None).unwrap_err();
        // 0.0 is below the 0.001 range minimum, so the range check trips first.
        assert!(matches!(err, GeoError::Validation { .. }));
    }

    #[test]
    fn process_is_idempotent() {
        let file = write_csv(SAMPLE);
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        let first = parser.process(false).unwrap();
        let second = parser.process(false).unwrap();

        assert!(first.table.equals(&second.table));
        assert_eq!(first.metadata, second.metadata);
    }

    #[test]
    fn save_data_requires_a_parsed_table() {
        use crate::standardize::OutputFormat;

        let file = write_csv(SAMPLE);
        let parser = ElectricalParser::new(file.path()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = parser
            .save_data(&dir.path().join("out.json"), OutputFormat::Json)
            .unwrap_err();
        assert!(matches!(err, GeoError::Parse { .. }));
    }

    #[test]
    fn save_data_writes_the_parsed_table() {
        use crate::standardize::OutputFormat;

        let file = write_csv(SAMPLE);
        let mut parser = ElectricalParser::new(file.path()).unwrap();
        parser.process(true).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parsed").join("survey.json");
        parser.save_data(&path, OutputFormat::Json).unwrap();

        let rows: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 3);
        assert_eq!(rows[0]["station_id"], serde_json::json!("S001"));
        assert_eq!(rows[0]["depth_m"], serde_json::json!(0.5));
    }

    #[test]
    fn summary_tracks_stage_and_table_shape() {
        let file = write_csv(SAMPLE);
        let mut parser = ElectricalParser::new(file.path()).unwrap();

        let before = parser.summary();
        assert_eq!(before["stage"], MetaValue::from("unloaded"));
        assert!(!before.contains_key("row_count"));

        parser.process(true).unwrap();
        let after = parser.summary();
        assert_eq!(after["stage"], MetaValue::from("parsed"));
        assert_eq!(after["row_count"], MetaValue::Int(3));
        assert_eq!(after["column_count"], MetaValue::Int(3));
    }

    #[test]
    fn construction_rejects_missing_and_empty_files() {
        let err = ElectricalParser::new("/nonexistent/input.csv").unwrap_err();
        assert!(matches!(err, GeoError::FileNotFound { .. }));

        let empty = NamedTempFile::with_suffix(".csv").unwrap();
        let err = ElectricalParser::new(empty.path()).unwrap_err();
        assert!(matches!(err, GeoError::EmptyFile { .. }));
    }
}
