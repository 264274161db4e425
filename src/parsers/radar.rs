//! Parser for ground-penetrating radar (GPR) survey data.
//!
//! Binary formats (DZT, RD3) are out of scope; only delimited-text exports
//! are parsed.

use std::path::PathBuf;

use polars::prelude::DataFrame;
use tracing::info;

use crate::config::variant_config;
use crate::constants::{columns, metadata_keys};
use crate::error::{GeoError, Result};
use crate::models::{DataType, MetaValue, ParsedDataset};

use super::{
    GeoParser, ParserCore, Stage, apply_column_aliases, check_required_columns,
    check_value_ranges, column_min_max, count_negative, distinct_count, read_table,
};

const ALIASES: &[(&str, &str)] = &[
    ("trace", columns::TRACE_NUMBER),
    ("trace_number", columns::TRACE_NUMBER),
    ("sample", columns::SAMPLE_NUMBER),
    ("sample_number", columns::SAMPLE_NUMBER),
    ("amp", columns::AMPLITUDE),
    ("amplitude", columns::AMPLITUDE),
    ("distance", columns::DISTANCE_M),
    ("distance_m", columns::DISTANCE_M),
    ("time", columns::TIME_NS),
    ("time_ns", columns::TIME_NS),
    ("frequency", columns::ANTENNA_FREQ_MHZ),
    ("freq", columns::ANTENNA_FREQ_MHZ),
    ("antenna_frequency", columns::ANTENNA_FREQ_MHZ),
    ("antenna_freq_mhz", columns::ANTENNA_FREQ_MHZ),
];

/// Parser for GPR data.
///
/// Canonical columns: `trace_number`, `sample_number`, `amplitude`, plus
/// optional `distance_m`, `time_ns`, and `antenna_freq_mhz`.
#[derive(Debug)]
pub struct RadarParser {
    core: ParserCore,
}

impl RadarParser {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            core: ParserCore::new(path)?,
        })
    }
}

impl GeoParser for RadarParser {
    fn data_type(&self) -> DataType {
        DataType::Radar
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

        let raw = self.core.require_loaded(DataType::Radar)?;
        let mut df =
            read_table(raw).map_err(|e| GeoError::parse(DataType::Radar.tag(), e.to_string()))?;
        apply_column_aliases(&mut df, ALIASES)?;

        let traces = distinct_count(&df, columns::TRACE_NUMBER)?;
        let samples_per_trace = distinct_count(&df, columns::SAMPLE_NUMBER)?;
        let amplitude_range = column_min_max(&df, columns::AMPLITUDE)?;
        let distance_range = column_min_max(&df, columns::DISTANCE_M)?;

        let metadata = &mut self.core.metadata;
        metadata.insert(
            metadata_keys::DATA_TYPE.to_string(),
            MetaValue::from(DataType::Radar.parsed_tag()),
        );
        metadata.insert("traces".to_string(), MetaValue::from(traces));
        metadata.insert(
            "samples_per_trace".to_string(),
            MetaValue::from(samples_per_trace),
        );
        metadata.insert(
            "amplitude_range".to_string(),
            MetaValue::pair_or_null(amplitude_range),
        );
        metadata.insert(
            "distance_range_m".to_string(),
            MetaValue::pair_or_null(distance_range),
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

        let config = variant_config(DataType::Radar);
        let data = self.core.table_for_validation(table)?;

        check_required_columns(data, config.required_columns)?;
        check_value_ranges(data, config.value_ranges)?;

        if count_negative(data, columns::SAMPLE_NUMBER)? > 0 {
            return Err(GeoError::validation("sample numbers cannot be negative"));
        }

        self.core.mark_validated();
        info!("Validation passed for GPR data");
        Ok(())
    }
}
