//! Parser for seismic survey data.
//!
//! Binary formats (SEG-Y, SEG-2) are out of scope; only delimited-text
//! exports are parsed.

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
    ("time", columns::TIME_MS),
    ("time_ms", columns::TIME_MS),
    ("amp", columns::AMPLITUDE),
    ("amplitude", columns::AMPLITUDE),
    ("station", columns::STATION_ID),
    ("station_id", columns::STATION_ID),
    ("offset", columns::OFFSET_M),
    ("offset_m", columns::OFFSET_M),
];

/// Parser for seismic data.
///
/// Canonical columns: `trace_number`, `time_ms`, `amplitude`, plus optional
/// `station_id` and `offset_m`.
#[derive(Debug)]
pub struct SeismicParser {
    core: ParserCore,
}

impl SeismicParser {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            core: ParserCore::new(path)?,
        })
    }
}

impl GeoParser for SeismicParser {
    fn data_type(&self) -> DataType {
        DataType::Seismic
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

        let raw = self.core.require_loaded(DataType::Seismic)?;
        let mut df =
            read_table(raw).map_err(|e| GeoError::parse(DataType::Seismic.tag(), e.to_string()))?;
        apply_column_aliases(&mut df, ALIASES)?;

        let traces = distinct_count(&df, columns::TRACE_NUMBER)?;
        let time_range = column_min_max(&df, columns::TIME_MS)?;
        let amplitude_range = column_min_max(&df, columns::AMPLITUDE)?;

        let metadata = &mut self.core.metadata;
        metadata.insert(
            metadata_keys::DATA_TYPE.to_string(),
            MetaValue::from(DataType::Seismic.parsed_tag()),
        );
        metadata.insert("traces".to_string(), MetaValue::from(traces));
        metadata.insert(
            "time_range_ms".to_string(),
            MetaValue::pair_or_null(time_range),
        );
        metadata.insert(
            "amplitude_range".to_string(),
            MetaValue::pair_or_null(amplitude_range),
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

        let config = variant_config(DataType::Seismic);
        let data = self.core.table_for_validation(table)?;

        check_required_columns(data, config.required_columns)?;
        check_value_ranges(data, config.value_ranges)?;

        if count_negative(data, columns::TIME_MS)? > 0 {
            return Err(GeoError::validation("time values cannot be negative"));
        }

        self.core.mark_validated();
        info!("Validation passed for seismic data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn parses_aliased_columns_and_computes_metadata() {
        let file = write_csv(
            "Trace,TIME,amp,Offset\n\
             1,0.0,0.12,10.0\n\
             1,2.0,-0.40,10.0\n\
             2,0.0,0.33,20.0\n",
        );
        let mut parser = SeismicParser::new(file.path()).unwrap();
        let dataset = parser.process(false).unwrap();

        assert!(dataset.table.column("trace_number").is_ok());
        assert!(dataset.table.column("time_ms").is_ok());
        assert!(dataset.table.column("amplitude").is_ok());
        assert_eq!(dataset.metadata["traces"], MetaValue::Int(2));
        assert_eq!(dataset.metadata["time_range_ms"], MetaValue::Pair(0.0, 2.0));
        assert_eq!(
            dataset.metadata["amplitude_range"],
            MetaValue::Pair(-0.40, 0.33)
        );
    }

    #[test]
    fn negative_time_fails_validation() {
        let file = write_csv(
            "trace_number,time_ms,amplitude\n\
             1,-1.0,0.5\n",
        );
        let mut parser = SeismicParser::new(file.path()).unwrap();
        parser.load().unwrap();
        parser.parse().unwrap();
        let err = parser.validate(None).unwrap_err();
        assert!(matches!(err, GeoError::Validation { .. }));
    }

    #[test]
    fn amplitude_range_bound_is_inclusive() {
        let file = write_csv(
            "trace_number,time_ms,amplitude\n\
             1,0.0,1000000.0\n",
        );
        let mut parser = SeismicParser::new(file.path()).unwrap();
        parser.load().unwrap();
        parser.parse().unwrap();
        assert!(parser.validate(None).is_ok());

        let file = write_csv(
            "trace_number,time_ms,amplitude\n\
             1,0.0,1000001.0\n",
        );
        let mut parser = SeismicParser::new(file.path()).unwrap();
        parser.load().unwrap();
        parser.parse().unwrap();
        assert!(parser.validate(None).is_err());
    }
}
