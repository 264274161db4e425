//! Standardization of parsed datasets into a uniform output shape.
//!
//! The standardizer normalizes a parsed table (stable column order, numeric
//! coercion, empty-row removal), stamps provenance metadata, and writes the
//! result in the requested format together with a JSON metadata sidecar.

pub mod writer;

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Utc;
use polars::prelude::*;
use polars::prelude::DataType as PlType;
use tracing::{debug, info, warn};

use crate::config::variant_config;
use crate::constants::{METADATA_FILE_SUFFIX, STANDARDIZATION_VERSION, metadata_keys};
use crate::error::{GeoError, Result};
use crate::models::{DataType, ParsedDataset};

pub use writer::OutputFormat;

/// Applies the standardization pass and writes output files.
pub struct Standardizer {
    format: OutputFormat,
}

impl Standardizer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Produce a standardized copy of the dataset. The input is never
    /// mutated; each step works on the clone.
    pub fn standardize(
        &self,
        dataset: &ParsedDataset,
        data_type: DataType,
    ) -> Result<ParsedDataset> {
        let mut table = dataset.table.clone();
        let mut metadata = dataset.metadata.clone();

        table = drop_empty_rows(table)?;
        coerce_column_types(&mut table, data_type)?;
        table = sort_columns(&table)?;

        metadata.insert(
            metadata_keys::STANDARDIZED_AT.to_string(),
            Utc::now().to_rfc3339().into(),
        );
        metadata.insert(
            metadata_keys::STANDARDIZATION_VERSION.to_string(),
            STANDARDIZATION_VERSION.into(),
        );
        metadata.insert(
            metadata_keys::DATA_TYPE.to_string(),
            data_type.tag().into(),
        );
        metadata.insert(
            metadata_keys::RECORD_COUNT.to_string(),
            table.height().into(),
        );

        info!(
            "Standardized {} dataset: {} records, {} columns",
            data_type,
            table.height(),
            table.width()
        );
        Ok(ParsedDataset::new(metadata, table))
    }

    /// Write the standardized table to `path` and, when `include_metadata`
    /// is set, its metadata to the sidecar file next to it.
    pub fn write_output(
        &self,
        dataset: &ParsedDataset,
        path: &Path,
        include_metadata: bool,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        writer::write_table(&dataset.table, path, self.format)?;
        info!("Wrote standardized data to {}", path.display());

        if include_metadata {
            let sidecar = metadata_sidecar_path(path);
            let json: serde_json::Map<String, serde_json::Value> = dataset
                .metadata
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect();
            let file = File::create(&sidecar)?;
            serde_json::to_writer_pretty(file, &serde_json::Value::Object(json)).map_err(|e| {
                GeoError::serialization(format!("metadata sidecar write failed: {e}"))
            })?;
            info!("Wrote metadata sidecar to {}", sidecar.display());
        }

        Ok(())
    }
}

/// Sidecar path for an output file: `<stem>_metadata.json` in the same
/// directory.
pub fn metadata_sidecar_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = format!("{stem}{METADATA_FILE_SUFFIX}");
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

/// Remove rows where every value is null.
fn drop_empty_rows(table: DataFrame) -> Result<DataFrame> {
    if table.height() == 0 || table.width() == 0 {
        return Ok(table);
    }

    let mut keep = BooleanChunked::full("keep".into(), false, table.height());
    for col in table.get_columns() {
        keep = &keep | &col.as_materialized_series().is_not_null();
    }

    let before = table.height();
    let filtered = table.filter(&keep)?;
    let dropped = before - filtered.height();
    if dropped > 0 {
        debug!("Dropped {dropped} fully-empty rows");
    }
    Ok(filtered)
}

/// Coerce the variant's measurement columns to Float64 and its identifier
/// string columns to String. Cast failures become nulls and are reported,
/// not fatal.
fn coerce_column_types(table: &mut DataFrame, data_type: DataType) -> Result<()> {
    let config = variant_config(data_type);

    for name in config.numeric_columns {
        let Ok(col) = table.column(name) else {
            continue;
        };
        let series = col.as_materialized_series();
        if series.dtype() == &PlType::Float64 {
            continue;
        }
        let nulls_before = series.null_count();
        let cast = series.cast(&PlType::Float64)?;
        let coerced_to_null = cast.null_count().saturating_sub(nulls_before);
        if coerced_to_null > 0 {
            warn!(
                "Column '{}': {} values could not be converted to numbers and became null",
                name, coerced_to_null
            );
        }
        table.replace(name, cast)?;
    }

    for name in config.string_columns {
        let Ok(col) = table.column(name) else {
            continue;
        };
        let series = col.as_materialized_series();
        if series.dtype() == &PlType::String {
            continue;
        }
        let cast = series.cast(&PlType::String)?;
        table.replace(name, cast)?;
    }

    Ok(())
}

/// Reorder columns alphabetically for a stable output layout.
fn sort_columns(table: &DataFrame) -> Result<DataFrame> {
    let mut names: Vec<String> = table
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    names.sort();
    Ok(table.select(names)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetaValue, Metadata};

    fn electrical_dataset() -> ParsedDataset {
        let table = df!(
            "station_id" => &["S001", "S002"],
            "depth_m" => &[0.5, 1.0],
            "resistivity_ohm_m" => &[150.2, 220.1],
        )
        .unwrap();
        let mut metadata = Metadata::new();
        metadata.insert("file_name".to_string(), "survey.csv".into());
        metadata.insert("data_type".to_string(), "electrical_resistivity".into());
        ParsedDataset::new(metadata, table)
    }

    #[test]
    fn standardize_sorts_columns_alphabetically() {
        let standardizer = Standardizer::new(OutputFormat::Csv);
        let out = standardizer
            .standardize(&electrical_dataset(), DataType::Electrical)
            .unwrap();

        let names: Vec<String> = out
            .table
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["depth_m", "resistivity_ohm_m", "station_id"]);
    }

    #[test]
    fn standardize_stamps_provenance_metadata() {
        let standardizer = Standardizer::new(OutputFormat::Csv);
        let out = standardizer
            .standardize(&electrical_dataset(), DataType::Electrical)
            .unwrap();

        assert_eq!(
            out.metadata.get("standardization_version"),
            Some(&MetaValue::from(STANDARDIZATION_VERSION))
        );
        assert!(out.metadata.contains_key("standardized_at"));
        // The parser's descriptive tag is replaced by the registry tag.
        assert_eq!(
            out.metadata.get("data_type"),
            Some(&MetaValue::from("electrical"))
        );
        assert_eq!(out.metadata.get("record_count"), Some(&MetaValue::Int(2)));
        // Untouched keys survive.
        assert_eq!(
            out.metadata.get("file_name"),
            Some(&MetaValue::from("survey.csv"))
        );
    }

    #[test]
    fn standardize_does_not_mutate_the_input() {
        let dataset = electrical_dataset();
        let standardizer = Standardizer::new(OutputFormat::Csv);
        standardizer
            .standardize(&dataset, DataType::Electrical)
            .unwrap();

        assert!(!dataset.metadata.contains_key("standardized_at"));
        assert_eq!(
            dataset.table.get_column_names()[0].to_string(),
            "station_id"
        );
    }

    #[test]
    fn fully_empty_rows_are_dropped() {
        let table = df!(
            "depth_m" => &[Some(0.5), None, Some(1.0)],
            "resistivity_ohm_m" => &[Some(150.2), None, None],
        )
        .unwrap();
        let filtered = drop_empty_rows(table).unwrap();
        // The middle row is all-null and goes; the last row keeps a value.
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn integer_measurement_columns_become_float64() {
        let table = df!(
            "station_id" => &["S001"],
            "depth_m" => &[1i64],
            "resistivity_ohm_m" => &[150i64],
        )
        .unwrap();
        let standardizer = Standardizer::new(OutputFormat::Csv);
        let out = standardizer
            .standardize(&ParsedDataset::new(Metadata::new(), table), DataType::Electrical)
            .unwrap();

        assert_eq!(
            out.table.column("depth_m").unwrap().dtype(),
            &PlType::Float64
        );
        assert_eq!(
            out.table.column("station_id").unwrap().dtype(),
            &PlType::String
        );
    }

    #[test]
    fn sidecar_path_sits_next_to_the_output() {
        assert_eq!(
            metadata_sidecar_path(Path::new("/data/out_standardized.csv")),
            PathBuf::from("/data/out_standardized_metadata.json")
        );
        assert_eq!(
            metadata_sidecar_path(Path::new("out.parquet")),
            PathBuf::from("out_metadata.json")
        );
    }

    #[test]
    fn write_output_emits_table_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let standardizer = Standardizer::new(OutputFormat::Csv);
        let out = standardizer
            .standardize(&electrical_dataset(), DataType::Electrical)
            .unwrap();

        standardizer.write_output(&out, &path, true).unwrap();

        assert!(path.exists());
        let sidecar = metadata_sidecar_path(&path);
        let contents = std::fs::read_to_string(&sidecar).unwrap();
        let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(json["standardization_version"], serde_json::json!("1.0"));
        assert_eq!(json["data_type"], serde_json::json!("electrical"));
    }

    #[test]
    fn sidecar_can_be_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let standardizer = Standardizer::new(OutputFormat::Csv);
        let out = standardizer
            .standardize(&electrical_dataset(), DataType::Electrical)
            .unwrap();

        standardizer.write_output(&out, &path, false).unwrap();

        assert!(path.exists());
        assert!(!metadata_sidecar_path(&path).exists());
    }
}
