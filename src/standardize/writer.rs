//! Per-format table writers.
//!
//! Each writer takes the table by reference and owns the file handling for
//! its format. Writer failures surface as serialization errors so the caller
//! can distinguish them from parse or validation failures.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use polars::prelude::*;

use crate::error::{GeoError, Result};

/// Supported output formats for standardized tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Excel,
    Parquet,
}

impl OutputFormat {
    /// File extension for the format, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Excel => "xlsx",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Excel => "excel",
            OutputFormat::Parquet => "parquet",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!(
                "unknown output format '{other}' (expected csv, json, excel, or parquet)"
            )),
        }
    }
}

/// Write the table to `path` in the requested format.
pub fn write_table(table: &DataFrame, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(table, path),
        OutputFormat::Json => write_json(table, path),
        OutputFormat::Excel => write_excel(table, path),
        OutputFormat::Parquet => write_parquet(table, path),
    }
}

fn write_csv(table: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    let mut table = table.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut table)?;
    Ok(())
}

/// JSON output is an array of row objects, matching the shape of a record
/// export rather than a columnar dump.
fn write_json(table: &DataFrame, path: &Path) -> Result<()> {
    let columns: Vec<&Series> = table
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series())
        .collect();

    let mut rows = Vec::with_capacity(table.height());
    for idx in 0..table.height() {
        let mut row = serde_json::Map::new();
        for series in &columns {
            row.insert(series.name().to_string(), any_value_to_json(&series.get(idx)?));
        }
        rows.push(serde_json::Value::Object(row));
    }

    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &rows)
        .map_err(|e| GeoError::serialization(format!("JSON write failed: {e}")))?;
    Ok(())
}

fn write_excel(table: &DataFrame, path: &Path) -> Result<()> {
    use rust_xlsxwriter::Workbook;

    let excel_err = |e: rust_xlsxwriter::XlsxError| {
        GeoError::serialization(format!("Excel write failed: {e}"))
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let columns: Vec<&Series> = table
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series())
        .collect();

    for (col, series) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, series.name().as_str())
            .map_err(excel_err)?;
    }

    for idx in 0..table.height() {
        let row = (idx + 1) as u32;
        for (col, series) in columns.iter().enumerate() {
            let col = col as u16;
            match series.get(idx)? {
                AnyValue::Null => {}
                AnyValue::Boolean(v) => {
                    worksheet.write_boolean(row, col, v).map_err(excel_err)?;
                }
                AnyValue::String(v) => {
                    worksheet.write_string(row, col, v).map_err(excel_err)?;
                }
                AnyValue::StringOwned(v) => {
                    worksheet
                        .write_string(row, col, v.as_str())
                        .map_err(excel_err)?;
                }
                AnyValue::Float64(v) => {
                    worksheet.write_number(row, col, v).map_err(excel_err)?;
                }
                AnyValue::Float32(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .map_err(excel_err)?;
                }
                AnyValue::Int8(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .map_err(excel_err)?;
                }
                AnyValue::Int16(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .map_err(excel_err)?;
                }
                AnyValue::Int32(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .map_err(excel_err)?;
                }
                AnyValue::Int64(v) => {
                    worksheet
                        .write_number(row, col, v as f64)
                        .map_err(excel_err)?;
                }
                AnyValue::UInt8(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .map_err(excel_err)?;
                }
                AnyValue::UInt16(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .map_err(excel_err)?;
                }
                AnyValue::UInt32(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .map_err(excel_err)?;
                }
                AnyValue::UInt64(v) => {
                    worksheet
                        .write_number(row, col, v as f64)
                        .map_err(excel_err)?;
                }
                other => {
                    worksheet
                        .write_string(row, col, other.to_string().as_str())
                        .map_err(excel_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(excel_err)?;
    Ok(())
}

fn write_parquet(table: &DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut table = table.clone();
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut table)?;
    Ok(())
}

/// Convert a single cell to its JSON representation. Non-finite floats have
/// no JSON number form and degrade to null.
fn any_value_to_json(value: &AnyValue) -> serde_json::Value {
    match value {
        AnyValue::Null => serde_json::Value::Null,
        AnyValue::Boolean(v) => serde_json::Value::Bool(*v),
        AnyValue::String(v) => serde_json::Value::String((*v).to_string()),
        AnyValue::StringOwned(v) => serde_json::Value::String(v.to_string()),
        AnyValue::Int8(v) => serde_json::Value::from(*v),
        AnyValue::Int16(v) => serde_json::Value::from(*v),
        AnyValue::Int32(v) => serde_json::Value::from(*v),
        AnyValue::Int64(v) => serde_json::Value::from(*v),
        AnyValue::UInt8(v) => serde_json::Value::from(*v),
        AnyValue::UInt16(v) => serde_json::Value::from(*v),
        AnyValue::UInt32(v) => serde_json::Value::from(*v),
        AnyValue::UInt64(v) => serde_json::Value::from(*v),
        AnyValue::Float32(v) => serde_json::Number::from_f64(f64::from(*v))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        AnyValue::Float64(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        other => serde_json::Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_accepts_aliases() {
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("Excel".parse::<OutputFormat>().unwrap(), OutputFormat::Excel);
        assert_eq!("xlsx".parse::<OutputFormat>().unwrap(), OutputFormat::Excel);
        assert_eq!(
            "PARQUET".parse::<OutputFormat>().unwrap(),
            OutputFormat::Parquet
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn extensions_match_formats() {
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Excel.extension(), "xlsx");
        assert_eq!(OutputFormat::Parquet.extension(), "parquet");
    }

    #[test]
    fn csv_writer_round_trips_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let df = df!(
            "station_id" => &["S001", "S002"],
            "depth_m" => &[0.5, 1.0],
        )
        .unwrap();

        write_table(&df, &path, OutputFormat::Csv).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("station_id,depth_m"));
        assert!(contents.contains("S001,0.5"));
    }

    #[test]
    fn json_writer_emits_row_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let df = df!(
            "trace_number" => &[1i64, 2],
            "amplitude" => &[Some(0.5), None],
        )
        .unwrap();

        write_table(&df, &path, OutputFormat::Json).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(rows[0]["trace_number"], serde_json::json!(1));
        assert_eq!(rows[1]["amplitude"], serde_json::Value::Null);
    }

    #[test]
    fn parquet_writer_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let df = df!("depth_m" => &[0.5, 1.0, 1.5]).unwrap();

        write_table(&df, &path, OutputFormat::Parquet).unwrap();

        let file = File::open(&path).unwrap();
        let read_back = ParquetReader::new(file).finish().unwrap();
        assert_eq!(read_back.height(), 3);
        assert!(read_back.equals(&df));
    }

    #[test]
    fn excel_writer_creates_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let df = df!(
            "station_id" => &["S001"],
            "depth_m" => &[0.5],
        )
        .unwrap();

        write_table(&df, &path, OutputFormat::Excel).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
