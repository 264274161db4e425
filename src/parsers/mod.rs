//! Parsers for geophysical survey data.
//!
//! Each variant parser reads raw delimited text, renames columns to the
//! canonical schema through a case-insensitive alias table, computes
//! per-type summary metadata, and validates the result against the variant's
//! required columns, value ranges, and sign rules.
//!
//! Parsers share a four-state lifecycle (unloaded, loaded, parsed,
//! validated). Transitions are monotonic and idempotent: re-invoking a
//! satisfied transition is a no-op, and a failed validation leaves the stage
//! at parsed.

pub mod electrical;
pub mod radar;
pub mod seismic;

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::Local;
use polars::prelude::*;
use polars::prelude::DataType as PlType;
use tracing::{info, warn};

use crate::config::ColumnRange;
use crate::constants::metadata_keys;
use crate::error::{GeoError, Result};
use crate::models::{DataType, MetaValue, Metadata, ParsedDataset};
use crate::standardize::{OutputFormat, writer};

pub use electrical::ElectricalParser;
pub use radar::RadarParser;
pub use seismic::SeismicParser;

/// Parser lifecycle stage. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unloaded,
    Loaded,
    Parsed,
    Validated,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Unloaded => "unloaded",
            Stage::Loaded => "loaded",
            Stage::Parsed => "parsed",
            Stage::Validated => "validated",
        }
    }
}

/// State shared by all parser variants: source path, raw text, parsed table,
/// accumulated metadata, and the lifecycle stage.
#[derive(Debug)]
pub struct ParserCore {
    path: PathBuf,
    raw: Option<String>,
    table: Option<DataFrame>,
    metadata: Metadata,
    stage: Stage,
}

impl ParserCore {
    /// Create the core, validating the source once up front: a missing path,
    /// a non-file path, or an empty file fails immediately.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(GeoError::FileNotFound { path });
        }
        if !path.is_file() {
            return Err(GeoError::NotAFile { path });
        }
        if std::fs::metadata(&path)?.len() == 0 {
            return Err(GeoError::EmptyFile { path });
        }

        let mut metadata = Metadata::new();
        metadata.insert(
            metadata_keys::FILE_NAME.to_string(),
            MetaValue::Str(file_name_of(&path)),
        );
        metadata.insert(
            metadata_keys::FILE_PATH.to_string(),
            MetaValue::Str(path.display().to_string()),
        );
        metadata.insert(
            metadata_keys::CREATED_AT.to_string(),
            MetaValue::Str(Local::now().to_rfc3339()),
        );

        Ok(Self {
            path,
            raw: None,
            table: None,
            metadata,
            stage: Stage::Unloaded,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn table(&self) -> Option<&DataFrame> {
        self.table.as_ref()
    }

    /// Raw text, available once loaded. Parsing before loading is a
    /// format-kind failure.
    fn require_loaded(&self, data_type: DataType) -> Result<&str> {
        if self.stage >= Stage::Loaded {
            if let Some(raw) = self.raw.as_deref() {
                return Ok(raw);
            }
        }
        Err(GeoError::parse(
            data_type.tag(),
            "data must be loaded first; call load() before parse()",
        ))
    }

    /// Store the parsed table, advance the stage, and hand back a dataset
    /// clone for the caller.
    fn finish_parse(&mut self, table: DataFrame) -> ParsedDataset {
        self.metadata.insert(
            metadata_keys::RECORD_COUNT.to_string(),
            MetaValue::from(table.height()),
        );
        let dataset = ParsedDataset::new(self.metadata.clone(), table.clone());
        self.table = Some(table);
        self.stage = self.stage.max(Stage::Parsed);
        dataset
    }

    /// Pick the table to validate: an explicit one if given, otherwise the
    /// internally parsed one. Having neither is a validation failure.
    fn table_for_validation<'a>(
        &'a self,
        explicit: Option<&'a DataFrame>,
    ) -> Result<&'a DataFrame> {
        explicit
            .or(self.table.as_ref())
            .ok_or_else(|| GeoError::validation("no data to validate; call parse() first"))
    }

    fn mark_validated(&mut self) {
        self.stage = self.stage.max(Stage::Validated);
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Capability contract shared by all parser variants.
///
/// Conformance is checked at compile time: anything registered with the
/// dispatcher must implement the full load/parse/validate/process surface.
pub trait GeoParser: std::fmt::Debug {
    fn data_type(&self) -> DataType;

    fn core(&self) -> &ParserCore;

    fn core_mut(&mut self) -> &mut ParserCore;

    /// Parse the loaded raw text into the canonical table, computing
    /// variant-specific metadata. Requires the loaded stage.
    fn parse(&mut self) -> Result<ParsedDataset>;

    /// Validate required columns, value ranges, and variant sign rules on
    /// the internally parsed table or an explicitly supplied one. On success
    /// the parser advances to the validated stage; on failure the stage is
    /// unchanged.
    fn validate(&mut self, table: Option<&DataFrame>) -> Result<()>;

    /// Read the raw text from the source file. No-op when already loaded.
    fn load(&mut self) -> Result<()> {
        if self.core().stage() >= Stage::Loaded {
            return Ok(());
        }
        let raw = std::fs::read_to_string(self.core().path())?;
        info!("Loaded {} ({} bytes)", self.core().file_name(), raw.len());
        let core = self.core_mut();
        core.raw = Some(raw);
        core.stage = Stage::Loaded;
        Ok(())
    }

    /// Current dataset snapshot, once parsed.
    fn dataset(&self) -> Option<ParsedDataset> {
        let core = self.core();
        core.table()
            .map(|table| ParsedDataset::new(core.metadata().clone(), table.clone()))
    }

    /// Run the complete pipeline: load, parse, and (optionally) validate.
    /// Steps whose stage is already satisfied are skipped, so repeated calls
    /// return the same result.
    fn process(&mut self, skip_validation: bool) -> Result<ParsedDataset> {
        info!("Processing {}", self.core().file_name());
        self.load()?;
        let dataset = self.parse()?;
        if !skip_validation && self.core().stage() < Stage::Validated {
            self.validate(None)?;
        }
        info!("Successfully processed {}", self.core().file_name());
        Ok(dataset)
    }

    /// Save the parsed (pre-standardization) table in the given format.
    fn save_data(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let Some(table) = self.core().table() else {
            return Err(GeoError::parse(
                self.data_type().tag(),
                "no data to save; run parse() first",
            ));
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        writer::write_table(table, path, format)?;
        info!("Saved data to {}", path.display());
        Ok(())
    }

    /// Snapshot of the parser state for reporting.
    fn summary(&self) -> Metadata {
        let core = self.core();
        let mut summary = Metadata::new();
        summary.insert(
            metadata_keys::FILE_NAME.to_string(),
            MetaValue::Str(core.file_name()),
        );
        summary.insert("stage".to_string(), MetaValue::from(core.stage().name()));
        if let Some(table) = core.table() {
            summary.insert("row_count".to_string(), MetaValue::from(table.height()));
            summary.insert("column_count".to_string(), MetaValue::from(table.width()));
        }
        summary
    }
}

/// Read headered delimited text into a table. The caller wraps failures with
/// variant context.
pub(crate) fn read_table(raw: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(Cursor::new(raw.as_bytes()))
        .finish()
}

/// Rename columns to the canonical schema through an alias table of
/// (lowercased alias, canonical name) pairs. Matching is case-insensitive;
/// unrecognized columns are left untouched, and a rename that would collide
/// with an existing column is skipped.
pub(crate) fn apply_column_aliases(df: &mut DataFrame, aliases: &[(&str, &str)]) -> Result<()> {
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    for name in names {
        let lower = name.to_lowercase();
        let Some((_, canonical)) = aliases.iter().find(|(alias, _)| *alias == lower) else {
            continue;
        };
        if name == *canonical {
            continue;
        }
        if df.column(canonical).is_ok() {
            warn!(
                "Skipping rename of column '{}': '{}' already present",
                name, canonical
            );
            continue;
        }
        df.rename(&name, (*canonical).into())?;
    }
    Ok(())
}

/// Check that every required column is present, reporting all missing ones.
pub(crate) fn check_required_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| df.column(name).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GeoError::validation(format!(
            "missing required columns: {}",
            missing.join(", ")
        )))
    }
}

/// Check inclusive value ranges, skipping columns absent from the table.
/// Nulls never count as violations. Fails on the first violating column,
/// naming it and the out-of-range count.
pub(crate) fn check_value_ranges(df: &DataFrame, ranges: &[ColumnRange]) -> Result<()> {
    for range in ranges {
        let Some(values) = numeric_values(df, range.column)? else {
            continue;
        };
        let out_of_range = values.iter().filter(|v| !range.contains(**v)).count();
        if out_of_range > 0 {
            return Err(GeoError::validation(format!(
                "column '{}' has {} values out of range [{}, {}]",
                range.column, out_of_range, range.min, range.max
            )));
        }
    }
    Ok(())
}

/// Non-null values of a column as f64, or `None` when the column is absent.
/// Cells that cannot be represented numerically are skipped.
pub(crate) fn numeric_values(df: &DataFrame, column: &str) -> Result<Option<Vec<f64>>> {
    let Ok(col) = df.column(column) else {
        return Ok(None);
    };
    let casted = col.as_materialized_series().cast(&PlType::Float64)?;
    let values = casted.f64()?.into_iter().flatten().collect();
    Ok(Some(values))
}

/// Min and max of a column's finite values, or `None` if the column is
/// absent or holds no numeric values.
pub(crate) fn column_min_max(df: &DataFrame, column: &str) -> Result<Option<(f64, f64)>> {
    let Some(values) = numeric_values(df, column)? else {
        return Ok(None);
    };
    let mut finite = values.into_iter().filter(|v| v.is_finite());
    let Some(first) = finite.next() else {
        return Ok(None);
    };
    let (min, max) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Ok(Some((min, max)))
}

/// Distinct-value count for an identifier column, 0 when the column is
/// absent.
pub(crate) fn distinct_count(df: &DataFrame, column: &str) -> Result<usize> {
    match df.column(column) {
        Ok(col) => Ok(col.as_materialized_series().n_unique()?),
        Err(_) => Ok(0),
    }
}

/// Count of values strictly below zero, 0 when the column is absent.
pub(crate) fn count_negative(df: &DataFrame, column: &str) -> Result<usize> {
    Ok(numeric_values(df, column)?
        .map(|values| values.iter().filter(|v| **v < 0.0).count())
        .unwrap_or(0))
}

/// Count of values at or below zero, 0 when the column is absent.
pub(crate) fn count_non_positive(df: &DataFrame, column: &str) -> Result<usize> {
    Ok(numeric_values(df, column)?
        .map(|values| values.iter().filter(|v| **v <= 0.0).count())
        .unwrap_or(0))
}
