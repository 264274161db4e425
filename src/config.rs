//! Configuration tables for parsers, quality control, and output.
//!
//! The pipeline treats these as injected configuration rather than hardcoded
//! constants: parsers receive their required-column and range tables from
//! here, the QC engine receives its thresholds, and the dispatcher receives
//! the extension mapping. Adding a variant means adding rows here, not
//! touching pipeline code.

use std::path::{Path, PathBuf};

use crate::constants::{OUTPUT_STEM_SUFFIX, columns};
use crate::models::DataType;
use crate::standardize::OutputFormat;

/// Inclusive value range for a single column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRange {
    pub column: &'static str,
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    const fn new(column: &'static str, min: f64, max: f64) -> Self {
        Self { column, min, max }
    }

    /// Bounds are inclusive: a value exactly at min or max is in range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-variant parser configuration.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    /// Columns that must be present after alias renaming.
    pub required_columns: &'static [&'static str],
    /// Inclusive value ranges, checked during validation for columns present.
    pub value_ranges: &'static [ColumnRange],
    /// Columns coerced to numeric during standardization.
    pub numeric_columns: &'static [&'static str],
    /// Columns coerced to string during standardization.
    pub string_columns: &'static [&'static str],
}

const ELECTRICAL_CONFIG: VariantConfig = VariantConfig {
    required_columns: &[
        columns::STATION_ID,
        columns::DEPTH_M,
        columns::RESISTIVITY_OHM_M,
    ],
    value_ranges: &[
        ColumnRange::new(columns::DEPTH_M, 0.0, 10_000.0),
        ColumnRange::new(columns::RESISTIVITY_OHM_M, 0.001, 1e6),
        ColumnRange::new(columns::CURRENT_MA, 0.0, 10_000.0),
        ColumnRange::new(columns::VOLTAGE_MV, 0.0, 100_000.0),
    ],
    numeric_columns: &[columns::DEPTH_M, columns::RESISTIVITY_OHM_M],
    string_columns: &[columns::STATION_ID],
};

const SEISMIC_CONFIG: VariantConfig = VariantConfig {
    required_columns: &[columns::TRACE_NUMBER, columns::TIME_MS, columns::AMPLITUDE],
    value_ranges: &[
        ColumnRange::new(columns::TIME_MS, 0.0, 100_000.0),
        ColumnRange::new(columns::AMPLITUDE, -1e6, 1e6),
        ColumnRange::new(columns::OFFSET_M, 0.0, 100_000.0),
    ],
    numeric_columns: &[columns::TRACE_NUMBER, columns::TIME_MS, columns::AMPLITUDE],
    string_columns: &[],
};

const RADAR_CONFIG: VariantConfig = VariantConfig {
    required_columns: &[
        columns::TRACE_NUMBER,
        columns::SAMPLE_NUMBER,
        columns::AMPLITUDE,
    ],
    value_ranges: &[
        ColumnRange::new(columns::SAMPLE_NUMBER, 0.0, 100_000.0),
        ColumnRange::new(columns::AMPLITUDE, -32_768.0, 32_767.0),
        ColumnRange::new(columns::DISTANCE_M, 0.0, 10_000.0),
        ColumnRange::new(columns::TIME_NS, 0.0, 1_000_000.0),
        ColumnRange::new(columns::ANTENNA_FREQ_MHZ, 10.0, 5_000.0),
    ],
    numeric_columns: &[
        columns::TRACE_NUMBER,
        columns::SAMPLE_NUMBER,
        columns::AMPLITUDE,
    ],
    string_columns: &[],
};

/// Get the configuration for a data-type variant.
pub fn variant_config(data_type: DataType) -> &'static VariantConfig {
    match data_type {
        DataType::Electrical => &ELECTRICAL_CONFIG,
        DataType::Seismic => &SEISMIC_CONFIG,
        DataType::Radar => &RADAR_CONFIG,
    }
}

/// Quality control thresholds.
#[derive(Debug, Clone)]
pub struct QcConfig {
    /// Missing-value percentage above which the finding is an issue.
    pub missing_value_threshold_pct: f64,
    /// Duplicate-row percentage above which the finding is an issue.
    pub duplicate_threshold_pct: f64,
    /// Multiplier applied to the IQR when computing outlier bounds.
    pub iqr_multiplier: f64,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            missing_value_threshold_pct: 10.0,
            duplicate_threshold_pct: 5.0,
            iqr_multiplier: 1.5,
        }
    }
}

/// File extension (lowercase, no dot) to data-type tag mapping.
///
/// `.csv`, `.txt`, and `.dat` all map to `electrical`: extension-based
/// inference cannot distinguish seismic or radar CSV exports from electrical
/// ones, so callers with such files must pass an explicit type tag.
pub const EXTENSION_TYPES: &[(&str, DataType)] = &[
    ("dat", DataType::Electrical),
    ("txt", DataType::Electrical),
    ("csv", DataType::Electrical),
    ("sgy", DataType::Seismic),
    ("segy", DataType::Seismic),
    ("dzt", DataType::Radar),
    ("rd3", DataType::Radar),
];

/// Generate the default output path for an input file:
/// `<input_stem>_standardized.<ext>` next to the input.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = format!("{}{}.{}", stem, OUTPUT_STEM_SUFFIX, format.extension());
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
