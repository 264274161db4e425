//! Geodata Standardizer
//!
//! Converts geophysical survey data files into standardized output formats.
//! Three input variants are supported out of the box: electrical resistivity
//! soundings, seismic traces, and ground-penetrating radar profiles, all
//! arriving as headered delimited text.
//!
//! The pipeline runs in four stages:
//!
//! 1. **Dispatch** - pick a parser by explicit data type or file extension
//! 2. **Parse** - read the raw text, rename columns to the canonical schema,
//!    and compute per-type summary metadata
//! 3. **Quality control** - informational checks for missing values,
//!    duplicates, outliers, and consistency
//! 4. **Standardize** - normalize the table and write it as CSV, JSON,
//!    Excel, or Parquet with a JSON metadata sidecar
//!
//! ```no_run
//! use geodata_standardizer::{Dispatcher, QcChecker, Standardizer, OutputFormat};
//! use std::path::Path;
//!
//! # fn main() -> geodata_standardizer::Result<()> {
//! let dispatcher = Dispatcher::new();
//! let mut parser = dispatcher.get_parser("electrical", Path::new("survey.dat"))?;
//! let dataset = parser.process(true)?;
//!
//! let report = QcChecker::default().check(&dataset)?;
//! parser.validate(None)?;
//!
//! let standardizer = Standardizer::new(OutputFormat::Parquet);
//! let standardized = standardizer.standardize(&dataset, parser.data_type())?;
//! standardizer.write_output(&standardized, Path::new("survey_standardized.parquet"), true)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod parsers;
pub mod qc;
pub mod standardize;

pub use dispatcher::Dispatcher;
pub use error::{GeoError, Result};
pub use models::{DataType, MetaValue, Metadata, ParsedDataset, QcReport};
pub use parsers::{ElectricalParser, GeoParser, RadarParser, SeismicParser};
pub use qc::QcChecker;
pub use standardize::{OutputFormat, Standardizer};
