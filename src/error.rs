//! Error handling for geophysical data standardization.
//!
//! The variants group into the failure kinds a caller can act on: structural
//! I/O problems, format failures during parsing, validation failures, unknown
//! data types or extensions, and output serialization failures. Validation
//! failures are distinct so a caller may continue with warnings-only QC but
//! must treat them as blocking for standardized output.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Path is not a file: {path}")]
    NotAFile { path: PathBuf },

    #[error("File is empty: {path}")]
    EmptyFile { path: PathBuf },

    #[error("Failed to parse {data_type} data: {message}")]
    Parse { data_type: String, message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Unknown data type: '{given}'. Available types: {available}")]
    UnknownDataType { given: String, available: String },

    #[error(
        "Cannot detect data type from extension '{extension}'. Supported extensions: {supported}"
    )]
    UnknownExtension {
        extension: String,
        supported: String,
    },

    #[error("Failed to write output: {message}")]
    Serialization { message: String },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl GeoError {
    /// Create a format-kind parse error with variant context.
    pub fn parse(data_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            data_type: data_type.into(),
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
