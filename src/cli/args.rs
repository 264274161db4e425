//! Command-line argument definitions for the geodata standardizer.
//!
//! The CLI is a single pipeline command defined with the clap derive API:
//! pick an input file and its data type, optionally an output path and
//! format, and the tool parses, checks, validates, and standardizes it.

use clap::Parser;
use std::path::PathBuf;

use crate::standardize::OutputFormat;

/// CLI arguments for the geodata standardizer
///
/// Converts geophysical survey data files (electrical resistivity, seismic,
/// ground-penetrating radar) into standardized output formats with quality
/// control checks and a JSON metadata sidecar.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "geodata-standardizer",
    version,
    about = "Standardize geophysical survey data into uniform output formats",
    long_about = "Parses geophysical survey data files (electrical resistivity, seismic, \
                  ground-penetrating radar), runs quality control checks, validates values \
                  against physically plausible ranges, and writes a standardized table in \
                  CSV, JSON, Excel, or Parquet format together with a JSON metadata sidecar."
)]
pub struct Args {
    /// Input data file to process
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Path to the input data file"
    )]
    pub input: PathBuf,

    /// Data type of the input file
    ///
    /// One of the registered types: electrical, seismic, radar. Additional
    /// types registered at runtime are accepted by name.
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        help = "Data type of the input file (electrical, seismic, radar)"
    )]
    pub data_type: String,

    /// Output path for the standardized file
    ///
    /// Defaults to `<input_stem>_standardized.<ext>` next to the input file.
    /// Parent directories are created if needed.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output path for the standardized file"
    )]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        default_value = "csv",
        help = "Output format: csv, json, excel, or parquet"
    )]
    pub format: OutputFormat,

    /// Skip quality control checks
    ///
    /// Validation against required columns and value ranges still runs; only
    /// the informational QC pass (missing values, duplicates, outliers,
    /// consistency) is skipped.
    #[arg(long = "skip-qc", help = "Skip quality control checks")]
    pub skip_qc: bool,

    /// Enable verbose (debug-level) logging
    #[arg(short = 'v', long = "verbose", help = "Enable verbose logging")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let args =
            Args::try_parse_from(["geodata-standardizer", "-i", "survey.dat", "-t", "electrical"])
                .unwrap();
        assert_eq!(args.input, PathBuf::from("survey.dat"));
        assert_eq!(args.data_type, "electrical");
        assert_eq!(args.format, OutputFormat::Csv);
        assert!(!args.skip_qc);
        assert!(args.output.is_none());
    }

    #[test]
    fn parses_full_invocation() {
        let args = Args::try_parse_from([
            "geodata-standardizer",
            "--input",
            "line42.sgy",
            "--type",
            "seismic",
            "--output",
            "out/line42.parquet",
            "--format",
            "parquet",
            "--skip-qc",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(args.data_type, "seismic");
        assert_eq!(args.format, OutputFormat::Parquet);
        assert!(args.skip_qc);
        assert!(args.verbose);
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Args::try_parse_from([
            "geodata-standardizer",
            "-i",
            "a.dat",
            "-t",
            "electrical",
            "-f",
            "yaml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn input_and_type_are_required() {
        assert!(Args::try_parse_from(["geodata-standardizer"]).is_err());
        assert!(Args::try_parse_from(["geodata-standardizer", "-i", "a.dat"]).is_err());
    }
}
