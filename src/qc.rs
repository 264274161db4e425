//! Quality control checks for parsed geophysical data.
//!
//! The checker is a stateless evaluator: it inspects the table and reports
//! findings as data (`issues` and `warnings` lists), never as errors, so the
//! caller decides whether to halt. Four independent checks run in a fixed
//! order: missing values, duplicates, outliers, consistency.

use std::collections::BTreeSet;

use polars::prelude::*;
use polars::prelude::DataType as PlType;
use tracing::{info, warn};

use crate::config::QcConfig;
use crate::constants::checks;
use crate::error::Result;
use crate::models::{ParsedDataset, QcReport, QcSummary};

/// Outcome of a single check.
struct CheckOutcome {
    has_issues: bool,
    has_warnings: bool,
    message: String,
}

impl CheckOutcome {
    fn clean(message: impl Into<String>) -> Self {
        Self {
            has_issues: false,
            has_warnings: false,
            message: message.into(),
        }
    }

    fn issue(message: impl Into<String>) -> Self {
        Self {
            has_issues: true,
            has_warnings: false,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            has_issues: false,
            has_warnings: true,
            message: message.into(),
        }
    }
}

/// Runs quality control checks over a parsed dataset.
pub struct QcChecker {
    config: QcConfig,
}

impl QcChecker {
    pub fn new(config: QcConfig) -> Self {
        Self { config }
    }

    /// Run all checks and aggregate the findings. `passed` is true iff no
    /// issues were found; warnings never affect it.
    pub fn check(&self, dataset: &ParsedDataset) -> Result<QcReport> {
        let df = &dataset.table;
        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        let mut checks_run = Vec::new();

        let missing = self.check_missing_values(df);
        checks_run.push(checks::MISSING_VALUES.to_string());
        record(missing, &mut issues, &mut warnings);

        let duplicates = self.check_duplicates(df)?;
        checks_run.push(checks::DUPLICATES.to_string());
        record(duplicates, &mut issues, &mut warnings);

        let outliers = self.check_outliers(df)?;
        checks_run.push(checks::OUTLIERS.to_string());
        record(outliers, &mut issues, &mut warnings);

        let consistency = self.check_consistency(df)?;
        checks_run.push(checks::CONSISTENCY.to_string());
        record(consistency, &mut issues, &mut warnings);

        let passed = issues.is_empty();
        if passed {
            info!("All QC checks passed");
        } else {
            warn!("QC checks failed with {} issues", issues.len());
        }

        Ok(QcReport {
            passed,
            summary: QcSummary {
                total_records: df.height(),
                total_columns: df.width(),
                issues_found: issues.len(),
                warnings_found: warnings.len(),
            },
            issues,
            warnings,
            checks_run,
        })
    }

    /// Per-column null counts. A missing percentage above the threshold is
    /// an issue; any missing values below it are a warning.
    fn check_missing_values(&self, df: &DataFrame) -> CheckOutcome {
        let affected: Vec<(String, usize)> = df
            .get_columns()
            .iter()
            .map(|c| {
                (
                    c.name().to_string(),
                    c.as_materialized_series().null_count(),
                )
            })
            .filter(|(_, nulls)| *nulls > 0)
            .collect();

        if affected.is_empty() {
            return CheckOutcome::clean("no missing values found");
        }

        let total_missing: usize = affected.iter().map(|(_, n)| n).sum();
        let total_values = df.height() * df.width();
        let missing_pct = (total_missing as f64 / total_values as f64) * 100.0;
        let columns = affected
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!(
            "missing values found: {total_missing} ({missing_pct:.2}%); affected columns: {columns}"
        );

        if missing_pct > self.config.missing_value_threshold_pct {
            CheckOutcome::issue(message)
        } else {
            CheckOutcome::warning(message)
        }
    }

    /// Fully-duplicate rows, first occurrence kept as non-duplicate.
    fn check_duplicates(&self, df: &DataFrame) -> Result<CheckOutcome> {
        if df.height() == 0 {
            return Ok(CheckOutcome::clean("no duplicates found"));
        }

        let duplicates = duplicate_row_count(df)?;
        if duplicates == 0 {
            return Ok(CheckOutcome::clean("no duplicates found"));
        }

        let dup_pct = (duplicates as f64 / df.height() as f64) * 100.0;
        let message = format!("{duplicates} duplicate rows found ({dup_pct:.2}% of total)");

        if dup_pct > self.config.duplicate_threshold_pct {
            Ok(CheckOutcome::issue(message))
        } else {
            Ok(CheckOutcome::warning(message))
        }
    }

    /// IQR-based outlier detection per numeric column. Always a warning,
    /// never an issue.
    fn check_outliers(&self, df: &DataFrame) -> Result<CheckOutcome> {
        let mut findings = Vec::new();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                continue;
            }

            let mut values: Vec<f64> = series
                .cast(&PlType::Float64)?
                .f64()?
                .into_iter()
                .flatten()
                .collect();
            if values.is_empty() {
                continue;
            }
            values.sort_by(|a, b| a.total_cmp(b));

            let q1 = quantile_linear(&values, 0.25);
            let q3 = quantile_linear(&values, 0.75);
            let iqr = q3 - q1;
            let lower = q1 - self.config.iqr_multiplier * iqr;
            let upper = q3 + self.config.iqr_multiplier * iqr;

            let count = values.iter().filter(|v| **v < lower || **v > upper).count();
            if count > 0 {
                let pct = (count as f64 / df.height() as f64) * 100.0;
                findings.push(format!("{}: {} ({:.2}%)", series.name(), count, pct));
            }
        }

        if findings.is_empty() {
            Ok(CheckOutcome::clean("no outliers detected"))
        } else {
            Ok(CheckOutcome::warning(format!(
                "outliers detected in columns: {}",
                findings.join("; ")
            )))
        }
    }

    /// Consistency heuristics: numeric columns with zero variance, and text
    /// columns whose values all parse as numbers. Always a warning.
    fn check_consistency(&self, df: &DataFrame) -> Result<CheckOutcome> {
        let mut findings = Vec::new();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if is_numeric_dtype(series.dtype()) {
                let values: Vec<f64> = series
                    .cast(&PlType::Float64)?
                    .f64()?
                    .into_iter()
                    .flatten()
                    .collect();
                if values.len() >= 2 && values.iter().all(|v| *v == values[0]) {
                    findings.push(format!(
                        "column '{}' has zero variance (all values are identical)",
                        series.name()
                    ));
                }
            } else if series.dtype() == &PlType::String {
                let ca = series.str()?;
                let mut any = false;
                let mut all_numeric = true;
                for value in ca.into_iter().flatten() {
                    any = true;
                    if value.trim().parse::<f64>().is_err() {
                        all_numeric = false;
                        break;
                    }
                }
                if any && all_numeric {
                    findings.push(format!(
                        "column '{}' is stored as text but appears to be numeric",
                        series.name()
                    ));
                }
            }
        }

        if findings.is_empty() {
            Ok(CheckOutcome::clean("no consistency issues found"))
        } else {
            Ok(CheckOutcome::warning(findings.join("; ")))
        }
    }
}

impl Default for QcChecker {
    fn default() -> Self {
        Self::new(QcConfig::default())
    }
}

fn record(outcome: CheckOutcome, issues: &mut Vec<String>, warnings: &mut Vec<String>) {
    if outcome.has_issues {
        issues.push(outcome.message);
    } else if outcome.has_warnings {
        warnings.push(outcome.message);
    }
}

fn is_numeric_dtype(dtype: &PlType) -> bool {
    matches!(
        dtype,
        PlType::Int8
            | PlType::Int16
            | PlType::Int32
            | PlType::Int64
            | PlType::UInt8
            | PlType::UInt16
            | PlType::UInt32
            | PlType::UInt64
            | PlType::Float32
            | PlType::Float64
    )
}

/// Count rows whose full composite of values has already been seen.
fn duplicate_row_count(df: &DataFrame) -> Result<usize> {
    let series: Vec<&Series> = df
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series())
        .collect();

    let mut seen = BTreeSet::new();
    let mut duplicates = 0;
    for idx in 0..df.height() {
        let mut composite = String::new();
        for (pos, s) in series.iter().enumerate() {
            if pos > 0 {
                composite.push('|');
            }
            composite.push_str(&any_value_key(&s.get(idx)?));
        }
        if !seen.insert(composite) {
            duplicates += 1;
        }
    }
    Ok(duplicates)
}

/// Cell key for row comparison. Nulls are tagged distinctly from empty
/// strings, and string keys are length-prefixed so a `|` inside a value
/// cannot collide with the field separator.
fn any_value_key(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "n:".to_string(),
        AnyValue::String(s) => format!("s:{}:{}", s.len(), s),
        AnyValue::StringOwned(s) => format!("s:{}:{}", s.len(), s),
        other => format!("v:{}", other),
    }
}

/// Quantile with linear interpolation over sorted values.
fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let base = pos.floor() as usize;
    let frac = pos - base as f64;
    if base + 1 < sorted.len() {
        sorted[base] + frac * (sorted[base + 1] - sorted[base])
    } else {
        sorted[base]
    }
}
