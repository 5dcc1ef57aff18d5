//! # SOT Validator
//!
//! Source-of-truth data-quality checks on the canonicalized table.
//!
//! The validator only reports. It never drops rows or columns, and it
//! never mutates the table: `row_count` in the report always equals the
//! input table's row count exactly.
//!
//! Severity policy:
//! - no table / empty table        => ERROR, short-circuit
//! - required column missing       => ERROR (every missing name listed)
//! - out-of-bounds coordinates     => WARN (partial spatial data still
//!                                    allows degraded analysis)
//! - null fractions                => diagnostic only, never an issue
//!
//! An all-zero column is valid data. Only null cells and blank text count
//! as missing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Standard pitch length in metres.
pub const PITCH_LENGTH_M: f64 = 105.0;
/// Standard pitch width in metres.
pub const PITCH_WIDTH_M: f64 = 68.0;

/// Canonical columns every event table must carry to validate cleanly.
pub const DEFAULT_REQUIRED_COLUMNS: &[&str] = &["player_id"];

/// Issue severity. Any ERROR makes the report `ok=false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warn,
    Error,
}

/// One structured validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationIssue {
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(code: &str, message: String) -> Self {
        ValidationIssue { code: code.to_string(), severity: Severity::Error, message }
    }

    pub fn warn(code: &str, message: String) -> Self {
        ValidationIssue { code: code.to_string(), severity: Severity::Warn, message }
    }
}

/// Full data-quality report for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataQualityReport {
    pub ok: bool,
    pub row_count: usize,
    pub missing_required: Vec<String>,
    /// column -> fraction of missing cells, over the full table.
    pub null_report: std::collections::BTreeMap<String, f64>,
    /// `x_out_of_bounds` / `y_out_of_bounds` -> row counts strictly
    /// outside the declared pitch bounds.
    pub bounds_report: std::collections::BTreeMap<String, usize>,
    pub issues: Vec<ValidationIssue>,
}

impl DataQualityReport {
    /// Shell report for a stage that never ran (e.g. the gate blocked the
    /// run before validation). `ok=false` without an ERROR issue marks
    /// "not validated", which is distinct from "validated and failed".
    pub fn skipped(reason: &str) -> Self {
        DataQualityReport {
            ok: false,
            issues: vec![ValidationIssue::warn("NOT_RUN", reason.to_string())],
            ..Default::default()
        }
    }
}

/// Inclusive coordinate bounds used for the sanity check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PitchBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for PitchBounds {
    fn default() -> Self {
        PitchBounds { x_min: 0.0, x_max: PITCH_LENGTH_M, y_min: 0.0, y_max: PITCH_WIDTH_M }
    }
}

/// Non-destructive data-quality checker.
#[derive(Debug, Clone)]
pub struct SotValidator {
    required_columns: Vec<String>,
    bounds: PitchBounds,
    allow_empty: bool,
}

impl Default for SotValidator {
    fn default() -> Self {
        SotValidator::new(
            DEFAULT_REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            PitchBounds::default(),
        )
    }
}

impl SotValidator {
    pub fn new(required_columns: Vec<String>, bounds: PitchBounds) -> Self {
        SotValidator { required_columns, bounds, allow_empty: false }
    }

    /// Accept zero-row tables instead of raising `DF_EMPTY`.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Validate `df`. The table itself is untouched; everything the
    /// validator finds goes into the report.
    pub fn validate(&self, df: Option<&Table>) -> DataQualityReport {
        let df = match df {
            None => {
                return DataQualityReport {
                    ok: false,
                    issues: vec![ValidationIssue::error("NO_TABLE", "no table provided".to_string())],
                    ..Default::default()
                };
            }
            Some(t) => t,
        };

        if df.is_empty() && !self.allow_empty {
            return DataQualityReport {
                ok: false,
                issues: vec![ValidationIssue::error("DF_EMPTY", "table has no rows".to_string())],
                ..Default::default()
            };
        }

        let mut issues: Vec<ValidationIssue> = Vec::new();

        let missing_required: Vec<String> = self
            .required_columns
            .iter()
            .filter(|c| df.column_index(c).is_none())
            .cloned()
            .collect();
        if !missing_required.is_empty() {
            issues.push(ValidationIssue::error(
                "MISSING_REQUIRED_COLUMN",
                format!("missing required columns: {}", missing_required.join(", ")),
            ));
        }

        let mut null_report = std::collections::BTreeMap::new();
        for col in df.columns() {
            if let Some(frac) = df.null_fraction(col) {
                null_report.insert(col.clone(), frac);
            }
        }

        let mut bounds_report = std::collections::BTreeMap::new();
        if let Some(out) = self.count_out_of_bounds(df, "x", self.bounds.x_min, self.bounds.x_max) {
            if out > 0 {
                issues.push(ValidationIssue::warn(
                    "X_OUT_OF_BOUNDS",
                    format!("{out} rows with x outside [{}, {}]", self.bounds.x_min, self.bounds.x_max),
                ));
            }
            bounds_report.insert("x_out_of_bounds".to_string(), out);
        }
        if let Some(out) = self.count_out_of_bounds(df, "y", self.bounds.y_min, self.bounds.y_max) {
            if out > 0 {
                issues.push(ValidationIssue::warn(
                    "Y_OUT_OF_BOUNDS",
                    format!("{out} rows with y outside [{}, {}]", self.bounds.y_min, self.bounds.y_max),
                ));
            }
            bounds_report.insert("y_out_of_bounds".to_string(), out);
        }

        let ok = !issues.iter().any(|i| i.severity == Severity::Error);
        DataQualityReport {
            ok,
            row_count: df.row_count(),
            missing_required,
            null_report,
            bounds_report,
            issues,
        }
    }

    /// Rows whose `col` value coerces to a number strictly outside
    /// `[min, max]`. Cells that do not coerce are not counted.
    fn count_out_of_bounds(&self, df: &Table, col: &str, min: f64, max: f64) -> Option<usize> {
        let values = df.numeric_column(col)?;
        Some(
            values
                .iter()
                .filter(|v| matches!(v, Some(x) if *x < min || *x > max))
                .count(),
        )
    }
}
