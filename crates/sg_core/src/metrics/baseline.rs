//! Baseline aggregates over canonical columns.
//!
//! Every helper here answers `Option<f64>`: `None` means "no evidence",
//! never a substituted default. A column of zeros is evidence.

use crate::table::Table;

/// Mean of the non-null coerced-numeric values of `col`. `None` when the
/// column is absent or carries no numeric observation.
pub fn safe_mean(df: &Table, col: &str) -> Option<f64> {
    let values = df.numeric_column(col)?;
    mean(values.into_iter().flatten())
}

/// `safe_mean` over the first candidate column that yields a value.
/// Candidates are tried in the order given.
pub fn safe_mean_any(df: &Table, candidates: &[&str]) -> Option<f64> {
    candidates.iter().find_map(|c| safe_mean(df, c))
}

/// Mean of the row-wise differences `end - start`, over rows where both
/// cells coerce to numbers.
pub fn mean_delta(df: &Table, start_col: &str, end_col: &str) -> Option<f64> {
    let start = df.numeric_column(start_col)?;
    let end = df.numeric_column(end_col)?;
    mean(start.iter().zip(end.iter()).filter_map(|(s, e)| match (s, e) {
        (Some(s), Some(e)) => Some(e - s),
        _ => None,
    }))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}
