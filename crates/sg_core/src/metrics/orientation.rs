//! Orientation and biomechanical proxy signals.
//!
//! These only exist when a video/tracking provider has already flattened
//! them into columns. Without the columns there is nothing to read and
//! every signal stays absent.

use crate::metrics::baseline::safe_mean_any;
use crate::table::Table;

/// Extracted orientation proxies. `None` always means "no evidence".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrientationSignals {
    pub defender_side_on_score: Option<f64>,
    pub square_on_rate: Option<f64>,
    pub channeling_to_wing_rate: Option<f64>,
}

pub fn extract_orientation_signals(df: &Table) -> OrientationSignals {
    if df.is_empty() {
        return OrientationSignals::default();
    }
    OrientationSignals {
        defender_side_on_score: safe_mean_any(df, &["defender_side_on_score", "side_on_score"]),
        square_on_rate: safe_mean_any(df, &["square_on_rate", "square_on_pct"]),
        channeling_to_wing_rate: safe_mean_any(
            df,
            &["channeling_to_wing_rate", "wing_channel_rate"],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn test_reads_column_means() {
        let mut t = Table::new(vec![
            "defender_side_on_score".to_string(),
            "square_on_rate".to_string(),
        ])
        .unwrap();
        t.push_row(vec![Cell::Number(0.6), Cell::Number(0.2)]).unwrap();
        t.push_row(vec![Cell::Number(0.8), Cell::Null]).unwrap();
        let sig = extract_orientation_signals(&t);
        assert_eq!(sig.defender_side_on_score, Some(0.7));
        assert_eq!(sig.square_on_rate, Some(0.2));
        assert_eq!(sig.channeling_to_wing_rate, None);
    }

    #[test]
    fn test_fallback_column_names() {
        let mut t = Table::new(vec!["side_on_score".to_string()]).unwrap();
        t.push_row(vec![Cell::Number(0.5)]).unwrap();
        let sig = extract_orientation_signals(&t);
        assert_eq!(sig.defender_side_on_score, Some(0.5));
    }

    #[test]
    fn test_no_columns_yields_nothing() {
        let mut t = Table::new(vec!["ppda".to_string()]).unwrap();
        t.push_row(vec![Cell::Number(8.0)]).unwrap();
        assert_eq!(extract_orientation_signals(&t), OrientationSignals::default());
    }
}
