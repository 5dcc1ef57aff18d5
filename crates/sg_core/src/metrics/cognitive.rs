//! Cognitive proxy signals from event timing and scanning columns.
//!
//! Decision speed comes from timestamp deltas, scan frequency from the
//! scan columns when a vendor provides them. The awareness score is a
//! banded composite of the two and needs BOTH constituents; with only
//! one present it stays absent rather than scoring a partial picture.

use crate::metrics::baseline::{mean_delta, safe_mean};
use crate::table::Table;

/// Extracted cognitive proxies. `None` always means "no evidence".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CognitiveSignals {
    pub decision_speed_mean_s: Option<f64>,
    pub scan_freq_10s: Option<f64>,
    pub contextual_awareness_score: Option<f64>,
}

/// Timestamp column pairs tried in order for decision speed.
const TIMESTAMP_PAIRS: &[(&str, &str)] = &[("timestamp_start", "timestamp_end"), ("t1", "t2")];

pub fn extract_cognitive_signals(df: &Table) -> CognitiveSignals {
    if df.is_empty() {
        return CognitiveSignals::default();
    }

    let decision_speed = TIMESTAMP_PAIRS
        .iter()
        .find_map(|(start, end)| mean_delta(df, start, end));

    // Direct frequency column first, then the per-10s count variant.
    let scan = safe_mean(df, "scan_freq_10s")
        .or_else(|| safe_mean(df, "scan_count_10s").map(|c| c / 10.0));

    let awareness = match (decision_speed, scan) {
        (Some(ds), Some(sc)) => {
            Some(0.55 * scan_band(sc) + 0.45 * decision_speed_band(ds))
        }
        _ => None,
    };

    CognitiveSignals {
        decision_speed_mean_s: decision_speed,
        scan_freq_10s: scan,
        contextual_awareness_score: awareness,
    }
}

/// Faster decisions score higher. Elite < 0.8s, average < 1.2s.
fn decision_speed_band(ds: f64) -> f64 {
    if ds <= 0.6 {
        0.90
    } else if ds <= 0.8 {
        0.75
    } else if ds <= 1.2 {
        0.55
    } else {
        0.35
    }
}

/// More scans per 10s window score higher.
fn scan_band(scan: f64) -> f64 {
    if scan >= 0.8 {
        0.90
    } else if scan >= 0.4 {
        0.60
    } else {
        0.35
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn table(cols: &[&str], rows: &[&[Cell]]) -> Table {
        let mut t = Table::new(cols.iter().map(|s| s.to_string()).collect()).unwrap();
        for r in rows {
            t.push_row(r.to_vec()).unwrap();
        }
        t
    }

    #[test]
    fn test_decision_speed_prefers_timestamp_pair() {
        let t = table(
            &["timestamp_start", "timestamp_end", "t1", "t2"],
            &[&[Cell::Number(0.0), Cell::Number(0.7), Cell::Number(0.0), Cell::Number(5.0)]],
        );
        let sig = extract_cognitive_signals(&t);
        assert_eq!(sig.decision_speed_mean_s, Some(0.7));
    }

    #[test]
    fn test_decision_speed_falls_back_to_t1_t2() {
        let t = table(&["t1", "t2"], &[&[Cell::Number(1.0), Cell::Number(2.5)]]);
        let sig = extract_cognitive_signals(&t);
        assert_eq!(sig.decision_speed_mean_s, Some(1.5));
    }

    #[test]
    fn test_scan_count_converts_to_frequency() {
        let t = table(&["scan_count_10s"], &[&[Cell::Number(6.0)], &[Cell::Number(8.0)]]);
        let sig = extract_cognitive_signals(&t);
        assert_eq!(sig.scan_freq_10s, Some(0.7));
    }

    #[test]
    fn test_awareness_needs_both_constituents() {
        let only_scan = table(&["scan_freq_10s"], &[&[Cell::Number(0.9)]]);
        let sig = extract_cognitive_signals(&only_scan);
        assert!(sig.scan_freq_10s.is_some());
        assert_eq!(sig.contextual_awareness_score, None);

        let only_speed = table(&["t1", "t2"], &[&[Cell::Number(0.0), Cell::Number(0.5)]]);
        let sig = extract_cognitive_signals(&only_speed);
        assert!(sig.decision_speed_mean_s.is_some());
        assert_eq!(sig.contextual_awareness_score, None);
    }

    #[test]
    fn test_awareness_banding() {
        // Elite on both axes: 0.55*0.90 + 0.45*0.90 = 0.90.
        let t = table(
            &["timestamp_start", "timestamp_end", "scan_freq_10s"],
            &[&[Cell::Number(0.0), Cell::Number(0.5), Cell::Number(1.0)]],
        );
        let sig = extract_cognitive_signals(&t);
        let score = sig.contextual_awareness_score.unwrap();
        assert!((score - 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_no_columns_yields_nothing() {
        let t = table(&["ppda"], &[&[Cell::Number(8.0)]]);
        assert_eq!(extract_cognitive_signals(&t), CognitiveSignals::default());
    }
}
