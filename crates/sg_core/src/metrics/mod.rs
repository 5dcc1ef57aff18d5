//! # Metric Factory
//!
//! Computes the player-role-fit metric bundle from a canonical table,
//! tracking per-metric success instead of substituting defaults.
//!
//! - `baseline`    - safe aggregates over canonical columns
//! - `cognitive`   - decision speed / scanning proxies
//! - `orientation` - body-orientation proxies from tracking columns
//!
//! A metric produces a `MetricValue` only when at least one non-null
//! numeric observation backs it; otherwise its id lands in the `missing`
//! list. Composites need every constituent computed.

pub mod baseline;
pub mod cognitive;
pub mod orientation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::metrics::baseline::{safe_mean, safe_mean_any};
use crate::metrics::cognitive::extract_cognitive_signals;
use crate::metrics::orientation::extract_orientation_signals;
use crate::table::Table;

/// Core metrics: the baseline evidence a role-fit claim stands on.
/// Confidence banding downstream counts missing entries of this set.
pub const CORE_METRICS: &[&str] = &[
    "xt_value",
    "ppda",
    "turnover_danger_index",
    "progressive_carries_90",
    "line_break_passes_90",
    "half_space_receives",
];

/// Every metric id the bundle can emit, in computation order.
pub const BUNDLE_METRICS: &[&str] = &[
    "xt_value",
    "ppda",
    "turnover_danger_index",
    "progressive_carries_90",
    "line_break_passes_90",
    "half_space_receives",
    "progression_index",
    "decision_speed_mean_s",
    "scan_freq_10s",
    "contextual_awareness_score",
    "defender_side_on_score",
    "square_on_rate",
    "channeling_to_wing_rate",
];

/// Weights of the progression composite.
const PROGRESSION_CARRY_WEIGHT: f64 = 0.6;
const PROGRESSION_LINE_BREAK_WEIGHT: f64 = 0.4;

/// One successfully computed metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricValue {
    pub metric_id: String,
    pub value: f64,
    pub sample_size: Option<f64>,
    pub unit: Option<String>,
    pub source: String,
}

/// Result of one metric-factory pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricOutcome {
    pub metrics: Vec<MetricValue>,
    /// Metric ids with no evidence, sorted.
    pub missing: Vec<String>,
    /// True when the entity filter fell back to the whole table.
    pub entity_fallback: bool,
}

/// Computes the fixed metric bundle for one entity.
#[derive(Debug, Clone, Default)]
pub struct MetricFactory;

impl MetricFactory {
    /// Compute the bundle over `df` for `entity_id`.
    ///
    /// Rows are filtered by `player_id` equality when the column exists
    /// and the filter matches at least one row. Otherwise the whole table
    /// is analyzed and `entity_fallback` is set; the fallback is a
    /// deliberate lenient policy, flagged so consumers can tell the two
    /// apart.
    pub fn compute(&self, df: &Table, entity_id: &str) -> MetricOutcome {
        let (df_e, entity_fallback) = match df.filter_eq("player_id", entity_id) {
            Some(filtered) if !filtered.is_empty() => (filtered, false),
            _ => (df.clone(), true),
        };

        let minutes = safe_mean(&df_e, "minutes");
        let mut metrics: Vec<MetricValue> = Vec::new();
        let mut missing: Vec<String> = Vec::new();

        let add = |id: &str, value: Option<f64>, unit: Option<&str>, metrics: &mut Vec<MetricValue>, missing: &mut Vec<String>| {
            match value {
                Some(v) => metrics.push(MetricValue {
                    metric_id: id.to_string(),
                    value: v,
                    sample_size: minutes,
                    unit: unit.map(|u| u.to_string()),
                    source: "event_table".to_string(),
                }),
                None => missing.push(id.to_string()),
            }
        };

        let xt = safe_mean_any(&df_e, &["xt_value", "xT"]);
        let ppda = safe_mean(&df_e, "ppda");
        let tdi = safe_mean_any(&df_e, &["turnover_danger_index", "turnover_danger_90"]);
        let prog = safe_mean(&df_e, "progressive_carries_90");
        let lbreak = safe_mean(&df_e, "line_break_passes_90");
        let hs = safe_mean(&df_e, "half_space_receives");

        add("xt_value", xt, None, &mut metrics, &mut missing);
        add("ppda", ppda, None, &mut metrics, &mut missing);
        add("turnover_danger_index", tdi, None, &mut metrics, &mut missing);
        add("progressive_carries_90", prog, None, &mut metrics, &mut missing);
        add("line_break_passes_90", lbreak, None, &mut metrics, &mut missing);
        add("half_space_receives", hs, None, &mut metrics, &mut missing);

        // Composite: both constituents or nothing.
        let progression = match (prog, lbreak) {
            (Some(p), Some(l)) => {
                Some(PROGRESSION_CARRY_WEIGHT * p + PROGRESSION_LINE_BREAK_WEIGHT * l)
            }
            _ => None,
        };
        add("progression_index", progression, None, &mut metrics, &mut missing);

        let cog = extract_cognitive_signals(&df_e);
        add("decision_speed_mean_s", cog.decision_speed_mean_s, Some("s"), &mut metrics, &mut missing);
        add("scan_freq_10s", cog.scan_freq_10s, Some("per_s"), &mut metrics, &mut missing);
        add(
            "contextual_awareness_score",
            cog.contextual_awareness_score,
            Some("0_1"),
            &mut metrics,
            &mut missing,
        );

        let ori = extract_orientation_signals(&df_e);
        add("defender_side_on_score", ori.defender_side_on_score, Some("0_1"), &mut metrics, &mut missing);
        add("square_on_rate", ori.square_on_rate, Some("0_1"), &mut metrics, &mut missing);
        add(
            "channeling_to_wing_rate",
            ori.channeling_to_wing_rate,
            Some("0_1"),
            &mut metrics,
            &mut missing,
        );

        missing.sort();
        missing.dedup();
        MetricOutcome { metrics, missing, entity_fallback }
    }
}

/// The `missing` list of a run where metric computation never started.
pub fn all_missing() -> Vec<String> {
    let mut ids: Vec<String> = BUNDLE_METRICS.iter().map(|s| s.to_string()).collect();
    ids.sort();
    ids
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

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    #[test]
    fn test_entity_filter_applies() {
        let t = table(
            &["player_id", "ppda", "minutes"],
            &[
                &[Cell::Text("7".to_string()), num(8.0), num(90.0)],
                &[Cell::Text("9".to_string()), num(20.0), num(45.0)],
            ],
        );
        let out = MetricFactory.compute(&t, "7");
        assert!(!out.entity_fallback);
        let ppda = out.metrics.iter().find(|m| m.metric_id == "ppda").unwrap();
        assert_eq!(ppda.value, 8.0);
        assert_eq!(ppda.sample_size, Some(90.0));
        assert_eq!(ppda.source, "event_table");
    }

    #[test]
    fn test_unknown_entity_falls_back_to_whole_table() {
        let t = table(
            &["player_id", "ppda"],
            &[
                &[Cell::Text("7".to_string()), num(8.0)],
                &[Cell::Text("9".to_string()), num(12.0)],
            ],
        );
        let out = MetricFactory.compute(&t, "99");
        assert!(out.entity_fallback);
        let ppda = out.metrics.iter().find(|m| m.metric_id == "ppda").unwrap();
        assert_eq!(ppda.value, 10.0);
    }

    #[test]
    fn test_absent_metric_is_missing_not_defaulted() {
        let t = table(
            &["player_id", "ppda"],
            &[&[Cell::Text("7".to_string()), num(8.0)]],
        );
        let out = MetricFactory.compute(&t, "7");
        assert!(!out.metrics.iter().any(|m| m.metric_id == "xt_value"));
        assert!(out.missing.contains(&"xt_value".to_string()));
        // sample_size stays absent without a minutes column.
        assert_eq!(out.metrics[0].sample_size, None);
    }

    #[test]
    fn test_all_null_column_is_missing() {
        let t = table(
            &["player_id", "xt_value"],
            &[
                &[Cell::Text("7".to_string()), Cell::Null],
                &[Cell::Text("7".to_string()), Cell::Text("".to_string())],
            ],
        );
        let out = MetricFactory.compute(&t, "7");
        assert!(out.missing.contains(&"xt_value".to_string()));
    }

    #[test]
    fn test_zero_valued_column_is_computed() {
        let t = table(
            &["player_id", "xt_value"],
            &[&[Cell::Text("7".to_string()), num(0.0)]],
        );
        let out = MetricFactory.compute(&t, "7");
        let xt = out.metrics.iter().find(|m| m.metric_id == "xt_value").unwrap();
        assert_eq!(xt.value, 0.0);
        assert!(!out.missing.contains(&"xt_value".to_string()));
    }

    #[test]
    fn test_composite_needs_every_constituent() {
        let t = table(
            &["player_id", "progressive_carries_90"],
            &[&[Cell::Text("7".to_string()), num(5.0)]],
        );
        let out = MetricFactory.compute(&t, "7");
        assert!(out.missing.contains(&"progression_index".to_string()));

        let t = table(
            &["player_id", "progressive_carries_90", "line_break_passes_90"],
            &[&[Cell::Text("7".to_string()), num(5.0), num(10.0)]],
        );
        let out = MetricFactory.compute(&t, "7");
        let pi = out.metrics.iter().find(|m| m.metric_id == "progression_index").unwrap();
        assert!((pi.value - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_column_set_for_turnover_danger() {
        let t = table(
            &["player_id", "turnover_danger_90"],
            &[&[Cell::Text("7".to_string()), num(3.0)]],
        );
        let out = MetricFactory.compute(&t, "7");
        let tdi = out.metrics.iter().find(|m| m.metric_id == "turnover_danger_index").unwrap();
        assert_eq!(tdi.value, 3.0);
    }

    #[test]
    fn test_missing_list_is_sorted_and_unique() {
        let t = table(&["player_id"], &[&[Cell::Text("7".to_string())]]);
        let out = MetricFactory.compute(&t, "7");
        assert!(out.metrics.is_empty());
        let mut expected = out.missing.clone();
        expected.sort();
        expected.dedup();
        assert_eq!(out.missing, expected);
        assert_eq!(out.missing, all_missing());
    }
}
