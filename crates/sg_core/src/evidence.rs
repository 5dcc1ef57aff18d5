//! # Evidence Aggregator
//!
//! Folds metric coverage, data quality, and the gate decision into one
//! pipeline status, one confidence band, and an auditable evidence graph.
//!
//! The status decision table is a priority chain, first match wins:
//! 1. gate BLOCKED                  => BLOCKED
//! 2. data quality not ok           => ABSTAINED
//! 3. every core metric missing     => ABSTAINED
//! 4. anything missing              => DEGRADED
//! 5. otherwise                     => OK
//!
//! Confidence banding is monotonic in missing evidence: adding a missing
//! core metric can only keep or lower the band, never raise it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::capability::{GateDecision, GateStatus};
use crate::metrics::{MetricValue, CORE_METRICS};
use crate::validation::{DataQualityReport, Severity};

/// Overall pipeline outcome, strictly ordered OK > DEGRADED > ABSTAINED
/// > BLOCKED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineStatus {
    Ok,
    Degraded,
    Abstained,
    Blocked,
}

impl PipelineStatus {
    /// Position in the status order; higher is better.
    pub fn rank(&self) -> u8 {
        match self {
            PipelineStatus::Blocked => 0,
            PipelineStatus::Abstained => 1,
            PipelineStatus::Degraded => 2,
            PipelineStatus::Ok => 3,
        }
    }
}

/// Coarse confidence band reported alongside the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// What a graph node records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Metric,
    DataQuality,
}

/// One piece of evidence referenced by hypotheses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceNode {
    pub id: String,
    pub kind: EvidenceKind,
    pub title: String,
    pub payload: serde_json::Value,
}

/// A claim with its supporting and contradicting evidence references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hypothesis {
    pub id: String,
    pub claim: String,
    pub confidence: ConfidenceLevel,
    pub supporting: Vec<String>,
    pub contradicting: Vec<String>,
}

/// Derived per run; holds no independent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceGraph {
    pub overall_confidence: ConfidenceLevel,
    pub hypotheses: Vec<Hypothesis>,
    pub nodes: Vec<EvidenceNode>,
    /// Core metric ids missing from this run.
    pub missing_required: Vec<String>,
}

/// Build the evidence graph and decide the pipeline status.
pub fn aggregate(
    metrics: &[MetricValue],
    missing: &[String],
    data_quality: &DataQualityReport,
    gate: &GateDecision,
) -> (EvidenceGraph, PipelineStatus) {
    let missing_core: Vec<String> = missing
        .iter()
        .filter(|m| CORE_METRICS.contains(&m.as_str()))
        .cloned()
        .collect();

    let status = decide_status(&missing_core, missing, data_quality, gate);
    let confidence = band_confidence(&missing_core, gate);

    let mut nodes: Vec<EvidenceNode> = Vec::new();
    for m in metrics {
        nodes.push(EvidenceNode {
            id: format!("metric:{}", m.metric_id),
            kind: EvidenceKind::Metric,
            title: m.metric_id.clone(),
            payload: serde_json::json!({
                "value": m.value,
                "sample_size": m.sample_size,
                "source": m.source,
            }),
        });
    }
    let issue_codes: Vec<&str> = data_quality.issues.iter().map(|i| i.code.as_str()).collect();
    nodes.push(EvidenceNode {
        id: "dq:validation".to_string(),
        kind: EvidenceKind::DataQuality,
        title: "data quality validation".to_string(),
        payload: serde_json::json!({
            "ok": data_quality.ok,
            "row_count": data_quality.row_count,
            "issues": issue_codes,
        }),
    });

    let coverage = Hypothesis {
        id: "h_evidence_coverage".to_string(),
        claim: format!(
            "metric evidence covers the role-fit bundle ({} computed, {} missing)",
            metrics.len(),
            missing.len()
        ),
        confidence,
        supporting: metrics.iter().map(|m| format!("metric:{}", m.metric_id)).collect(),
        contradicting: missing.iter().map(|m| format!("missing:{m}")).collect(),
    };

    let has_warns = data_quality.issues.iter().any(|i| i.severity == Severity::Warn);
    let reliability = Hypothesis {
        id: "h_data_reliability".to_string(),
        claim: format!(
            "the source table is reliable enough to report on ({} rows)",
            data_quality.row_count
        ),
        confidence: if !data_quality.ok {
            ConfidenceLevel::Low
        } else if has_warns {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        },
        supporting: if data_quality.ok { vec!["dq:validation".to_string()] } else { Vec::new() },
        contradicting: data_quality.issues.iter().map(|i| format!("issue:{}", i.code)).collect(),
    };

    let graph = EvidenceGraph {
        overall_confidence: confidence,
        hypotheses: vec![coverage, reliability],
        nodes,
        missing_required: missing_core,
    };
    (graph, status)
}

fn decide_status(
    missing_core: &[String],
    missing: &[String],
    data_quality: &DataQualityReport,
    gate: &GateDecision,
) -> PipelineStatus {
    if gate.status == GateStatus::Blocked {
        return PipelineStatus::Blocked;
    }
    if !data_quality.ok {
        return PipelineStatus::Abstained;
    }
    if missing_core.len() == CORE_METRICS.len() {
        return PipelineStatus::Abstained;
    }
    if !missing.is_empty() {
        return PipelineStatus::Degraded;
    }
    PipelineStatus::Ok
}

/// high needs full core coverage and a clean gate; medium tolerates up
/// to a third of the core missing or a degraded gate; everything else
/// is low.
fn band_confidence(missing_core: &[String], gate: &GateDecision) -> ConfidenceLevel {
    let core = CORE_METRICS.len();
    if missing_core.is_empty() && gate.status == GateStatus::Ok {
        ConfidenceLevel::High
    } else if missing_core.len() <= std::cmp::max(1, core / 3)
        || gate.status == GateStatus::Degraded
    {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
