//! # Orchestrator
//!
//! Sequences one pipeline run: manifest -> capability gate -> canonical
//! mapping -> data-quality validation -> metric computation -> evidence
//! aggregation.
//!
//! The external contract is "always returns a structured result": a
//! BLOCKED or ABSTAINED run still produces the full `PipelineResult`
//! shell with empty metrics and every report populated as far as the run
//! got. Every stage is a total function over in-memory data; nothing in
//! the chain panics or returns `Err` to the caller.
//!
//! Configuration (capability catalog, alias spec) is loaded once at
//! construction and never mutated afterward, so one orchestrator can
//! serve concurrent runs from multiple threads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capability::{CapabilityCatalog, CapabilityGate, GateDecision, GateStatus};
use crate::error::RegistryError;
use crate::evidence::{self, EvidenceGraph, PipelineStatus};
use crate::manifest::InputManifest;
use crate::mapping::{AliasSpec, CanonicalMapper, MappingReport};
use crate::metrics::{self, MetricFactory, MetricOutcome, MetricValue};
use crate::registry;
use crate::table::Table;
use crate::validation::{DataQualityReport, SotValidator};

/// Analysis type the legacy entrypoint ran before it grew a parameter.
pub const DEFAULT_ANALYSIS_TYPE: &str = "player_role_fit";

const DEFAULT_ENTITY_ID: &str = "entity";

/// Run identification and caller-context echo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostics {
    pub run_id: String,
    /// UTC, RFC 3339.
    pub generated_at: String,
    pub engine_version: String,
    pub analysis_type: String,
    pub entity_id: String,
    pub provider_id: String,
    /// True when metrics were computed over the whole table because the
    /// entity filter found nothing.
    pub entity_fallback: bool,
    pub context: Map<String, Value>,
}

/// The one structure external collaborators consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    pub capability_gate: GateDecision,
    pub input_manifest: InputManifest,
    pub mapping_report: MappingReport,
    pub data_quality: DataQualityReport,
    pub metrics: Vec<MetricValue>,
    pub missing_metrics: Vec<String>,
    pub evidence_graph: EvidenceGraph,
    pub diagnostics: Diagnostics,
}

/// One pipeline instance. Construct once, run many times.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    gate: CapabilityGate,
    mapper: CanonicalMapper,
    validator: SotValidator,
    factory: MetricFactory,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Orchestrator::new()
    }
}

impl Orchestrator {
    /// Orchestrator backed by the embedded registries.
    pub fn new() -> Self {
        Orchestrator::with_registries(
            registry::embedded_capability_catalog().map(|c| c.clone()),
            registry::embedded_alias_spec().map(|s| s.clone()),
        )
    }

    /// Orchestrator from explicit registry load outcomes. A failed load
    /// is carried into the run as a DEGRADED reason, not an error here.
    pub fn with_registries(
        catalog: Result<CapabilityCatalog, RegistryError>,
        alias_spec: Result<AliasSpec, RegistryError>,
    ) -> Self {
        Orchestrator {
            gate: CapabilityGate::new(catalog),
            mapper: CanonicalMapper::new(alias_spec),
            validator: SotValidator::default(),
            factory: MetricFactory,
        }
    }

    /// Replace the data-quality validator (required columns, bounds).
    pub fn with_validator(mut self, validator: SotValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Run the pipeline once. Synchronous and fail-closed: a gate block
    /// or a data-quality failure short-circuits metric computation but
    /// still returns the full result shell.
    pub fn execute(
        &self,
        analysis_type: &str,
        table: Option<&Table>,
        entity_id: &str,
        context: &Map<String, Value>,
    ) -> PipelineResult {
        let manifest = InputManifest::build(table.is_some(), context);
        let gate_decision = self.gate.decide(analysis_type, &manifest);
        tracing::debug!(
            analysis_type,
            gate = ?gate_decision.status,
            "capability gate decided"
        );

        let (mapping_report, data_quality, outcome) = if gate_decision.status == GateStatus::Blocked
        {
            (
                MappingReport::skipped(self.mapper.provider_id(), "capability gate blocked the run"),
                DataQualityReport::skipped("capability gate blocked the run"),
                MetricOutcome { missing: metrics::all_missing(), ..Default::default() },
            )
        } else {
            self.run_table_stages(table, entity_id)
        };

        let (evidence_graph, status) = evidence::aggregate(
            &outcome.metrics,
            &outcome.missing,
            &data_quality,
            &gate_decision,
        );
        tracing::debug!(
            ?status,
            computed = outcome.metrics.len(),
            missing = outcome.missing.len(),
            "pipeline run finished"
        );

        PipelineResult {
            status,
            capability_gate: gate_decision,
            input_manifest: manifest,
            diagnostics: Diagnostics {
                run_id: uuid::Uuid::new_v4().to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                analysis_type: analysis_type.to_string(),
                entity_id: entity_id.to_string(),
                provider_id: mapping_report.provider_id.clone(),
                entity_fallback: outcome.entity_fallback,
                context: context.clone(),
            },
            mapping_report,
            data_quality,
            metrics: outcome.metrics,
            missing_metrics: outcome.missing,
            evidence_graph,
        }
    }

    /// Mapping, validation, and metric computation for an unblocked run.
    fn run_table_stages(
        &self,
        table: Option<&Table>,
        entity_id: &str,
    ) -> (MappingReport, DataQualityReport, MetricOutcome) {
        let table = match table {
            None => {
                return (
                    MappingReport::skipped(self.mapper.provider_id(), "no table provided"),
                    self.validator.validate(None),
                    MetricOutcome { missing: metrics::all_missing(), ..Default::default() },
                );
            }
            Some(t) => t,
        };

        let (canonical, mapping_report) = self.mapper.map_df(table);
        let data_quality = self.validator.validate(Some(&canonical));
        if !data_quality.ok {
            return (
                mapping_report,
                data_quality,
                MetricOutcome { missing: metrics::all_missing(), ..Default::default() },
            );
        }

        let outcome = self.factory.compute(&canonical, entity_id);
        (mapping_report, data_quality, outcome)
    }
}

/// Legacy calling convention kept as a thin adapter: fixed analysis type
/// and entity, the phase echoed through the context. New callers should
/// construct an [`Orchestrator`] and use [`Orchestrator::execute`].
pub fn execute_full_analysis(table: Option<&Table>, phase: &str) -> PipelineResult {
    let mut context = Map::new();
    context.insert("phase".to_string(), Value::String(phase.to_string()));
    Orchestrator::new().execute(DEFAULT_ANALYSIS_TYPE, table, DEFAULT_ENTITY_ID, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::ConfidenceLevel;
    use crate::table::Cell;
    use serde_json::json;

    fn ctx(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn role_fit_table(rows: usize) -> Table {
        let mut t = Table::new(vec!["player_id".to_string(), "ppda".to_string()]).unwrap();
        for i in 0..rows {
            t.push_row(vec![Cell::Text("7".to_string()), Cell::Number(8.0 + i as f64)])
                .unwrap();
        }
        t
    }

    #[test]
    fn test_scenario_event_only_table_degrades() {
        let table = role_fit_table(20);
        let result =
            Orchestrator::new().execute("player_role_fit", Some(&table), "7", &Map::new());

        assert_eq!(result.capability_gate.status, GateStatus::Degraded);
        assert_eq!(result.capability_gate.missing_inputs, vec!["spatial".to_string()]);
        assert!(result.data_quality.ok);
        assert_eq!(result.data_quality.row_count, 20);
        let ppda = result.metrics.iter().find(|m| m.metric_id == "ppda").unwrap();
        assert!((ppda.value - 17.5).abs() < 1e-9);
        assert_eq!(result.status, PipelineStatus::Degraded);
    }

    #[test]
    fn test_scenario_empty_table_abstains() {
        let table = Table::new(vec!["player_id".to_string(), "ppda".to_string()]).unwrap();
        let result =
            Orchestrator::new().execute("player_role_fit", Some(&table), "7", &Map::new());

        assert_eq!(result.status, PipelineStatus::Abstained);
        assert!(result.metrics.is_empty());
        assert!(!result.data_quality.ok);
        assert_eq!(result.data_quality.issues[0].code, "DF_EMPTY");
        assert_eq!(result.missing_metrics, metrics::all_missing());
    }

    #[test]
    fn test_scenario_missing_hard_modality_blocks() {
        // off_ball_scanning hard-requires video; the table alone only
        // provides the event modality.
        let table = role_fit_table(5);
        let result =
            Orchestrator::new().execute("off_ball_scanning", Some(&table), "7", &Map::new());

        assert_eq!(result.capability_gate.status, GateStatus::Blocked);
        assert_eq!(result.status, PipelineStatus::Blocked);
        assert!(result.metrics.is_empty());
        // The shell is still fully populated.
        assert!(result.mapping_report.warnings[0].starts_with("NOT_RUN"));
        assert!(result.data_quality.issues.iter().any(|i| i.code == "NOT_RUN"));
        assert_eq!(result.evidence_graph.overall_confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_video_flag_unblocks_scanning_analysis() {
        let table = role_fit_table(5);
        let context = ctx(json!({"mp4_path": "clip.mp4"}));
        let result =
            Orchestrator::new().execute("off_ball_scanning", Some(&table), "7", &context);
        assert_eq!(result.capability_gate.status, GateStatus::Degraded);
        assert_ne!(result.status, PipelineStatus::Blocked);
    }

    #[test]
    fn test_no_table_abstains_with_no_table_issue() {
        let context = ctx(json!({"has_event": true, "has_spatial": true}));
        let result = Orchestrator::new().execute("player_role_fit", None, "7", &context);
        assert_eq!(result.capability_gate.status, GateStatus::Ok);
        assert_eq!(result.status, PipelineStatus::Abstained);
        assert_eq!(result.data_quality.issues[0].code, "NO_TABLE");
    }

    #[test]
    fn test_unavailable_registries_still_produce_a_run() {
        let orchestrator = Orchestrator::with_registries(
            Err(RegistryError::NotFound { path: "capabilities.yaml".to_string() }),
            Err(RegistryError::NotFound { path: "provider.yaml".to_string() }),
        );
        let table = role_fit_table(3);
        let result = orchestrator.execute("player_role_fit", Some(&table), "7", &Map::new());

        assert_eq!(result.capability_gate.status, GateStatus::Degraded);
        assert!(result.capability_gate.reasons[0].starts_with("CAPABILITY_MATRIX_UNAVAILABLE"));
        assert_eq!(result.mapping_report.provider_id, "identity");
        // Identity mapping leaves raw headers in place; ppda still lands.
        assert!(result.metrics.iter().any(|m| m.metric_id == "ppda"));
    }

    #[test]
    fn test_vendor_headers_map_before_validation() {
        let mut table = Table::new(vec!["PlayerID".to_string(), "PPDA_value".to_string()]).unwrap();
        table
            .push_row(vec![Cell::Text("7".to_string()), Cell::Number(9.0)])
            .unwrap();
        let result =
            Orchestrator::new().execute("player_role_fit", Some(&table), "7", &Map::new());

        assert_eq!(
            result.mapping_report.hits.get("player_id"),
            Some(&"PlayerID".to_string())
        );
        assert!(result.data_quality.ok, "canonicalized player_id must satisfy validation");
        assert!(result.metrics.iter().any(|m| m.metric_id == "ppda"));
        assert!(!result.diagnostics.entity_fallback);
    }

    #[test]
    fn test_diagnostics_echo_context_and_identity() {
        let context = ctx(json!({"match_id": "m-311", "input_notes": "friendly"}));
        let table = role_fit_table(2);
        let result = Orchestrator::new().execute("player_role_fit", Some(&table), "7", &context);

        assert_eq!(result.diagnostics.analysis_type, "player_role_fit");
        assert_eq!(result.diagnostics.entity_id, "7");
        assert_eq!(result.diagnostics.provider_id, "generic_csv");
        assert_eq!(result.diagnostics.context["match_id"], json!("m-311"));
        assert_eq!(result.input_manifest.notes.as_deref(), Some("friendly"));
        assert!(!result.diagnostics.run_id.is_empty());
    }

    #[test]
    fn test_result_serializes_with_contract_keys() {
        let table = role_fit_table(1);
        let result = Orchestrator::new().execute("player_role_fit", Some(&table), "7", &Map::new());
        let value = serde_json::to_value(&result).unwrap();
        for key in [
            "status",
            "capability_gate",
            "input_manifest",
            "mapping_report",
            "data_quality",
            "metrics",
            "missing_metrics",
            "evidence_graph",
            "diagnostics",
        ] {
            assert!(value.get(key).is_some(), "missing contract key {key}");
        }
        assert_eq!(value["status"], json!("DEGRADED"));
    }

    #[test]
    fn test_legacy_adapter_maps_onto_execute() {
        let table = role_fit_table(4);
        let result = execute_full_analysis(Some(&table), "ACTION_GENERIC");
        assert_eq!(result.diagnostics.analysis_type, DEFAULT_ANALYSIS_TYPE);
        assert_eq!(result.diagnostics.context["phase"], json!("ACTION_GENERIC"));
        assert_eq!(result.status, PipelineStatus::Degraded);
    }
}
