//! # Capability Gate
//!
//! Input-gated compute: decides BLOCKED / DEGRADED / OK from the declared
//! capability catalog and the run's input manifest, before any computation
//! starts.
//!
//! Fail-closed policy:
//! - catalog failed to load        => DEGRADED (`CAPABILITY_MATRIX_UNAVAILABLE`)
//! - analysis type not in catalog  => DEGRADED (`CAPABILITY_MATRIX_MISSING_ENTRY`)
//! - hard requirement missing      => BLOCKED (terminal for the run)
//! - soft requirement missing      => DEGRADED
//!
//! The ordering is a strict priority chain: BLOCKED dominates DEGRADED
//! dominates OK, and hard requirements are always checked before soft ones
//! regardless of catalog declaration order.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::manifest::{InputManifest, Modality};

/// Gate outcome for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateStatus {
    Ok,
    Degraded,
    Blocked,
}

/// Decision produced fresh per run; never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GateDecision {
    pub status: GateStatus,
    pub reasons: Vec<String>,
    pub missing_inputs: Vec<String>,
}

impl GateDecision {
    fn ok() -> Self {
        GateDecision { status: GateStatus::Ok, reasons: Vec::new(), missing_inputs: Vec::new() }
    }
}

/// One catalog entry: what an analysis type needs to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CapabilityRule {
    #[serde(default)]
    pub hard_requires: Vec<Modality>,
    #[serde(default)]
    pub soft_requires: Vec<Modality>,
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Declarative catalog keyed by analysis type. Loaded once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CapabilityCatalog {
    #[serde(default)]
    pub analyses: BTreeMap<String, CapabilityRule>,
}

/// The gate keeps the catalog load *outcome*, not just the catalog: a
/// broken artifact degrades every decision with an auditable reason
/// instead of disappearing into an empty map.
#[derive(Debug, Clone)]
enum CatalogState {
    Loaded(CapabilityCatalog),
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct CapabilityGate {
    catalog: CatalogState,
}

impl CapabilityGate {
    /// Build the gate from a catalog load outcome.
    pub fn new(catalog: Result<CapabilityCatalog, RegistryError>) -> Self {
        let catalog = match catalog {
            Ok(c) => CatalogState::Loaded(c),
            Err(e) => {
                tracing::warn!(error = %e, "capability catalog unavailable; gate will degrade");
                CatalogState::Unavailable(e.to_string())
            }
        };
        CapabilityGate { catalog }
    }

    /// Decide whether `analysis_type` can run against `manifest`.
    pub fn decide(&self, analysis_type: &str, manifest: &InputManifest) -> GateDecision {
        let catalog = match &self.catalog {
            CatalogState::Unavailable(reason) => {
                return GateDecision {
                    status: GateStatus::Degraded,
                    reasons: vec![format!("CAPABILITY_MATRIX_UNAVAILABLE: {reason}")],
                    missing_inputs: Vec::new(),
                };
            }
            CatalogState::Loaded(c) => c,
        };

        let rule = match catalog.analyses.get(analysis_type) {
            None => {
                return GateDecision {
                    status: GateStatus::Degraded,
                    reasons: vec![format!(
                        "CAPABILITY_MATRIX_MISSING_ENTRY: analysis_type={analysis_type}"
                    )],
                    missing_inputs: Vec::new(),
                };
            }
            Some(r) => r,
        };

        let missing_hard: Vec<&Modality> =
            rule.hard_requires.iter().filter(|m| !manifest.has(**m)).collect();
        if !missing_hard.is_empty() {
            let names: Vec<&str> = missing_hard.iter().map(|m| m.as_str()).collect();
            let mut reasons = vec![format!("MISSING_REQUIRED_INPUTS: {}", names.join(", "))];
            if let Some(why) = &rule.block_reason {
                reasons.push(why.clone());
            }
            return GateDecision {
                status: GateStatus::Blocked,
                reasons,
                missing_inputs: names.iter().map(|s| s.to_string()).collect(),
            };
        }

        let missing_soft: Vec<&Modality> =
            rule.soft_requires.iter().filter(|m| !manifest.has(**m)).collect();
        if !missing_soft.is_empty() {
            let names: Vec<&str> = missing_soft.iter().map(|m| m.as_str()).collect();
            return GateDecision {
                status: GateStatus::Degraded,
                reasons: vec![format!("MISSING_OPTIONAL_INPUTS: {}", names.join(", "))],
                missing_inputs: names.iter().map(|s| s.to_string()).collect(),
            };
        }

        GateDecision::ok()
    }
}
