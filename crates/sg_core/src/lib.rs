//! # sg_core - Evidence-Gated Football Analytics Pipeline
//!
//! Turns decoded event-log tables into gated analytical claims under a
//! strict "never fabricate" discipline: a run degrades or abstains
//! instead of presenting computed-looking values without evidence.
//!
//! One run flows through six stages, each materialized fully before the
//! next starts:
//! 1. input manifest from the caller's declared flags and paths
//! 2. capability gate against the declarative catalog
//! 3. canonical header mapping via the provider alias spec
//! 4. non-destructive data-quality validation
//! 5. metric computation with explicit missing-metric tracking
//! 6. evidence/confidence aggregation into one auditable status
//!
//! The result is always a structured [`PipelineResult`] - BLOCKED and
//! ABSTAINED runs return the same shell as OK runs, with the reasons
//! spelled out in the gate decision, the data-quality issues, and the
//! missing-metrics list.

pub mod capability;
pub mod error;
pub mod evidence;
pub mod manifest;
pub mod mapping;
pub mod metrics;
pub mod orchestrator;
pub mod registry;
pub mod table;
pub mod validation;


pub use capability::{CapabilityCatalog, CapabilityGate, CapabilityRule, GateDecision, GateStatus};
pub use error::{RegistryError, TableError};
pub use evidence::{ConfidenceLevel, EvidenceGraph, EvidenceNode, Hypothesis, PipelineStatus};
pub use manifest::{InputManifest, Modality};
pub use mapping::{AliasSpec, CanonicalMapper, ColumnSpec, MappingReport};
pub use metrics::{MetricFactory, MetricValue, BUNDLE_METRICS, CORE_METRICS};
pub use orchestrator::{execute_full_analysis, Diagnostics, Orchestrator, PipelineResult};
pub use table::{Cell, Table};
pub use validation::{DataQualityReport, SotValidator, Severity, ValidationIssue};
