//! # Canonical Mapper
//!
//! Maps arbitrary vendor column headers onto canonical field names using a
//! declarative alias spec.
//!
//! Rules:
//! - matching is case-insensitive on trimmed headers;
//! - the canonical key itself is tried before any alias;
//! - aliases are tried in declared order, first match wins;
//! - only matched columns are relabeled; unmatched source columns and all
//!   rows are kept;
//! - mapping never fails — an unmapped canonical key is a MISS that
//!   surfaces later as a missing metric, and a broken alias spec degrades
//!   to identity pass-through with a warning.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::table::Table;

/// One canonical key's accepted vendor spellings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSpec {
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Declarative alias spec for one provider. `BTreeMap` keys give the
/// canonical-key iteration a fixed order, so mapping is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AliasSpec {
    pub provider_id: String,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnSpec>,
}

/// Report of one mapping pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MappingReport {
    pub provider_id: String,
    /// canonical key -> source column that matched it.
    pub hits: BTreeMap<String, String>,
    /// source column -> canonical key it was relabeled to.
    pub rename_map: BTreeMap<String, String>,
    /// Required canonical keys with no match under any alias.
    pub missing_required: Vec<String>,
    pub ok: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl MappingReport {
    /// Shell report for a mapping pass that never ran (gate blocked the
    /// run, or no table was supplied).
    pub fn skipped(provider_id: &str, reason: &str) -> Self {
        MappingReport {
            provider_id: provider_id.to_string(),
            hits: BTreeMap::new(),
            rename_map: BTreeMap::new(),
            missing_required: Vec::new(),
            ok: false,
            warnings: vec![format!("NOT_RUN: {reason}")],
        }
    }
}

#[derive(Debug, Clone)]
enum SpecState {
    Loaded(AliasSpec),
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct CanonicalMapper {
    spec: SpecState,
}

impl CanonicalMapper {
    /// Build the mapper from an alias-spec load outcome. A failed load is
    /// kept as a reason string so `map_df` can degrade to identity
    /// pass-through instead of hard-failing on unknown providers.
    pub fn new(spec: Result<AliasSpec, RegistryError>) -> Self {
        let spec = match spec {
            Ok(s) => SpecState::Loaded(s),
            Err(e) => {
                tracing::warn!(error = %e, "alias spec unavailable; mapping degrades to identity");
                SpecState::Unavailable(e.to_string())
            }
        };
        CanonicalMapper { spec }
    }

    pub fn provider_id(&self) -> &str {
        match &self.spec {
            SpecState::Loaded(s) => &s.provider_id,
            SpecState::Unavailable(_) => "identity",
        }
    }

    /// Canonicalize `df` headers. Returns the relabeled table and the
    /// mapping report; the input table is untouched.
    pub fn map_df(&self, df: &Table) -> (Table, MappingReport) {
        let spec = match &self.spec {
            SpecState::Unavailable(reason) => {
                let report = MappingReport {
                    provider_id: "identity".to_string(),
                    hits: BTreeMap::new(),
                    rename_map: BTreeMap::new(),
                    missing_required: Vec::new(),
                    ok: true,
                    warnings: vec![format!("ALIAS_SPEC_UNAVAILABLE: {reason}")],
                };
                return (df.clone(), report);
            }
            SpecState::Loaded(s) => s,
        };

        // Normalized header -> original header; first occurrence wins.
        let mut header_map: BTreeMap<String, String> = BTreeMap::new();
        for c in df.columns() {
            header_map.entry(norm(c)).or_insert_with(|| c.clone());
        }

        let mut hits: BTreeMap<String, String> = BTreeMap::new();
        let mut rename_map: BTreeMap<String, String> = BTreeMap::new();
        let mut missing_required: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        for (canonical_key, column_spec) in &spec.columns {
            let mut found: Option<&String> = header_map.get(&norm(canonical_key));
            if found.is_none() {
                for alias in &column_spec.aliases {
                    if let Some(original) = header_map.get(&norm(alias)) {
                        found = Some(original);
                        break;
                    }
                }
            }

            match found {
                None => {
                    if column_spec.required {
                        missing_required.push(canonical_key.clone());
                    }
                }
                Some(source) => {
                    hits.insert(canonical_key.clone(), source.clone());
                    if source != canonical_key {
                        if let Some(prior) = rename_map.get(source) {
                            // Two canonical keys claiming one source column:
                            // keep the first claim, report the conflict.
                            warnings.push(format!(
                                "AMBIGUOUS_SOURCE_COLUMN: {source} already mapped to {prior}, \
                                 not renaming to {canonical_key}"
                            ));
                        } else {
                            rename_map.insert(source.clone(), canonical_key.clone());
                        }
                    }
                }
            }
        }

        let mut out = df.clone();
        out.rename_columns(&rename_map);

        let report = MappingReport {
            provider_id: spec.provider_id.clone(),
            hits,
            rename_map,
            missing_required: missing_required.clone(),
            ok: missing_required.is_empty(),
            warnings,
        };
        (out, report)
    }
}

fn norm(s: &str) -> String {
    s.trim().to_lowercase()
}
