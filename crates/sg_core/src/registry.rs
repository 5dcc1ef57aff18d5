//! # Registry loading
//!
//! Declarative configuration artifacts: the capability catalog and the
//! provider alias specs.
//!
//! Defaults ship compiled into the binary (`include_str!`), parsed once
//! and cached. Disk loads return `Result` so callers can tell
//! "legitimately empty" from "failed to load" and surface the failure as
//! a DEGRADED reason instead of swallowing it.

use std::path::Path;
use std::sync::OnceLock;

use crate::capability::CapabilityCatalog;
use crate::error::RegistryError;
use crate::mapping::AliasSpec;

/// Capability catalog YAML (compile-time embedded).
pub const CAPABILITIES_YAML: &str = include_str!("../../../data/registries/capabilities.yaml");

/// Generic-CSV provider alias spec YAML (compile-time embedded).
pub const PROVIDER_GENERIC_CSV_YAML: &str =
    include_str!("../../../data/registries/provider_generic_csv.yaml");

static EMBEDDED_CAPABILITIES: OnceLock<CapabilityCatalog> = OnceLock::new();
static EMBEDDED_ALIAS_SPEC: OnceLock<AliasSpec> = OnceLock::new();

/// Parse (once) and return the embedded capability catalog.
pub fn embedded_capability_catalog() -> Result<&'static CapabilityCatalog, RegistryError> {
    if let Some(catalog) = EMBEDDED_CAPABILITIES.get() {
        return Ok(catalog);
    }
    let parsed = parse_capability_catalog(CAPABILITIES_YAML, "embedded:capabilities.yaml")?;
    Ok(EMBEDDED_CAPABILITIES.get_or_init(|| parsed))
}

/// Parse (once) and return the embedded generic-CSV alias spec.
pub fn embedded_alias_spec() -> Result<&'static AliasSpec, RegistryError> {
    if let Some(spec) = EMBEDDED_ALIAS_SPEC.get() {
        return Ok(spec);
    }
    let parsed = parse_alias_spec(PROVIDER_GENERIC_CSV_YAML, "embedded:provider_generic_csv.yaml")?;
    Ok(EMBEDDED_ALIAS_SPEC.get_or_init(|| parsed))
}

/// Load a capability catalog from disk.
pub fn load_capability_catalog(path: &Path) -> Result<CapabilityCatalog, RegistryError> {
    parse_capability_catalog(&read(path)?, &path.display().to_string())
}

/// Load a provider alias spec from disk.
pub fn load_alias_spec(path: &Path) -> Result<AliasSpec, RegistryError> {
    parse_alias_spec(&read(path)?, &path.display().to_string())
}

fn parse_capability_catalog(yaml: &str, origin: &str) -> Result<CapabilityCatalog, RegistryError> {
    let catalog: CapabilityCatalog = serde_yaml::from_str(yaml)
        .map_err(|source| RegistryError::Parse { path: origin.to_string(), source })?;
    if catalog.analyses.is_empty() {
        return Err(RegistryError::Structure(format!(
            "{origin}: capability catalog declares no analyses"
        )));
    }
    Ok(catalog)
}

fn parse_alias_spec(yaml: &str, origin: &str) -> Result<AliasSpec, RegistryError> {
    let spec: AliasSpec = serde_yaml::from_str(yaml)
        .map_err(|source| RegistryError::Parse { path: origin.to_string(), source })?;
    if spec.provider_id.trim().is_empty() {
        return Err(RegistryError::Structure(format!(
            "{origin}: alias spec has an empty provider_id"
        )));
    }
    Ok(spec)
}

fn read(path: &Path) -> Result<String, RegistryError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RegistryError::NotFound { path: path.display().to_string() }
        } else {
            RegistryError::Io { path: path.display().to_string(), source }
        }
    })
}
