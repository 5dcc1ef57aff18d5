use thiserror::Error;

/// Errors raised while loading declarative registry artifacts.
///
/// A failed load never aborts a pipeline run: callers convert it into a
/// DEGRADED reason string. The variants exist so that "legitimately empty"
/// and "failed to load" stay distinguishable.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry file not found: {path}")]
    NotFound { path: String },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("registry structure invalid: {0}")]
    Structure(String),
}

/// Errors raised while constructing an in-memory table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("duplicate column header: {name}")]
    DuplicateColumn { name: String },

    #[error("row width mismatch: expected {expected}, found {found}")]
    RowWidth { expected: usize, found: usize },
}
