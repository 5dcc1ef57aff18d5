//! # Input Manifest
//!
//! Declarative inventory of which input modalities are present for one run.
//!
//! The manifest answers exactly one question: which inputs did the caller
//! actually provide? It never sniffs file contents and never infers beyond
//! the literal flags and paths given, so the capability gate downstream
//! stays auditable.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input modality kinds the capability catalog can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Event,
    Spatial,
    Fitness,
    Video,
    Tracking,
    Doc,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Event => "event",
            Modality::Spatial => "spatial",
            Modality::Fitness => "fitness",
            Modality::Video => "video",
            Modality::Tracking => "tracking",
            Modality::Doc => "doc",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context keys that toggle each modality when present and truthy.
const EVENT_PATH_KEYS: &[&str] = &["event_path", "csv_path", "xml_path"];
const FITNESS_PATH_KEYS: &[&str] = &["xlsx_path", "fitness_path"];
const VIDEO_PATH_KEYS: &[&str] = &["mp4_path", "video_path"];
const TRACKING_PATH_KEYS: &[&str] = &["tracking_path"];
const DOC_PATH_KEYS: &[&str] =
    &["doc_paths", "pdf_path", "doc_path", "txt_path", "md_path", "html_path"];

/// Which inputs are provided for THIS run. Immutable after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputManifest {
    /// CSV/XML event log, or an event table supplied directly.
    pub has_event: bool,
    /// Event x,y present and explicitly trusted by the caller.
    pub has_spatial: bool,
    /// XLSX / GPS / load data.
    pub has_fitness: bool,
    /// Match video.
    pub has_video: bool,
    /// Explicit tracking feed.
    pub has_tracking: bool,
    /// PDF/TXT/MD/DOCX/HTML context inputs.
    pub has_doc: bool,
    pub notes: Option<String>,
}

impl InputManifest {
    /// Build the manifest from the caller's declared context, without
    /// guessing. A modality is present iff its explicit boolean flag is
    /// truthy, or one of its path keys is truthy, or (`event` only) a
    /// table was supplied directly.
    ///
    /// `spatial` is the strict exception: only its explicit flag counts.
    /// Trusting coordinates is a decision for after data-quality checks,
    /// not an inference the manifest is allowed to make.
    pub fn build(table_provided: bool, context: &Map<String, Value>) -> Self {
        let flag = |key: &str| truthy(context.get(key));
        let any_path = |keys: &[&str]| keys.iter().any(|k| truthy(context.get(*k)));

        let notes = context
            .get("input_notes")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        InputManifest {
            has_event: flag("has_event") || any_path(EVENT_PATH_KEYS) || table_provided,
            has_spatial: flag("has_spatial"),
            has_fitness: flag("has_fitness") || any_path(FITNESS_PATH_KEYS),
            has_video: flag("has_video") || any_path(VIDEO_PATH_KEYS),
            has_tracking: flag("has_tracking") || any_path(TRACKING_PATH_KEYS),
            has_doc: flag("has_doc") || any_path(DOC_PATH_KEYS),
            notes,
        }
    }

    /// Whether the given modality is present.
    pub fn has(&self, modality: Modality) -> bool {
        match modality {
            Modality::Event => self.has_event,
            Modality::Spatial => self.has_spatial,
            Modality::Fitness => self.has_fitness,
            Modality::Video => self.has_video,
            Modality::Tracking => self.has_tracking,
            Modality::Doc => self.has_doc,
        }
    }
}

/// Truthiness for declared context values: absent and `null` are false,
/// booleans count as themselves, strings must be non-blank, collections
/// must be non-empty, numbers are true.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Number(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_empty_context_declares_nothing() {
        let m = InputManifest::build(false, &Map::new());
        assert_eq!(m, InputManifest::default());
    }

    #[test]
    fn test_table_supplied_counts_as_event_only() {
        let m = InputManifest::build(true, &Map::new());
        assert!(m.has_event);
        assert!(!m.has_spatial);
        assert!(!m.has_fitness);
    }

    #[test]
    fn test_paths_toggle_modalities() {
        let m = InputManifest::build(
            false,
            &ctx(json!({
                "csv_path": "match.csv",
                "mp4_path": "clip.mp4",
                "doc_paths": ["scout.pdf"],
            })),
        );
        assert!(m.has_event);
        assert!(m.has_video);
        assert!(m.has_doc);
        assert!(!m.has_tracking);
    }

    #[test]
    fn test_blank_and_empty_values_are_not_provision() {
        let m = InputManifest::build(
            false,
            &ctx(json!({
                "csv_path": "   ",
                "doc_paths": [],
                "has_video": false,
                "tracking_path": null,
            })),
        );
        assert_eq!(m, InputManifest::default());
    }

    #[test]
    fn test_spatial_requires_explicit_flag() {
        // A coordinate-bearing path key must not imply trusted spatial data.
        let m = InputManifest::build(true, &ctx(json!({"tracking_path": "feed.jsonl"})));
        assert!(m.has_tracking);
        assert!(!m.has_spatial);

        let m = InputManifest::build(true, &ctx(json!({"has_spatial": true})));
        assert!(m.has_spatial);
    }

    #[test]
    fn test_notes_pass_through() {
        let m = InputManifest::build(false, &ctx(json!({"input_notes": "second-half only"})));
        assert_eq!(m.notes.as_deref(), Some("second-half only"));
    }
}
