//! # Tag Vocabulary and Schema Loading
//!
//! The schema file on disk is incomplete: the allowed values of each `tags`
//! item are spliced in from the tag vocabulary at load time. Both files are
//! therefore always loaded together, fresh, at the start of every run.
//!
//! Loading a schema happens in three steps:
//!
//! 1. parse the YAML document and inject the tag enum at
//!    `properties.tags.items.enum`;
//! 2. compile the merged document with the `jsonschema` crate as a draft-07
//!    schema, which checks it against the draft-07 meta-schema;
//! 3. compile it into the explicit constraint tree that performs every
//!    structural check on documents.
//!
//! Any failure along the way is a [`ConfigError`] and aborts the run.

use std::path::{Path, PathBuf};

use serde_json::Value;

use vaultlint_core::{ConfigError, Record};

use crate::node::SchemaNode;
use crate::structural::Violation;

/// JSON Pointer of the object that receives the tag enum.
const TAG_ITEMS_POINTER: &str = "/properties/tags/items";

/// Read the tag vocabulary: the keys of a top-level YAML mapping, in file
/// order. Values are descriptions and are ignored.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, is not YAML, is not a
/// mapping, or has a key that is not a scalar.
pub fn load_tags(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    let document: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?;

    let serde_yaml::Value::Mapping(map) = document else {
        return Err(ConfigError::NotAMapping {
            path: path.display().to_string(),
        });
    };

    let tags = map
        .keys()
        .map(|key| match key {
            serde_yaml::Value::String(s) => Ok(s.clone()),
            serde_yaml::Value::Number(n) => Ok(n.to_string()),
            serde_yaml::Value::Bool(b) => Ok(b.to_string()),
            other => Err(ConfigError::parse(
                path,
                format!("unsupported tag key: {other:?}"),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(path = %path.display(), tag_count = tags.len(), "loaded tag vocabulary");
    Ok(tags)
}

/// Read a schema file and merge `tags` into it.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing or unparsable, or if the
/// merged document is not a usable draft-07 schema.
pub fn load_schema(path: &Path, tags: &[String]) -> Result<MergedSchema, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    let document: Value =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?;
    if !document.is_object() {
        return Err(ConfigError::NotAMapping {
            path: path.display().to_string(),
        });
    }
    MergedSchema::from_document(document, tags, path)
}

/// Load the tag vocabulary and the schema as one unit.
pub fn load_merged_schema(
    schema_path: &Path,
    tags_path: &Path,
) -> Result<MergedSchema, ConfigError> {
    let tags = load_tags(tags_path)?;
    load_schema(schema_path, &tags)
}

/// A schema document with the tag vocabulary merged in, compiled and ready
/// to validate records.
///
/// Immutable once built; one instance serves a whole run.
#[derive(Debug)]
pub struct MergedSchema {
    source: PathBuf,
    document: Value,
    root: SchemaNode,
}

impl MergedSchema {
    /// Merge `tags` into an already-parsed schema document and compile it.
    ///
    /// `source` is used only for diagnostics.
    pub fn from_document(
        mut document: Value,
        tags: &[String],
        source: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let source = source.as_ref();

        let items = document
            .pointer_mut(TAG_ITEMS_POINTER)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                ConfigError::invalid_schema(
                    source,
                    format!("no object at {TAG_ITEMS_POINTER} to receive the tag vocabulary"),
                )
            })?;
        items.insert(
            "enum".to_string(),
            Value::Array(tags.iter().cloned().map(Value::String).collect()),
        );

        check_draft7(&document, source)?;

        let root = SchemaNode::compile(&document)
            .map_err(|e| ConfigError::invalid_schema(source, e))?;

        tracing::debug!(
            path = %source.display(),
            tag_count = tags.len(),
            "compiled merged schema"
        );

        Ok(Self {
            source: source.to_path_buf(),
            document,
            root,
        })
    }

    /// Path the schema was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The merged schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The tag vocabulary as merged into the schema.
    pub fn tags(&self) -> Vec<&str> {
        self.document
            .pointer(TAG_ITEMS_POINTER)
            .and_then(|items| items.get("enum"))
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// The compiled constraint tree.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Run every structural constraint over `record`.
    ///
    /// Returns all violations, ordered by field path.
    pub fn validate(&self, record: &Record) -> Vec<Violation> {
        self.root.record_violations(record)
    }
}

/// Compile the document as a draft-07 schema with the `jsonschema` crate,
/// which rejects documents that do not conform to the draft-07 meta-schema.
fn check_draft7(document: &Value, source: &Path) -> Result<(), ConfigError> {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.build(document).map(|_| ()).map_err(|e| {
        ConfigError::invalid_schema(source, format!("not a valid draft-07 schema: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn minimal_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "tags": {"type": "array", "items": {"type": "string", "enum": []}}
            }
        })
    }

    #[test]
    fn load_tags_returns_keys_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "tags.yml",
            "research/issue: Issue research\nplan: Plans\nconcept:\n",
        );
        assert_eq!(load_tags(&path).unwrap(), vec!["research/issue", "plan", "concept"]);
    }

    #[test]
    fn load_tags_missing_file() {
        let err = load_tags(Path::new("/nonexistent/vaultlint/tags.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_tags_rejects_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "tags.yml", "- plan\n- concept\n");
        let err = load_tags(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { .. }));
    }

    #[test]
    fn load_tags_rejects_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "tags.yml", "plan: [unclosed\n");
        let err = load_tags(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn merge_injects_tag_enum() {
        let tags = vec!["plan".to_string(), "concept".to_string()];
        let schema = MergedSchema::from_document(minimal_schema(), &tags, "inline").unwrap();
        assert_eq!(schema.tags(), vec!["plan", "concept"]);
        assert_eq!(
            schema.document()["properties"]["tags"]["items"]["enum"],
            json!(["plan", "concept"])
        );
    }

    #[test]
    fn merged_enum_rejects_unknown_tag() {
        let tags = vec!["plan".to_string()];
        let schema = MergedSchema::from_document(minimal_schema(), &tags, "inline").unwrap();
        let record = json!({"tags": ["plan", "nonexistent-tag"]})
            .as_object()
            .unwrap()
            .clone();
        let violations = schema.validate(&record);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.to_string(), "tags.1");
        assert!(violations[0].message.contains("nonexistent-tag"));
    }

    #[test]
    fn merge_requires_tag_items_object() {
        let err = MergedSchema::from_document(
            json!({"type": "object", "properties": {}}),
            &[],
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchema { .. }));
        assert!(err.to_string().contains("/properties/tags/items"));
    }

    #[test]
    fn meta_schema_violation_is_rejected() {
        let mut doc = minimal_schema();
        doc["properties"]["revision"] = json!({"type": "integer", "minimum": "one"});
        let err = MergedSchema::from_document(doc, &[], "inline").unwrap_err();
        assert!(err.to_string().contains("draft-07"));
    }

    #[test]
    fn unsupported_keyword_is_rejected() {
        let mut doc = minimal_schema();
        doc["properties"]["created"] = json!({"type": "string", "format": "date"});
        let err = MergedSchema::from_document(doc, &[], "inline").unwrap_err();
        assert!(err.to_string().contains("unsupported keyword 'format'"));
    }

    #[test]
    fn load_schema_rejects_scalar_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "schema.yml", "just a string\n");
        let err = load_schema(&path, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { .. }));
    }

    #[test]
    fn load_merged_schema_reads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let tags = write(&dir, "tags.yml", "plan: Plans\n");
        let schema = write(
            &dir,
            "schema.yml",
            "type: object\nproperties:\n  tags:\n    type: array\n    items:\n      type: string\n      enum: []\n",
        );
        let merged = load_merged_schema(&schema, &tags).unwrap();
        assert_eq!(merged.tags(), vec!["plan"]);
        assert_eq!(merged.source(), schema.as_path());
    }
}
