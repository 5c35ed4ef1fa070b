//! Per-record validation pipeline.
//!
//! Stages run in a fixed order and none of them can suppress another:
//! preprocessing, structural validation, the date check, the wiki-link
//! check, then tag coherence. Errors keep the order structural, date,
//! wiki-link. Warnings keep the order wiki-link, coherence.

use vaultlint_core::{preprocess, RawRecord};

use crate::coherence::check_tag_coherence;
use crate::dates::check_dates;
use crate::loader::MergedSchema;
use crate::report::ValidationReport;
use crate::wiki_links::check_wiki_links;

/// Validate one metadata record against `schema`.
pub fn validate_record(raw: &RawRecord, schema: &MergedSchema) -> ValidationReport {
    let record = preprocess(raw);

    let mut report = ValidationReport {
        errors: schema
            .validate(&record)
            .iter()
            .map(ToString::to_string)
            .collect(),
        warnings: Vec::new(),
    };
    report.errors.extend(check_dates(&record));
    report.absorb(check_wiki_links(&record));
    report.warnings.extend(check_tag_coherence(&record));

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use vaultlint_core::TemporalValue;

    fn schema() -> MergedSchema {
        let document = json!({
            "type": "object",
            "required": ["type", "tags"],
            "properties": {
                "type": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string", "enum": []}},
                "created": {"type": "string"},
                "parent_plan": {"type": "string", "pattern": "^\\[\\[.+\\]\\]$"}
            },
            "additionalProperties": false
        });
        let tags = vec!["plan".to_string(), "plan/followup".to_string(), "concept".to_string()];
        MergedSchema::from_document(document, &tags, "inline").unwrap()
    }

    fn raw(value: Value) -> RawRecord {
        RawRecord::from(value.as_object().cloned().unwrap())
    }

    #[test]
    fn clean_record() {
        let report = validate_record(&raw(json!({"type": "plan", "tags": ["plan/followup"]})), &schema());
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn native_date_is_preprocessed() {
        let mut record = raw(json!({"type": "concept", "tags": ["concept"]}));
        record.insert(
            "created",
            TemporalValue::from(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()),
        );
        assert!(validate_record(&record, &schema()).is_clean());
    }

    #[test]
    fn every_stage_contributes_in_order() {
        let report = validate_record(
            &raw(json!({
                "type": "plan",
                "tags": ["galaxy/api"],
                "created": "2025-02-30",
                "parent_plan": "[[ ]]",
                "extra": 1
            })),
            &schema(),
        );
        assert_eq!(report.errors.len(), 4, "{:?}", report.errors);
        assert!(report.errors[0].starts_with("(root): Additional properties"));
        assert!(report.errors[1].starts_with("tags.0: "));
        assert!(report.errors[2].starts_with("created: "));
        assert!(report.errors[3].starts_with("parent_plan: wiki link"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains(r#"expected "plan""#));
    }

    #[test]
    fn malformed_record_does_not_stop_checkers() {
        let report = validate_record(&raw(json!({"type": "plan", "tags": "plan", "created": 5})), &schema());
        assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
        assert!(report.errors.iter().any(|e| e.starts_with("created:")));
        assert!(report.errors.iter().any(|e| e.starts_with("tags:")));
        assert!(report.warnings.is_empty());
    }
}
