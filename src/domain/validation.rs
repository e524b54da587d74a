//! Field-by-field validation of decoded action-item candidates
//!
//! Candidates are loosely typed JSON values. Each one is checked against the
//! schema description independently; a bad record is dropped and recorded
//! without affecting its siblings. Keys not named by the schema are ignored.

use crate::domain::models::ActionItem;
use crate::domain::schema::SchemaDescription;
use serde::Serialize;
use serde_json::{Map, Value};

/// Why a candidate was dropped
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum RejectReason {
    NotAnObject,
    MissingField(String),
    WrongType(String),
    EmptyField(String),
    /// Passed the schema but does not fit the record type
    Unmappable(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NotAnObject => write!(f, "record is not a JSON object"),
            RejectReason::MissingField(name) => write!(f, "missing field '{}'", name),
            RejectReason::WrongType(name) => write!(f, "field '{}' has the wrong type", name),
            RejectReason::EmptyField(name) => write!(f, "field '{}' is empty", name),
            RejectReason::Unmappable(e) => write!(f, "record does not map to an action item: {}", e),
        }
    }
}

/// A dropped candidate and its position in the decoded array
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationRejection {
    pub index: usize,
    pub reason: RejectReason,
}

/// Outcome of validating one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub items: Vec<ActionItem>,
    pub rejections: Vec<ValidationRejection>,
}

impl ValidationReport {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }
}

/// Validates candidates against a schema description
pub struct Validator<'a> {
    schema: &'a SchemaDescription,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a SchemaDescription) -> Self {
        Self { schema }
    }

    /// Validate a batch, keeping valid records in order
    pub fn validate(&self, candidates: &[Value]) -> ValidationReport {
        let mut report = ValidationReport::default();
        for (index, candidate) in candidates.iter().enumerate() {
            match self.validate_one(candidate) {
                Ok(item) => report.items.push(item),
                Err(reason) => {
                    log::warn!("Dropping action item #{}: {}", index, reason);
                    report.rejections.push(ValidationRejection { index, reason });
                }
            }
        }
        report
    }

    /// Validate a single candidate, trimming field values
    ///
    /// Only the fields the schema declares are checked and carried over; the
    /// record is then built from those trimmed values alone.
    pub fn validate_one(&self, candidate: &Value) -> Result<ActionItem, RejectReason> {
        let record = candidate.as_object().ok_or(RejectReason::NotAnObject)?;

        let mut fields = Map::new();
        for field in self.schema.required_fields() {
            let value = record
                .get(field.name)
                .ok_or_else(|| RejectReason::MissingField(field.name.to_string()))?;
            if !field.field_type.matches(value) {
                return Err(RejectReason::WrongType(field.name.to_string()));
            }
            let value = match value {
                Value::String(s) if s.trim().is_empty() => {
                    return Err(RejectReason::EmptyField(field.name.to_string()));
                }
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other.clone(),
            };
            fields.insert(field.name.to_string(), value);
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| RejectReason::Unmappable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{EntityKind, SchemaDescription};
    use serde_json::json;

    fn schema() -> SchemaDescription {
        SchemaDescription::describe(EntityKind::ActionItem)
    }

    #[test]
    fn test_valid_record() {
        let schema = schema();
        let report = Validator::new(&schema).validate(&[json!({
            "task": "Finalize report",
            "owner": "Alice",
            "deadline": "EOD Friday"
        })]);
        assert_eq!(
            report.items,
            vec![ActionItem::new("Finalize report", "Alice", "EOD Friday")]
        );
        assert_eq!(report.rejected(), 0);
    }

    #[test]
    fn test_missing_deadline_is_dropped_but_siblings_survive() {
        let schema = schema();
        let report = Validator::new(&schema).validate(&[
            json!({"task": "Book venue", "owner": "Bob"}),
            json!({"task": "Send invites", "owner": "Carol", "deadline": "Monday"}),
        ]);
        assert_eq!(
            report.items,
            vec![ActionItem::new("Send invites", "Carol", "Monday")]
        );
        assert_eq!(
            report.rejections,
            vec![ValidationRejection {
                index: 0,
                reason: RejectReason::MissingField("deadline".to_string()),
            }]
        );
    }

    #[test]
    fn test_non_string_value_is_rejected() {
        let schema = schema();
        let validator = Validator::new(&schema);
        assert_eq!(
            validator.validate_one(&json!({"task": "a", "owner": 7, "deadline": "c"})),
            Err(RejectReason::WrongType("owner".to_string()))
        );
        assert_eq!(
            validator.validate_one(&json!({"task": "a", "owner": "b", "deadline": null})),
            Err(RejectReason::WrongType("deadline".to_string()))
        );
    }

    #[test]
    fn test_blank_value_is_rejected() {
        let schema = schema();
        assert_eq!(
            Validator::new(&schema).validate_one(&json!({"task": "  ", "owner": "b", "deadline": "c"})),
            Err(RejectReason::EmptyField("task".to_string()))
        );
    }

    #[test]
    fn test_values_are_trimmed() {
        let schema = schema();
        let item = Validator::new(&schema)
            .validate_one(&json!({"task": " Ship it ", "owner": "Team\n", "deadline": " Not specified"}))
            .unwrap();
        assert_eq!(item, ActionItem::new("Ship it", "Team", "Not specified"));
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let schema = schema();
        let item = Validator::new(&schema)
            .validate_one(&json!({"task": "a", "owner": "b", "deadline": "c", "priority": "high"}))
            .unwrap();
        assert_eq!(item, ActionItem::new("a", "b", "c"));
    }

    #[test]
    fn test_non_object_candidates_are_counted() {
        let schema = schema();
        let report = Validator::new(&schema).validate(&[json!("do the thing"), json!(null), json!([1])]);
        assert!(report.items.is_empty());
        assert_eq!(report.rejected(), 3);
        assert!(report
            .rejections
            .iter()
            .all(|r| r.reason == RejectReason::NotAnObject));
    }

    #[test]
    fn test_schema_drives_the_checks() {
        let mut schema = schema();
        schema.fields.retain(|f| f.name != "deadline");
        let validator = Validator::new(&schema);

        // A field the schema no longer requires is never checked
        assert_eq!(
            validator.validate_one(&json!({"task": "a", "owner": "b", "deadline": 5})),
            Err(RejectReason::Unmappable("missing field `deadline`".to_string()))
        );

        schema.fields.iter_mut().for_each(|f| f.required = f.name == "task");
        assert_eq!(
            Validator::new(&schema).validate_one(&json!({"task": "a", "owner": 3})),
            Err(RejectReason::Unmappable("missing field `owner`".to_string()))
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let schema = schema();
        let report = Validator::new(&schema).validate(&[
            json!({"task": "first", "owner": "a", "deadline": "x"}),
            json!({"task": "second", "owner": "b", "deadline": "y"}),
        ]);
        let tasks: Vec<&str> = report.items.iter().map(|i| i.task.as_str()).collect();
        assert_eq!(tasks, vec!["first", "second"]);
    }
}
