//! Schema registry for extractable entities
//!
//! A schema description lists the fields of an entity with their types and
//! the constraint text the model is shown. The same description is embedded
//! into the action-items prompt and drives the validator, so the two can
//! never drift apart.

use crate::domain::models::{DEFAULT_DEADLINE, DEFAULT_OWNER};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Entities the registry knows how to describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ActionItem,
}

/// JSON type of a field
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
        }
    }

    /// Whether a JSON value has this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
        }
    }
}

/// One field of an entity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub description: String,
    pub required: bool,
}

/// Structural description of an entity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SchemaDescription {
    pub title: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldSpec>,
    pub example: Value,
}

impl SchemaDescription {
    /// Build the description for an entity
    pub fn describe(entity: EntityKind) -> Self {
        match entity {
            EntityKind::ActionItem => Self::action_item(),
        }
    }

    fn action_item() -> Self {
        Self {
            title: "ActionItem",
            description: "A single action item extracted from a meeting transcript.",
            fields: vec![
                FieldSpec {
                    name: "task",
                    field_type: FieldType::String,
                    description:
                        "The specific, concise action to be taken. Must be a complete sentence."
                            .to_string(),
                    required: true,
                },
                FieldSpec {
                    name: "owner",
                    field_type: FieldType::String,
                    description: format!(
                        "The person or group responsible for the task. If not mentioned, assign to '{}'.",
                        DEFAULT_OWNER
                    ),
                    required: true,
                },
                FieldSpec {
                    name: "deadline",
                    field_type: FieldType::String,
                    description: format!(
                        "The deadline for completing the task. Be specific, e.g., 'EOD Friday, Aug 8, 2025'. If not mentioned, state '{}'.",
                        DEFAULT_DEADLINE
                    ),
                    required: true,
                },
            ],
            example: json!({
                "task": "Finalize the quarterly report and send it to management.",
                "owner": "Alice",
                "deadline": "End of Day, August 8, 2025"
            }),
        }
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// JSON Schema (draft 2020-12 subset) for a single entity object
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.to_string(),
                json!({
                    "title": title_case(field.name),
                    "type": field.field_type.as_str(),
                    "description": field.description,
                }),
            );
        }
        let required: Vec<&str> = self.required_fields().map(|f| f.name).collect();

        json!({
            "title": self.title,
            "description": self.description,
            "type": "object",
            "properties": properties,
            "required": required,
            "example": self.example,
        })
    }

    /// Pretty-printed schema text for embedding in a prompt
    pub fn render(&self) -> String {
        format!("{:#}", self.to_json_schema())
    }
}

/// Holds the descriptions an analyst needs, computed once
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    action_item: SchemaDescription,
    action_item_text: String,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let action_item = SchemaDescription::describe(EntityKind::ActionItem);
        let action_item_text = action_item.render();
        Self {
            action_item,
            action_item_text,
        }
    }

    pub fn describe(&self, entity: EntityKind) -> &SchemaDescription {
        match entity {
            EntityKind::ActionItem => &self.action_item,
        }
    }

    /// Prompt-ready text of a description
    pub fn rendered(&self, entity: EntityKind) -> &str {
        match entity {
            EntityKind::ActionItem => &self.action_item_text,
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_item_has_three_required_string_fields() {
        let schema = SchemaDescription::describe(EntityKind::ActionItem);
        let names: Vec<&str> = schema.required_fields().map(|f| f.name).collect();
        assert_eq!(names, vec!["task", "owner", "deadline"]);
        assert!(schema
            .fields
            .iter()
            .all(|f| f.field_type == FieldType::String));
    }

    #[test]
    fn test_json_schema_shape() {
        let schema = SchemaDescription::describe(EntityKind::ActionItem).to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["owner"]["type"], "string");
        assert_eq!(schema["properties"]["deadline"]["title"], "Deadline");
        assert_eq!(schema["required"], json!(["task", "owner", "deadline"]));
    }

    #[test]
    fn test_descriptions_carry_default_hints() {
        let schema = SchemaDescription::describe(EntityKind::ActionItem);
        assert!(schema.field("owner").unwrap().description.contains("'Team'"));
        assert!(schema
            .field("deadline")
            .unwrap()
            .description
            .contains("'Not specified'"));
    }

    #[test]
    fn test_registry_caches_rendered_text() {
        let registry = SchemaRegistry::new();
        let rendered = registry.rendered(EntityKind::ActionItem);
        assert!(rendered.contains("\"required\""));
        assert!(rendered.contains('\n'));
        let parsed: Value = serde_json::from_str(rendered).unwrap();
        assert_eq!(
            parsed,
            registry.describe(EntityKind::ActionItem).to_json_schema()
        );
    }

    #[test]
    fn test_field_type_matches() {
        assert!(FieldType::String.matches(&json!("x")));
        assert!(!FieldType::String.matches(&json!(3)));
        assert!(!FieldType::String.matches(&Value::Null));
    }
}
