//! Schema and prompt inspection commands

use crate::domain::models::TaskKind;
use crate::domain::prompts::PromptTemplates;
use crate::domain::schema::{EntityKind, SchemaRegistry};

/// The action item schema as embedded in prompts
pub fn schema_text() -> String {
    SchemaRegistry::new()
        .rendered(EntityKind::ActionItem)
        .to_string()
}

/// System templates for one task or all of them
///
/// The action-items template is shown with the schema filled in.
pub fn prompts_text(task: Option<TaskKind>) -> String {
    let registry = SchemaRegistry::new();
    let tasks: Vec<TaskKind> = match task {
        Some(task) => vec![task],
        None => TaskKind::all().to_vec(),
    };

    tasks
        .into_iter()
        .map(|task| {
            let system = match task {
                TaskKind::ActionItems => PromptTemplates::action_items()
                    .replace("{schema}", registry.rendered(EntityKind::ActionItem)),
                _ => PromptTemplates::for_type(task).to_string(),
            };
            format!(
                "=== {} ===\n[system]\n{}\n\n[user]\n{}\n",
                task,
                system,
                PromptTemplates::user_frame(task)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_text_is_json() {
        let value: serde_json::Value = serde_json::from_str(&schema_text()).unwrap();
        assert_eq!(value["title"], "ActionItem");
    }

    #[test]
    fn test_all_prompts_listed() {
        let text = prompts_text(None);
        assert!(text.contains("=== summary ==="));
        assert!(text.contains("=== decisions ==="));
        assert!(text.contains("=== action_items ==="));
        assert!(!text.contains("{schema}"));
        assert!(text.contains("{transcript}"));
    }

    #[test]
    fn test_single_prompt() {
        let text = prompts_text(Some(TaskKind::Decisions));
        assert!(text.starts_with("=== decisions ==="));
        assert!(!text.contains("=== summary ==="));
    }
}
