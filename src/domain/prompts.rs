//! Prompt templates for meeting analysis
//!
//! Each task has a fixed system instruction. The transcript always travels in
//! the user turn, wrapped in a delimiter frame, and the action-items system
//! instruction additionally embeds the schema description.

use crate::domain::models::TaskKind;
use crate::domain::schema::{EntityKind, SchemaDescription};

/// Phrase the decisions prompt asks for when nothing was decided
pub const NO_DECISIONS_PHRASE: &str = "No key decisions were made.";

/// A rendered system/user instruction pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Default prompt templates for each task
pub struct PromptTemplates;

impl PromptTemplates {
    /// System instruction for summary generation
    pub fn summary() -> &'static str {
        r#"You are an expert meeting analyst. Your task is to provide a concise summary of the meeting transcript you are given.
Focus on the key outcomes, talking points, and overall sentiment of the meeting.
Format the summary as 3-6 key bullet points, each on its own line starting with "- "."#
    }

    /// System instruction for decisions extraction
    pub fn decisions() -> &'static str {
        r#"You are an expert meeting analyst. Your task is to extract all key decisions made during the meeting from the transcript you are given.
A decision is a firm conclusion or resolution that has been agreed upon. Discussions without a resolution are not decisions.
Respond ONLY with a numbered list, one decision per line, for example:
1. First decision
2. Second decision
If no decisions were made, respond with exactly: "No key decisions were made.""#
    }

    /// System instruction for action items extraction
    ///
    /// `{schema}` is replaced with the rendered schema description.
    pub fn action_items() -> &'static str {
        r#"You are an expert meeting analyst. Your task is to identify and extract all action items from the meeting transcript you are given.
An action item is a discrete task to be completed by one or more individuals by a specific deadline.

For each action item, extract the following information:
1. task: The specific action to be taken.
2. owner: The person or group responsible for the task.
3. deadline: The deadline for the task.

Respond ONLY with a valid JSON array of objects where every object conforms to the following JSON Schema. If there are no action items, respond with [].
Do NOT include any other text, explanations, Markdown, or apologies in your response.

JSON Schema:
{schema}"#
    }

    /// User turn framing the transcript
    ///
    /// `{transcript}` is replaced with the transcript text.
    pub fn user_frame(task: TaskKind) -> &'static str {
        match task {
            TaskKind::Summary => "Here is the transcript:\n---\n{transcript}\n---\n\nSummary in bullet points:",
            TaskKind::Decisions => "Here is the transcript:\n---\n{transcript}\n---\n\nKey Decisions:",
            TaskKind::ActionItems => "Transcript:\n---\n{transcript}\n---\n\nJSON Output:",
        }
    }

    /// Get all default system templates
    pub fn all() -> Vec<(TaskKind, &'static str)> {
        TaskKind::all()
            .into_iter()
            .map(|task| (task, Self::for_type(task)))
            .collect()
    }

    /// Get the system template for a specific task
    pub fn for_type(task: TaskKind) -> &'static str {
        match task {
            TaskKind::Summary => Self::summary(),
            TaskKind::Decisions => Self::decisions(),
            TaskKind::ActionItems => Self::action_items(),
        }
    }

    /// Render the instruction pair for a task
    ///
    /// `schema` is the prompt-ready schema text; it is only used for action
    /// items and is rendered from the default description when absent.
    /// Building a prompt cannot fail. Fitting the result into the model's
    /// context window is checked by the inference client.
    pub fn build(task: TaskKind, transcript: &str, schema: Option<&str>) -> Prompt {
        let system = match task {
            TaskKind::ActionItems => {
                let schema_text = match schema {
                    Some(text) => text.to_string(),
                    None => SchemaDescription::describe(EntityKind::ActionItem).render(),
                };
                Self::action_items().replace("{schema}", &schema_text)
            }
            _ => Self::for_type(task).to_string(),
        };
        let user = Self::user_frame(task).replace("{transcript}", transcript.trim());

        Prompt { system, user }
    }
}
