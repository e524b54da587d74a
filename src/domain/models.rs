/// Domain models for Meeting Analyst
///
/// These models represent the entities produced by an analysis and the
/// parameters that shape a generation. They carry no engine-specific details.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Owner the model is told to assign when the transcript names nobody
pub const DEFAULT_OWNER: &str = "Team";

/// Deadline the model is told to state when the transcript gives none
pub const DEFAULT_DEADLINE: &str = "Not specified";

/// The three extraction tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Summary,
    Decisions,
    ActionItems,
}

impl TaskKind {
    pub fn all() -> [TaskKind; 3] {
        [TaskKind::Summary, TaskKind::Decisions, TaskKind::ActionItems]
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Summary => write!(f, "summary"),
            TaskKind::Decisions => write!(f, "decisions"),
            TaskKind::ActionItems => write!(f, "action_items"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "summary" => Ok(TaskKind::Summary),
            "decisions" => Ok(TaskKind::Decisions),
            "action_items" => Ok(TaskKind::ActionItems),
            other => Err(format!("unknown task: {}", other)),
        }
    }
}

/// A validated action item
///
/// Every field is non-empty after trimming. Instances only come out of the
/// validator; nothing mutates them afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionItem {
    pub task: String,
    pub owner: String,
    pub deadline: String,
}

impl ActionItem {
    pub fn new(
        task: impl Into<String>,
        owner: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            task: task.into(),
            owner: owner.into(),
            deadline: deadline.into(),
        }
    }
}

/// Decoded decisions output
///
/// `none_declared` is set when the model answered with the "no decisions"
/// fallback phrase, which lets callers tell an explicit "nothing decided"
/// apart from output that simply contained no usable lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionList {
    pub decisions: Vec<String>,
    pub none_declared: bool,
}

/// Per-call sampling parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingConfig {
    /// Temperature for generation (0.0 is greedy)
    pub temperature: f32,

    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl SamplingConfig {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }

    /// Settings for free-form prose (summary, decisions)
    pub fn prose() -> Self {
        Self::new(0.2, 768)
    }

    /// Near-deterministic settings used to stabilise JSON output
    pub fn structured() -> Self {
        Self::new(0.0, 1024)
    }
}

/// Chat template the loaded model was trained on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatFormat {
    /// `<|im_start|>` framing used by Qwen models
    #[default]
    ChatMl,
    Llama3,
    Mistral,
}

impl ChatFormat {
    /// Render a system/user instruction pair into the raw prompt string,
    /// ending where the assistant turn begins.
    pub fn render(&self, system: &str, user: &str) -> String {
        match self {
            ChatFormat::ChatMl => format!(
                "<|im_start|>system\n{}<|im_end|>\n<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n",
                system, user
            ),
            ChatFormat::Llama3 => format!(
                "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\n{}<|eot_id|>\
                 <|start_header_id|>user<|end_header_id|>\n\n{}<|eot_id|>\
                 <|start_header_id|>assistant<|end_header_id|>\n\n",
                system, user
            ),
            // Mistral has no system role; the system text leads the first turn
            ChatFormat::Mistral => format!("<s>[INST] {}\n\n{} [/INST]", system, user),
        }
    }

    /// End-of-turn markers that should stop generation
    pub fn stop_sequences(&self) -> Vec<String> {
        let stops: &[&str] = match self {
            ChatFormat::ChatMl => &["<|im_end|>", "<|im_start|>"],
            ChatFormat::Llama3 => &["<|eot_id|>", "<|end_of_text|>"],
            ChatFormat::Mistral => &["</s>", "[INST]"],
        };
        stops.iter().map(|s| s.to_string()).collect()
    }
}

impl std::fmt::Display for ChatFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatFormat::ChatMl => write!(f, "chatml"),
            ChatFormat::Llama3 => write!(f, "llama3"),
            ChatFormat::Mistral => write!(f, "mistral"),
        }
    }
}

impl FromStr for ChatFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chatml" => Ok(ChatFormat::ChatMl),
            "llama3" | "llama-3" => Ok(ChatFormat::Llama3),
            "mistral" => Ok(ChatFormat::Mistral),
            other => Err(format!("unknown chat format: {}", other)),
        }
    }
}

/// Combined result of running all three tasks on one transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingAnalysis {
    pub summary: String,
    pub decisions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub generated_at: i64, // Unix timestamp
}

impl MeetingAnalysis {
    pub fn new(summary: String, decisions: Vec<String>, action_items: Vec<ActionItem>) -> Self {
        Self {
            summary,
            decisions,
            action_items,
            generated_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_round_trips_through_display() {
        for task in TaskKind::all() {
            assert_eq!(task.to_string().parse::<TaskKind>(), Ok(task));
        }
        assert_eq!("action-items".parse::<TaskKind>(), Ok(TaskKind::ActionItems));
        assert!("minutes".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_structured_sampling_is_colder_than_prose() {
        assert!(SamplingConfig::structured().temperature < SamplingConfig::prose().temperature);
    }

    #[test]
    fn test_chatml_render() {
        let prompt = ChatFormat::ChatMl.render("be brief", "hello");
        assert_eq!(
            prompt,
            "<|im_start|>system\nbe brief<|im_end|>\n<|im_start|>user\nhello<|im_end|>\n<|im_start|>assistant\n"
        );
    }

    #[test]
    fn test_llama3_render_ends_with_assistant_header() {
        let prompt = ChatFormat::Llama3.render("sys", "usr");
        assert!(prompt.starts_with("<|begin_of_text|>"));
        assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>\n\n"));
        assert!(ChatFormat::Llama3
            .stop_sequences()
            .contains(&"<|eot_id|>".to_string()));
    }

    #[test]
    fn test_mistral_render_folds_system_into_first_turn() {
        let prompt = ChatFormat::Mistral.render("sys", "usr");
        assert_eq!(prompt, "<s>[INST] sys\n\nusr [/INST]");
    }

    #[test]
    fn test_chat_format_parse() {
        assert_eq!("ChatML".parse::<ChatFormat>(), Ok(ChatFormat::ChatMl));
        assert_eq!("llama-3".parse::<ChatFormat>(), Ok(ChatFormat::Llama3));
        assert!("alpaca".parse::<ChatFormat>().is_err());
    }

    #[test]
    fn test_action_item_serializes_with_wire_keys() {
        let item = ActionItem::new("Finalize report", "Alice", "EOD Friday");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["task"], "Finalize report");
        assert_eq!(value["owner"], "Alice");
        assert_eq!(value["deadline"], "EOD Friday");
    }
}
