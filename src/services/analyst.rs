//! Analyst facade
//!
//! Composes prompt building, inference, decoding and validation into one
//! call per extraction task. The analyst borrows the inference client through
//! a shared handle and computes the action-item schema once at construction.

use crate::domain::models::{ActionItem, DecisionList, MeetingAnalysis, SamplingConfig, TaskKind};
use crate::domain::parsing::{self, ParseFailure};
use crate::domain::prompts::PromptTemplates;
use crate::domain::schema::{EntityKind, SchemaRegistry};
use crate::domain::validation::{ValidationRejection, Validator};
use crate::error::Result;
use crate::ports::llm::InferenceEngine;
use crate::services::inference::InferenceClient;
use crate::utils::text::truncate_for_log;
use serde::Serialize;
use std::sync::Arc;

const MAX_RAW_LOG_CHARS: usize = 4_000;

/// Added to the structured temperature on each retry so a greedy model does
/// not repeat the same malformed answer
const RETRY_TEMPERATURE_STEP: f32 = 0.2;

/// Per-task sampling and retry settings
#[derive(Debug, Clone)]
pub struct AnalystSettings {
    pub summary_sampling: SamplingConfig,
    pub decisions_sampling: SamplingConfig,
    pub action_items_sampling: SamplingConfig,

    /// Extra attempts after an action-items parse failure
    pub json_retries: u32,
}

impl Default for AnalystSettings {
    fn default() -> Self {
        Self {
            summary_sampling: SamplingConfig::prose(),
            decisions_sampling: SamplingConfig::prose(),
            action_items_sampling: SamplingConfig::structured(),
            json_retries: 1,
        }
    }
}

/// Action items together with what was thrown away on the way
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionItemReport {
    pub items: Vec<ActionItem>,
    pub rejections: Vec<ValidationRejection>,
    /// Set when no attempt produced a decodable array
    #[serde(skip)]
    pub parse_failure: Option<ParseFailure>,
    pub attempts: u32,
}

impl ActionItemReport {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }
}

/// Meeting analysis facade
pub struct Analyst<E: InferenceEngine> {
    client: Arc<InferenceClient<E>>,
    schemas: SchemaRegistry,
    settings: AnalystSettings,
}

impl<E: InferenceEngine> Analyst<E> {
    pub fn new(client: Arc<InferenceClient<E>>, settings: AnalystSettings) -> Self {
        Self {
            client,
            schemas: SchemaRegistry::new(),
            settings,
        }
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Generate a bullet-point summary
    pub async fn summarize(&self, transcript: &str) -> Result<String> {
        if is_blank(transcript) {
            log::warn!("Empty transcript, skipping summary");
            return Ok(String::new());
        }

        log::info!("Generating summary");
        let prompt = PromptTemplates::build(TaskKind::Summary, transcript, None);
        let raw = self
            .client
            .complete(&prompt.system, &prompt.user, self.settings.summary_sampling)
            .await?;

        let summary = parsing::decode_summary(&raw);
        log::info!("Summary generated ({} characters)", summary.len());
        Ok(summary)
    }

    /// Extract key decisions in order of appearance
    pub async fn extract_decisions(&self, transcript: &str) -> Result<Vec<String>> {
        Ok(self.extract_decision_list(transcript).await?.decisions)
    }

    /// Extract key decisions, keeping whether the model declared there were none
    pub async fn extract_decision_list(&self, transcript: &str) -> Result<DecisionList> {
        if is_blank(transcript) {
            log::warn!("Empty transcript, skipping decisions");
            return Ok(DecisionList::default());
        }

        log::info!("Extracting decisions");
        let prompt = PromptTemplates::build(TaskKind::Decisions, transcript, None);
        let raw = self
            .client
            .complete(&prompt.system, &prompt.user, self.settings.decisions_sampling)
            .await?;
        log::debug!("Decisions raw output: {}", truncate_for_log(&raw, MAX_RAW_LOG_CHARS));

        let list = parsing::decode_decisions(&raw);
        if list.none_declared {
            log::info!("Model reported no key decisions");
        } else {
            log::info!("Found {} decisions", list.decisions.len());
        }
        Ok(list)
    }

    /// Extract validated action items
    ///
    /// Never fails: malformed output and engine errors both yield an empty
    /// list, with the details logged.
    pub async fn extract_action_items(&self, transcript: &str) -> Vec<ActionItem> {
        self.extract_action_items_report(transcript).await.items
    }

    /// Extract action items with rejection and parse diagnostics
    pub async fn extract_action_items_report(&self, transcript: &str) -> ActionItemReport {
        let mut report = ActionItemReport::default();
        if is_blank(transcript) {
            log::warn!("Empty transcript, skipping action items");
            return report;
        }

        log::info!("Extracting action items");
        let prompt = PromptTemplates::build(
            TaskKind::ActionItems,
            transcript,
            Some(self.schemas.rendered(EntityKind::ActionItem)),
        );
        let validator = Validator::new(self.schemas.describe(EntityKind::ActionItem));

        let max_attempts = 1 + self.settings.json_retries;
        while report.attempts < max_attempts {
            let mut sampling = self.settings.action_items_sampling;
            sampling.temperature += RETRY_TEMPERATURE_STEP * report.attempts as f32;
            report.attempts += 1;

            let raw = match self.client.complete(&prompt.system, &prompt.user, sampling).await {
                Ok(raw) => raw,
                Err(e) => {
                    log::error!("Action item generation failed: {}", e);
                    return report;
                }
            };

            match parsing::decode_action_items(&raw) {
                Ok(candidates) => {
                    let validation = validator.validate(&candidates);
                    log::info!(
                        "Found and validated {} action items ({} rejected)",
                        validation.items.len(),
                        validation.rejected()
                    );
                    report.items = validation.items;
                    report.rejections = validation.rejections;
                    report.parse_failure = None;
                    return report;
                }
                Err(failure) => {
                    log::warn!(
                        "Attempt {}/{}: {}",
                        report.attempts,
                        max_attempts,
                        failure
                    );
                    log::debug!(
                        "Model output that failed parsing:\n---\n{}\n---",
                        truncate_for_log(&failure.raw, MAX_RAW_LOG_CHARS)
                    );
                    report.parse_failure = Some(failure);
                }
            }
        }

        log::error!("Giving up on action items after {} attempts", report.attempts);
        report
    }

    /// Run all three tasks, one after another, on one transcript
    pub async fn analyze(&self, transcript: &str) -> Result<MeetingAnalysis> {
        let summary = self.summarize(transcript).await?;
        let decisions = self.extract_decisions(transcript).await?;
        let action_items = self.extract_action_items(transcript).await;
        Ok(MeetingAnalysis::new(summary, decisions, action_items))
    }
}

fn is_blank(transcript: &str) -> bool {
    transcript.trim().is_empty()
}
