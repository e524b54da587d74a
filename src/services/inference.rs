//! Inference client
//!
//! Owns the one loaded model instance for the life of the process. Every
//! call is rendered with the model's chat template, checked against the
//! context window, bounded by a timeout, and serialized: at most one
//! generation is in flight per client.
//!
//! Context policy: the transcript is never truncated. When the rendered
//! prompt plus the requested output would overflow the context window the
//! output budget is reduced to what remains, and when fewer than
//! [`MIN_OUTPUT_TOKENS`] remain the call fails with `ContextOverflow`.
//!
//! Cancellation: a timed-out call stops waiting and releases the client; the
//! engine may still finish the abandoned generation on its side.

use crate::domain::models::{ChatFormat, SamplingConfig};
use crate::error::{AppError, Result};
use crate::ports::llm::{estimate_tokens, GenerationRequest, InferenceEngine};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::Mutex;

/// Smallest output budget worth generating with
pub const MIN_OUTPUT_TOKENS: usize = 64;

/// Construction-time parameters of the loaded model
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Path to the model weights
    pub model_path: PathBuf,

    /// Token budget covering prompt and output combined
    pub context_window: usize,

    /// Chat template the model expects
    pub chat_format: ChatFormat,

    /// Upper bound on a single generation
    pub request_timeout: Duration,

    /// Remove `<think>` reasoning blocks from generated text
    pub strip_reasoning: bool,
}

impl ModelSettings {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            context_window: 4096,
            chat_format: ChatFormat::ChatMl,
            request_timeout: Duration::from_secs(300),
            strip_reasoning: true,
        }
    }

    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    pub fn with_chat_format(mut self, chat_format: ChatFormat) -> Self {
        self.chat_format = chat_format;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Stateful wrapper around one loaded model
pub struct InferenceClient<E: InferenceEngine> {
    engine: E,
    settings: ModelSettings,
    gate: Mutex<()>,
}

impl<E: InferenceEngine> InferenceClient<E> {
    /// Bind an engine to a model artifact
    ///
    /// Fails with `ModelNotFound` when the artifact is absent.
    pub fn new(settings: ModelSettings, engine: E) -> Result<Self> {
        if !settings.model_path.exists() {
            return Err(AppError::ModelNotFound(settings.model_path.clone()));
        }

        log::info!(
            "Inference client ready: {} via {} ({} context, {} format)",
            settings.model_path.display(),
            engine.engine_name(),
            settings.context_window,
            settings.chat_format
        );

        Ok(Self {
            engine,
            settings,
            gate: Mutex::new(()),
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Generate a response to a system/user instruction pair
    ///
    /// Returns the generated text trimmed of surrounding whitespace. No
    /// retries happen here.
    pub async fn complete(&self, system: &str, user: &str, sampling: SamplingConfig) -> Result<String> {
        let prompt = self.settings.chat_format.render(system, user);

        let _guard = self.gate.lock().await;

        let prompt_tokens = match self.engine.count_tokens(&prompt).await {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Tokenizer unavailable, estimating prompt size: {}", e);
                estimate_tokens(&prompt)
            }
        };
        let max_tokens = self.output_budget(prompt_tokens, sampling.max_tokens)?;

        let request = GenerationRequest {
            prompt,
            stop: self.settings.chat_format.stop_sequences(),
            temperature: sampling.temperature,
            max_tokens,
        };

        log::debug!(
            "Generating with {} prompt tokens, {} output tokens, temperature {}",
            prompt_tokens,
            max_tokens,
            sampling.temperature
        );

        let raw = tokio::time::timeout(self.settings.request_timeout, self.engine.generate(&request))
            .await
            .map_err(|_| AppError::Timeout(self.settings.request_timeout))??;

        Ok(clean_output(&raw, self.settings.strip_reasoning))
    }

    fn output_budget(&self, prompt_tokens: usize, requested: u32) -> Result<u32> {
        let context_window = self.settings.context_window;
        let remaining = context_window.saturating_sub(prompt_tokens);
        if remaining < MIN_OUTPUT_TOKENS {
            return Err(AppError::ContextOverflow {
                prompt_tokens,
                context_window,
            });
        }

        let requested = requested as usize;
        if requested > remaining {
            log::warn!(
                "Reducing output budget from {} to {} tokens to fit the {} token context",
                requested,
                remaining,
                context_window
            );
        }
        Ok(requested.min(remaining) as u32)
    }
}

fn reasoning_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // An unclosed block runs to the end of the output
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<think>.*?(?:</think>|\z)").expect("reasoning pattern is valid")
    })
}

/// Trim generated text, optionally removing reasoning blocks
pub fn clean_output(raw: &str, strip_reasoning: bool) -> String {
    if strip_reasoning {
        reasoning_pattern().replace_all(raw, "").trim().to_string()
    } else {
        raw.trim().to_string()
    }
}
