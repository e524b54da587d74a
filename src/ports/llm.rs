/// Inference engine port trait
///
/// Defines the interface to one loaded language model.
/// Implementations: llama.cpp server (connected or spawned).
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A raw generation request, already rendered with the model's chat template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// The fully rendered prompt
    pub prompt: String,

    /// Sequences that end generation
    pub stop: Vec<String>,

    /// Temperature for generation (0.0 is greedy)
    pub temperature: f32,

    /// Maximum tokens in response
    pub max_tokens: u32,
}

/// Rough token count used when an engine cannot tokenize
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}

/// Port trait for a loaded model
///
/// Implementations are not required to be safe under concurrent generation;
/// the inference client serializes all calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Generate a continuation of the prompt
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Count the tokens of a text with the model's tokenizer
    async fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(estimate_tokens(text))
    }

    /// Get the engine name
    fn engine_name(&self) -> &'static str;
}
