/// Port trait definitions (interfaces)
///
/// These traits define the contracts for adapters to implement.
/// Following the ports-and-adapters (hexagonal) architecture pattern.
pub mod llm;

#[cfg(test)]
pub mod mocks;

pub use llm::{estimate_tokens, GenerationRequest, InferenceEngine};
