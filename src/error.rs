/// Error types for Meeting Analyst
///
/// Uses thiserror for ergonomic error handling with proper Display implementations.
/// Malformed model output is not an error here: parse failures and per-record
/// validation rejections are returned as values by the parsing and validation
/// layers and recovered locally.
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Model not found at {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Inference engine error: {0}")]
    Inference(String),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Prompt of {prompt_tokens} tokens leaves no room for output in a {context_window} token context")]
    ContextOverflow {
        prompt_tokens: usize,
        context_window: usize,
    },

    #[error("Transcript is empty")]
    EmptyInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found_message_includes_path() {
        let err = AppError::ModelNotFound(PathBuf::from("/models/qwen.gguf"));
        assert_eq!(err.to_string(), "Model not found at /models/qwen.gguf");
    }

    #[test]
    fn test_context_overflow_message() {
        let err = AppError::ContextOverflow {
            prompt_tokens: 5000,
            context_window: 4096,
        };
        assert!(err.to_string().contains("5000"));
        assert!(err.to_string().contains("4096"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
