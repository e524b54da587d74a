//! Transcript ingestion
//!
//! Reads a transcript from a plain-text file or stdin and hands the analyst
//! already-decoded text. Empty input is rejected here so the pipeline never
//! sees it from the CLI.

use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::AsyncReadExt;

const UTF8_BOM: &str = "\u{feff}";

/// Where a transcript comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    File(PathBuf),
    Stdin,
}

impl FromStr for TranscriptSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "-" {
            Ok(TranscriptSource::Stdin)
        } else {
            Ok(TranscriptSource::File(PathBuf::from(s)))
        }
    }
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::File(path) => write!(f, "{}", path.display()),
            TranscriptSource::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// Read and decode a transcript
pub async fn read_transcript(source: &TranscriptSource) -> Result<String> {
    let bytes = match source {
        TranscriptSource::File(path) => tokio::fs::read(path).await?,
        TranscriptSource::Stdin => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };

    log::info!("Read {} bytes of transcript from {}", bytes.len(), source);
    decode_transcript(bytes)
}

/// Decode UTF-8 transcript bytes, rejecting empty text
pub fn decode_transcript(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::InvalidInput(format!("Transcript is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix(UTF8_BOM).map(str::to_string).unwrap_or(text);

    if text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }
    Ok(text)
}
