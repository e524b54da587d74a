//! Meeting Analyst
//!
//! Extracts a summary, key decisions and validated action items from meeting
//! transcripts with a locally served language model.
//!
//! Data flow: transcript -> prompt (plus schema for action items) ->
//! inference client -> raw text -> decoder -> validator -> typed result.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod utils;

pub use domain::{ActionItem, DecisionList, MeetingAnalysis, TaskKind};
pub use error::{AppError, Result};
pub use services::{Analyst, AnalystSettings, InferenceClient, ModelSettings};
