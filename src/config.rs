//! Command-line and environment configuration
//!
//! Every flag can also be set through the environment variable of the same
//! name in upper snake case. Library code never reads this directly; it gets
//! `ModelSettings`, `AnalystSettings` and `SpawnOptions` built from it.

use crate::adapters::llama::{SpawnOptions, DEFAULT_SERVER_URL};
use crate::domain::models::{ChatFormat, SamplingConfig, TaskKind};
use crate::error::{AppError, Result};
use crate::services::analyst::AnalystSettings;
use crate::services::inference::{ModelSettings, MIN_OUTPUT_TOKENS};
use crate::utils::transcript::TranscriptSource;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, env, default_value = "info", global = true)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize a transcript and extract its decisions and action items
    Analyze(AnalyzeArgs),

    /// Print the action item schema embedded in prompts
    Schema,

    /// Print the instruction templates
    Prompts {
        /// Only print the template for this task
        #[arg(long)]
        task: Option<TaskKind>,
    },
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Transcript file, or "-" to read stdin
    pub transcript: TranscriptSource,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: Config,
}

#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Path to the model weights file
    #[arg(long, env)]
    pub model_path: PathBuf,

    /// Context window in tokens (prompt and output combined)
    #[arg(long, env, default_value_t = 4096)]
    pub context_window: usize,

    /// Chat template of the model: chatml, llama3 or mistral
    #[arg(long, env, default_value = "chatml")]
    pub chat_format: ChatFormat,

    /// URL of the llama.cpp server
    #[arg(long, env = "LLAMA_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Start and own a llama-server with this binary instead of connecting
    #[arg(long, env = "LLAMA_SERVER_BINARY")]
    pub server_binary: Option<PathBuf>,

    /// Seconds to wait for a spawned server to load the model
    #[arg(long, env, default_value_t = 120)]
    pub startup_timeout_secs: u64,

    /// Seconds before a single generation is abandoned
    #[arg(long, env, default_value_t = 300)]
    pub request_timeout_secs: u64,

    /// Extra attempts when the action item output is not valid JSON
    #[arg(long, env, default_value_t = 1)]
    pub json_retries: u32,

    /// Temperature for the summary and decisions
    #[arg(long, env, default_value_t = 0.2)]
    pub summary_temperature: f32,

    /// Temperature for the action item JSON
    #[arg(long, env, default_value_t = 0.0)]
    pub structured_temperature: f32,

    /// Output token limit for the summary and decisions
    #[arg(long, env, default_value_t = 768)]
    pub max_output_tokens: u32,

    /// Output token limit for the action item JSON
    #[arg(long, env, default_value_t = 1024)]
    pub max_json_tokens: u32,

    /// Keep <think> reasoning blocks in model output
    #[arg(long, env)]
    pub keep_reasoning: bool,
}

impl Config {
    /// Check values clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.context_window <= MIN_OUTPUT_TOKENS {
            return Err(AppError::Config(format!(
                "context window must exceed {} tokens",
                MIN_OUTPUT_TOKENS
            )));
        }
        for (name, value) in [
            ("summary temperature", self.summary_temperature),
            ("structured temperature", self.structured_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "{} must be between 0.0 and 2.0, got {}",
                    name, value
                )));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config("request timeout must be positive".to_string()));
        }
        Ok(())
    }

    pub fn model_settings(&self) -> ModelSettings {
        let mut settings = ModelSettings::new(&self.model_path)
            .with_context_window(self.context_window)
            .with_chat_format(self.chat_format)
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs));
        settings.strip_reasoning = !self.keep_reasoning;
        settings
    }

    pub fn analyst_settings(&self) -> AnalystSettings {
        let prose = SamplingConfig::new(self.summary_temperature, self.max_output_tokens);
        AnalystSettings {
            summary_sampling: prose,
            decisions_sampling: prose,
            action_items_sampling: SamplingConfig::new(
                self.structured_temperature,
                self.max_json_tokens,
            ),
            json_retries: self.json_retries,
        }
    }

    /// Launch options when a server binary is configured
    pub fn spawn_options(&self) -> Result<Option<SpawnOptions>> {
        let Some(binary) = &self.server_binary else {
            return Ok(None);
        };

        let url = reqwest::Url::parse(&self.server_url)
            .map_err(|e| AppError::Config(format!("invalid server URL '{}': {}", self.server_url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| AppError::Config(format!("server URL '{}' has no host", self.server_url)))?;

        let mut options = SpawnOptions::new(binary, &self.model_path, self.context_window);
        options.host = host.to_string();
        options.port = url.port_or_known_default().unwrap_or(8080);
        options.startup_timeout = Duration::from_secs(self.startup_timeout_secs);
        options.request_timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(Some(options))
    }
}
