//! llama.cpp server adapter
//!
//! Implements the InferenceEngine port against `llama-server`, which holds
//! exactly one model in memory. The engine either connects to a server that
//! is already running or spawns and owns one bound to a model file.

use crate::error::{AppError, Result};
use crate::ports::llm::{GenerationRequest, InferenceEngine};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Server stderr lines kept for startup failure reports
const STDERR_TAIL_LINES: usize = 20;

/// Last lines a managed server wrote to stderr
#[derive(Debug, Clone, Default)]
struct StderrTail {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl StderrTail {
    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == STDERR_TAIL_LINES {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drain a stream line by line until it closes
    fn follow<R>(&self, stream: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let tail = self.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log::debug!("llama-server: {}", line);
                tail.push(line);
            }
        });
    }
}

/// llama.cpp server engine
pub struct LlamaServerEngine {
    client: Client,
    base_url: String,
    // Held so the server dies with the engine
    child: Option<Child>,
    stderr: StderrTail,
}

/// How to launch a managed `llama-server`
#[derive(Debug, Clone)]
pub struct SpawnOptions {
    pub binary: PathBuf,
    pub model_path: PathBuf,
    pub context_window: usize,
    pub host: String,
    pub port: u16,
    pub startup_timeout: Duration,
    pub request_timeout: Duration,
}

impl SpawnOptions {
    pub fn new(binary: impl Into<PathBuf>, model_path: impl Into<PathBuf>, context_window: usize) -> Self {
        Self {
            binary: binary.into(),
            model_path: model_path.into(),
            context_window,
            host: "127.0.0.1".to_string(),
            port: 8080,
            startup_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(300),
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    stop: &'a [String],
    cache_prompt: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
    #[serde(default)]
    tokens_predicted: Option<u64>,
    #[serde(default)]
    truncated: Option<bool>,
}

#[derive(Debug, Serialize)]
struct TokenizeRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenizeResponse {
    // Plain ids, or objects when the server is asked for pieces
    tokens: Vec<serde_json::Value>,
}

impl LlamaServerEngine {
    /// Connect to a server that is already running
    pub fn connect(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            child: None,
            stderr: StderrTail::default(),
        })
    }

    /// Start a `llama-server` bound to one model file and wait until it is ready
    pub async fn spawn(options: &SpawnOptions) -> Result<Self> {
        if !options.model_path.exists() {
            return Err(AppError::ModelNotFound(options.model_path.clone()));
        }

        log::info!(
            "Starting {} with model {} (context {})",
            options.binary.display(),
            options.model_path.display(),
            options.context_window
        );

        let mut cmd = Command::new(&options.binary);
        cmd.arg("-m")
            .arg(&options.model_path)
            .arg("-c")
            .arg(options.context_window.to_string())
            .arg("--host")
            .arg(&options.host)
            .arg("--port")
            .arg(options.port.to_string());
        cmd.kill_on_drop(true);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            AppError::Inference(format!(
                "Failed to start '{}': {}",
                options.binary.display(),
                e
            ))
        })?;

        let mut engine = Self::connect(options.base_url(), options.request_timeout)?;
        if let Some(stderr) = child.stderr.take() {
            engine.stderr.follow(stderr);
        }
        engine.child = Some(child);
        engine.wait_until_ready(options.startup_timeout).await?;

        log::info!("llama-server ready at {}", engine.base_url);
        Ok(engine)
    }

    /// Whether the server reports the model as loaded
    pub async fn health(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn wait_until_ready(&mut self, startup_timeout: Duration) -> Result<()> {
        let started = tokio::time::Instant::now();
        loop {
            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    // Let the reader catch the final lines
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    return Err(startup_failure(&status.to_string(), &self.stderr.snapshot()));
                }
            }

            // Connection refused and 503 both mean "still loading"
            if let Ok(true) = self.health().await {
                return Ok(());
            }

            if started.elapsed() >= startup_timeout {
                return Err(AppError::Timeout(startup_timeout));
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }
}

fn startup_failure(status: &str, stderr: &[String]) -> AppError {
    if stderr.is_empty() {
        return AppError::Inference(format!("llama-server exited during startup ({})", status));
    }
    log::error!("llama-server stderr before exit:\n{}", stderr.join("\n"));
    AppError::Inference(format!(
        "llama-server exited during startup ({}): {}",
        status,
        stderr.last().map(String::as_str).unwrap_or_default()
    ))
}

#[async_trait]
impl InferenceEngine for LlamaServerEngine {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = CompletionRequest {
            prompt: &request.prompt,
            n_predict: request.max_tokens,
            temperature: request.temperature,
            stop: &request.stop,
            cache_prompt: true,
        };

        log::debug!(
            "Calling llama-server completion (temperature {}, n_predict {})",
            request.temperature,
            request.max_tokens
        );

        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Inference(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Inference(format!(
                "Completion failed: HTTP {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            AppError::Inference(format!("Failed to parse completion response: {}", e))
        })?;

        if completion.truncated == Some(true) {
            log::warn!("llama-server truncated the prompt to fit its context");
        }
        log::debug!(
            "Completion generated {} tokens, {} characters",
            completion.tokens_predicted.unwrap_or_default(),
            completion.content.len()
        );

        Ok(completion.content)
    }

    async fn count_tokens(&self, text: &str) -> Result<usize> {
        let response = self
            .client
            .post(format!("{}/tokenize", self.base_url))
            .json(&TokenizeRequest { content: text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Inference(format!(
                "Tokenize failed: HTTP {}",
                response.status()
            )));
        }

        let tokenized: TokenizeResponse = response.json().await?;
        Ok(tokenized.tokens.len())
    }

    fn engine_name(&self) -> &'static str {
        "llama-server"
    }
}
