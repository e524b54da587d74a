//! Mock implementations for testing

use crate::error::{AppError, Result};
use crate::ports::llm::{GenerationRequest, InferenceEngine};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Engine that replays scripted responses in order and records every request
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    responses: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    delay: Option<Duration>,
    in_flight: Arc<Mutex<usize>>,
    max_in_flight: Arc<Mutex<usize>>,
}

impl ScriptedEngine {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let engine = Self::default();
        {
            let mut queue = engine.responses.lock().unwrap();
            queue.extend(responses.into_iter().map(|r| Ok(r.into())));
        }
        engine
    }

    /// Queue an engine failure
    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Sleep this long inside every generation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Highest number of generations observed running at once
    pub fn max_in_flight(&self) -> usize {
        *self.max_in_flight.lock().unwrap()
    }
}

#[async_trait]
impl InferenceEngine for ScriptedEngine {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            *max = (*max).max(*in_flight);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        *self.in_flight.lock().unwrap() -= 1;

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AppError::Inference(message)),
            None => Err(AppError::Inference("no scripted response left".to_string())),
        }
    }

    fn engine_name(&self) -> &'static str {
        "scripted"
    }
}
