//! LLM request-response recording for deterministic re-runs

use super::error::BackendError;
use super::provider::ReasoningMode;
use super::{ChatMessage, LLMClient, LLMRequest, LLMResponse};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Recording mode for LLM interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingMode {
    /// Record new exchanges and save to disk
    Record,
    /// Replay from recorded exchanges, fail if not found
    Replay,
    /// Replay if recording exists, otherwise record
    Auto,
}

impl RecordingMode {
    /// Parse from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "record" => Ok(RecordingMode::Record),
            "replay" => Ok(RecordingMode::Replay),
            "auto" => Ok(RecordingMode::Auto),
            _ => anyhow::bail!("Invalid recording mode: {}", s),
        }
    }
}

/// A recorded request-response exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedExchange {
    /// Canonical hash of the request (MD5)
    pub request_hash: String,
    /// The original request
    pub request: RecordedRequest,
    /// The recorded response
    pub response: LLMResponse,
    /// Timestamp when recorded (ISO 8601)
    pub recorded_at: String,
}

/// Simplified request for hashing and storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedRequest {
    /// Messages in the conversation
    pub messages: Vec<ChatMessage>,
    /// Model the request was sent to
    pub model: Option<String>,
    pub reasoning: ReasoningMode,
    pub max_tokens: Option<u32>,
}

impl RecordedRequest {
    pub fn from_llm_request(req: &LLMRequest, model: Option<String>) -> Self {
        Self {
            messages: req.messages.clone(),
            model,
            reasoning: req.reasoning,
            max_tokens: req.max_tokens,
        }
    }

    /// Compute canonical hash (MD5 of JSON)
    pub fn canonical_hash(&self) -> Result<String> {
        let canonical_json =
            serde_json::to_string(self).context("Failed to serialize recorded request")?;
        Ok(format!("{:x}", md5::compute(canonical_json.as_bytes())))
    }
}

/// LLM client that records or replays interactions
pub struct RecordingLLMClient {
    /// Underlying LLM client
    inner: Arc<dyn LLMClient>,
    /// Recording mode
    mode: RecordingMode,
    /// Directory where recordings are stored
    recordings_dir: PathBuf,
    /// In-memory cache of loaded recordings
    cache: HashMap<String, LLMResponse>,
}

impl RecordingLLMClient {
    /// Create a new recording client
    pub fn new(
        inner: Arc<dyn LLMClient>,
        mode: RecordingMode,
        recordings_dir: PathBuf,
    ) -> Result<Self> {
        std::fs::create_dir_all(&recordings_dir)
            .context("Failed to create recordings directory")?;

        Ok(Self {
            inner,
            mode,
            recordings_dir,
            cache: HashMap::new(),
        })
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    /// Get path to recording file for a request hash
    fn recording_path(&self, request_hash: &str) -> PathBuf {
        self.recordings_dir.join(format!("{}.json", request_hash))
    }

    /// Load recording from disk
    fn load_recording(&self, request_hash: &str) -> Result<Option<LLMResponse>> {
        let path = self.recording_path(request_hash);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read recording: {}", path.display()))?;

        let exchange: RecordedExchange = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse recording: {}", path.display()))?;

        Ok(Some(exchange.response))
    }

    /// Save recording to disk
    fn save_recording(&self, request: &RecordedRequest, response: &LLMResponse) -> Result<()> {
        let request_hash = request.canonical_hash()?;

        let exchange = RecordedExchange {
            request_hash: request_hash.clone(),
            request: request.clone(),
            response: response.clone(),
            recorded_at: chrono::Utc::now().to_rfc3339(),
        };

        let path = self.recording_path(&request_hash);
        let contents =
            serde_json::to_string_pretty(&exchange).context("Failed to serialize recording")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write recording: {}", path.display()))?;

        debug!(hash = %request_hash, "Recorded LLM exchange");
        Ok(())
    }

    /// Load all recordings into cache
    pub fn preload_cache(&mut self) -> Result<()> {
        if !self.recordings_dir.exists() {
            return Ok(());
        }

        for entry in std::fs::read_dir(&self.recordings_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let contents = std::fs::read_to_string(&path)?;
            let exchange: RecordedExchange = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse recording: {}", path.display()))?;

            self.cache
                .insert(exchange.request_hash.clone(), exchange.response);
        }

        Ok(())
    }

    fn lookup(&self, request_hash: &str) -> Result<Option<LLMResponse>, BackendError> {
        if let Some(response) = self.cache.get(request_hash) {
            return Ok(Some(response.clone()));
        }

        self.load_recording(request_hash)
            .map_err(|e| BackendError::other(format!("Failed to load recording: {}", e)))
    }

    async fn record(
        &self,
        recorded_request: &RecordedRequest,
        request: LLMRequest,
    ) -> Result<LLMResponse, BackendError> {
        let response = self.inner.chat(request).await?;

        self.save_recording(recorded_request, &response)
            .map_err(|e| BackendError::other(format!("Failed to save recording: {}", e)))?;

        Ok(response)
    }
}

#[async_trait::async_trait]
impl LLMClient for RecordingLLMClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let recorded_request = RecordedRequest::from_llm_request(&request, self.inner.model_info());
        let request_hash = recorded_request
            .canonical_hash()
            .map_err(|e| BackendError::other(e.to_string()))?;

        match self.mode {
            RecordingMode::Replay => self.lookup(&request_hash)?.ok_or_else(|| {
                BackendError::other(format!(
                    "No recording found for request hash: {} (mode: Replay)",
                    request_hash
                ))
            }),
            RecordingMode::Record => self.record(&recorded_request, request).await,
            RecordingMode::Auto => match self.lookup(&request_hash)? {
                Some(response) => Ok(response),
                None => self.record(&recorded_request, request).await,
            },
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model_info(&self) -> Option<String> {
        self.inner.model_info()
    }
}
