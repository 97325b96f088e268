//! LLM client abstraction layer
//!
//! This module provides a trait-based abstraction for LLM communication,
//! allowing different backends (GenAI, Mock, Recording) to be used interchangeably.

mod client;
mod error;
mod genai;
mod mock;
mod provider;
mod recording;
mod selector;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai::{GenAIClient, THINKING_BUDGET_TOKENS};
pub use mock::{MockLLMClient, MockResponse};
pub use provider::{Provider, ReasoningMode};
pub use recording::{RecordedExchange, RecordedRequest, RecordingLLMClient, RecordingMode};
pub use selector::{is_ollama_available, select_phase_clients, PhaseClients, RecordingSettings};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole, TokenUsage};
