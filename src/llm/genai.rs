//! GenAI-based LLM client implementation
//!
//! This module provides an LLM client implementation using the `genai` crate,
//! supporting multiple providers (Anthropic, OpenAI, Gemini, DeepSeek, xAI,
//! Groq, Ollama). The provider is pinned explicitly through a service target
//! resolver so that model names never get routed to the wrong backend.

use super::client::LLMClient;
use super::error::BackendError;
use super::provider::{Provider, ReasoningMode};
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole, TokenUsage};
use async_trait::async_trait;
use genai::chat::{
    ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest,
    ReasoningEffort,
};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use tracing::{debug, error};

/// Token budget for extended thinking when a phase runs with `ReasoningMode::Enabled`
pub const THINKING_BUDGET_TOKENS: u32 = 8_192;

/// GenAI-based LLM client bound to one provider and model
pub struct GenAIClient {
    client: Client,
    model: String,
    provider: Provider,
    label: String,
}

impl GenAIClient {
    /// Creates a new GenAI client
    ///
    /// `RULES_ARCHITECT_API_BASE_URL` overrides the provider's default endpoint,
    /// which is useful for proxies and OpenAI-compatible gateways.
    pub fn new(provider: Provider, model: impl Into<String>) -> Result<Self, BackendError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(BackendError::ConfigurationError {
                message: format!("empty model name for provider {}", provider),
            });
        }

        let endpoint_url = std::env::var("RULES_ARCHITECT_API_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| provider.default_endpoint());

        debug!(
            "Creating GenAI client: provider={}, model={}, endpoint={}",
            provider, model, endpoint_url
        );

        let kind = provider.adapter_kind();
        let model_clone = model.clone();
        let resolver = ServiceTargetResolver::from_resolver_fn(
            move |_service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let auth = match provider.credential_env() {
                    Some(api_key_var) => AuthData::from_env(api_key_var),
                    None => AuthData::from_single(""),
                };

                Ok(ServiceTarget {
                    endpoint: Endpoint::from_owned(endpoint_url.clone()),
                    auth,
                    model: ModelIden::new(kind, &model_clone),
                })
            },
        );

        let client = Client::builder()
            .with_service_target_resolver(resolver)
            .build();

        Ok(Self {
            client,
            label: format!("{}:{}", provider, model),
            model,
            provider,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }

    fn build_options(request: &LLMRequest) -> ChatOptions {
        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }
        let effort = match request.reasoning {
            ReasoningMode::Disabled => None,
            ReasoningMode::Enabled => Some(ReasoningEffort::Budget(THINKING_BUDGET_TOKENS)),
            ReasoningMode::Low => Some(ReasoningEffort::Low),
            ReasoningMode::Medium => Some(ReasoningEffort::Medium),
            ReasoningMode::High => Some(ReasoningEffort::High),
        };
        if let Some(effort) = effort {
            options = options.with_reasoning_effort(effort);
        }
        options
    }
}

fn token_count(value: Option<i32>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = std::time::Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let genai_request = GenAIChatRequest::new(messages);
        let options = Self::build_options(&request);

        let response = self
            .client
            .exec_chat(&self.model, genai_request, Some(&options))
            .await
            .map_err(|e| {
                error!("{} API error: {}", self.provider, e);
                BackendError::ApiError {
                    message: format!("{} request failed: {}", self.label, e),
                    status_code: None,
                }
            })?;

        let content = response.first_text().unwrap_or_default().to_string();
        if content.trim().is_empty() {
            return Err(BackendError::InvalidResponse {
                message: format!("{} returned an empty response", self.label),
            });
        }

        let usage = &response.usage;
        let reasoning_tokens = usage
            .completion_tokens_details
            .as_ref()
            .and_then(|details| details.reasoning_tokens);

        Ok(LLMResponse::text(content, start.elapsed()).with_usage(TokenUsage::new(
            token_count(usage.prompt_tokens),
            token_count(usage.completion_tokens),
            token_count(reasoning_tokens),
        )))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .finish()
    }
}
