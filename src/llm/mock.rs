use super::client::LLMClient;
use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted LLM client for tests
///
/// Responses come from two sources. Rules are checked first, in insertion
/// order: a rule fires when every one of its needles appears somewhere in the
/// request's messages, and it is not consumed. When no rule matches, the next
/// queued response is popped. Concurrent callers therefore get deterministic
/// answers as long as their prompts are told apart by rules.
pub struct MockLLMClient {
    responses: Mutex<VecDeque<MockResponse>>,
    rules: Mutex<Vec<(Vec<String>, MockResponse)>>,
    requests: Mutex<Vec<LLMRequest>>,
    name: String,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub error: Option<BackendError>,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            error: None,
            delay: None,
        }
    }

    pub fn error(error: BackendError) -> Self {
        Self {
            content: String::new(),
            usage: TokenUsage::default(),
            error: Some(error),
            delay: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Sleeps before answering, used to exercise call timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self::with_name("MockLLM")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            rules: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
    }

    /// Answers every request that mentions all of `needles` with `response`
    pub fn respond_when(&self, needles: &[&str], response: MockResponse) {
        let needles = needles.iter().map(|n| n.to_string()).collect();
        self.rules.lock().unwrap().push((needles, response));
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Every request received so far, in arrival order
    pub fn recorded_requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_response(&self, request: &LLMRequest) -> Option<MockResponse> {
        let rule_match = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needles, _)| needles.iter().all(|n| request.mentions(n)))
            .map(|(_, response)| response.clone());

        rule_match.or_else(|| self.responses.lock().unwrap().pop_front())
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        self.requests.lock().unwrap().push(request.clone());

        let response = self.next_response(&request).ok_or_else(|| {
            BackendError::other("MockLLMClient: No more responses in queue")
        })?;

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(LLMResponse::text(response.content, Duration::from_millis(10))
            .with_usage(response.usage))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockLLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLMClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}
