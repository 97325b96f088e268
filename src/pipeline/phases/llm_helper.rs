use crate::llm::{BackendError, LLMClient, LLMRequest, LLMResponse};
use crate::pipeline::result::{Finding, PhaseResult};
use crate::pipeline::{PhaseContext, PhaseId};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Runs the single call of a non-fan-out phase
///
/// Any failure, a timeout included, yields a fatal result.
pub async fn run_single_call(
    ctx: &PhaseContext,
    phase: PhaseId,
    finding_name: &str,
    system: String,
    user: String,
) -> PhaseResult {
    let result = PhaseResult::new(phase, ctx.model(phase).clone());

    let Some(client) = ctx.client(phase) else {
        return result.with_error(format!("no LLM client configured for {}", phase.key()));
    };

    let request = ctx.request(phase, system, user);
    match call_llm(client.as_ref(), request, ctx.config.call_timeout, phase.key()).await {
        Ok(response) => result.with_findings(BTreeMap::from([(
            finding_name.to_string(),
            Finding::Completed {
                text: response.content,
                usage: response.usage,
            },
        )])),
        Err(e) => {
            error!(phase = %phase.key(), error = %e, "LLM call failed");
            result.with_error(e.to_string())
        }
    }
}

/// Sends one request, failing with `TimeoutError` once `timeout` elapses
pub async fn call_llm(
    client: &dyn LLMClient,
    request: LLMRequest,
    timeout: Duration,
    label: &str,
) -> Result<LLMResponse, BackendError> {
    let start = Instant::now();
    let prompt_chars: usize = request.messages.iter().map(|m| m.content.len()).sum();
    debug!(call = %label, prompt_chars, "Sending LLM request");

    let response = tokio::time::timeout(timeout, client.chat(request))
        .await
        .map_err(|_| BackendError::TimeoutError {
            millis: timeout.as_millis() as u64,
        })??;

    debug!(
        call = %label,
        latency_ms = start.elapsed().as_millis() as u64,
        response_chars = response.content.len(),
        "Received LLM response"
    );
    Ok(response)
}

/// Removes a Markdown code fence wrapping the whole response, if there is one
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();

    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body_start) = after_open.find('\n') else {
        return trimmed;
    };
    let body = &after_open[body_start + 1..];

    match body.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

/// Renders completed findings as `### name` sections for the next prompt
///
/// Failed findings are listed by name so later phases know what is missing.
pub fn format_findings(findings: &BTreeMap<String, Finding>) -> String {
    let mut out = String::new();
    for (name, finding) in findings {
        match finding {
            Finding::Completed { text, .. } => {
                out.push_str(&format!("### {}\n\n{}\n\n", name, text.trim()));
            }
            Finding::Failed { .. } => {
                out.push_str(&format!("### {}\n\n_(no findings: this analysis failed)_\n\n", name));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, MockLLMClient, MockResponse, TokenUsage};

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```markdown\n# Rules\n- a\n```"), "# Rules\n- a");
        assert_eq!(strip_code_fence("```\nplain\n```\n"), "plain");
        assert_eq!(strip_code_fence("  # Rules  "), "# Rules");
        // A fence in the middle of the text is content, not a wrapper
        assert_eq!(
            strip_code_fence("Intro\n```rust\nfn a() {}\n```"),
            "Intro\n```rust\nfn a() {}\n```"
        );
        assert_eq!(strip_code_fence("```unterminated\ntext"), "```unterminated\ntext");
    }

    #[test]
    fn test_format_findings() {
        let findings = BTreeMap::from([
            (
                "B Agent".to_string(),
                Finding::Failed {
                    error: "timeout".to_string(),
                },
            ),
            (
                "A Agent".to_string(),
                Finding::Completed {
                    text: "found things\n".to_string(),
                    usage: TokenUsage::default(),
                },
            ),
        ]);
        let text = format_findings(&findings);
        assert!(text.starts_with("### A Agent\n\nfound things\n\n"));
        assert!(text.contains("### B Agent\n\n_(no findings"));
    }

    #[tokio::test]
    async fn test_call_llm_timeout() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::text("late").with_delay(Duration::from_millis(200)));

        let result = call_llm(
            &client,
            LLMRequest::new(vec![ChatMessage::user("hi")]),
            Duration::from_millis(20),
            "test",
        )
        .await;

        match result {
            Err(err @ BackendError::TimeoutError { .. }) => {
                assert_eq!(err.to_string(), "Request timed out after 20 ms");
            }
            other => panic!("expected timeout, got {:?}", other.map(|r| r.content)),
        }
    }

    #[tokio::test]
    async fn test_call_llm_success() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::text("ok"));

        let response = call_llm(
            &client,
            LLMRequest::new(vec![ChatMessage::user("hi")]),
            Duration::from_secs(1),
            "test",
        )
        .await
        .unwrap();
        assert_eq!(response.content, "ok");
    }
}
