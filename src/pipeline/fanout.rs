//! Concurrent per-agent calls for the fan-out phases
//!
//! All agent calls run at once and the phase waits for every one of them. A
//! failing or timed-out agent never cancels its siblings; it simply becomes a
//! `Finding::Failed` entry.

use super::phases::llm_helper::call_llm;
use super::result::Finding;
use super::PhaseId;
use crate::llm::{LLMClient, LLMRequest, LLMResponse};
use crate::progress::{ProgressEvent, ProgressHandler};
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::warn;

/// One agent call to make
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub name: String,
    pub request: LLMRequest,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub name: String,
    pub result: Result<LLMResponse, String>,
    pub duration: Duration,
}

/// Runs every task concurrently against `client` and waits for all of them
///
/// Outcomes come back in task order.
pub async fn run_agents(
    phase: PhaseId,
    client: &dyn LLMClient,
    tasks: Vec<AgentTask>,
    timeout: Duration,
    progress: &dyn ProgressHandler,
) -> Vec<AgentOutcome> {
    let calls = tasks.into_iter().map(move |task| async move {
        progress.on_progress(&ProgressEvent::AgentStarted {
            phase,
            agent: task.name.clone(),
        });

        let start = Instant::now();
        let label = format!("{}/{}", phase.key(), task.name);
        let result = call_llm(client, task.request, timeout, &label)
            .await
            .map_err(|e| e.to_string());
        let duration = start.elapsed();

        if let Err(error) = &result {
            warn!(phase = %phase.key(), agent = %task.name, error = %error, "Agent call failed");
        }
        progress.on_progress(&ProgressEvent::AgentComplete {
            phase,
            agent: task.name.clone(),
            duration,
            success: result.is_ok(),
        });

        AgentOutcome {
            name: task.name,
            result,
            duration,
        }
    });

    join_all(calls).await
}

/// Merges outcomes into findings keyed by agent name
///
/// The result does not depend on the order of `outcomes`.
pub fn merge_outcomes(outcomes: Vec<AgentOutcome>) -> BTreeMap<String, Finding> {
    outcomes
        .into_iter()
        .map(|outcome| {
            let finding = match outcome.result {
                Ok(response) => Finding::Completed {
                    text: response.content,
                    usage: response.usage,
                },
                Err(error) => Finding::Failed { error },
            };
            (outcome.name, finding)
        })
        .collect()
}
