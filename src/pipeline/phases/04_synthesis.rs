use super::llm_helper::{format_findings, run_single_call};
use crate::pipeline::result::PhaseResult;
use crate::pipeline::{PhaseContext, PhaseId};

const PHASE: PhaseId = PhaseId::Synthesis;

pub const FINDING_NAME: &str = "Synthesis";

const SYSTEM_PROMPT: &str = "You are a principal engineer synthesizing the reports of several \
specialist analysts into one coherent understanding of a codebase.";

fn build_prompt(analysis: &PhaseResult) -> String {
    format!(
        "# {marker}\n\n\
         Combine the agent reports below. Resolve contradictions, connect related observations, \
         and identify the cross-cutting patterns, conventions and gaps.\n\n\
         ## Deep Analysis Reports\n\n{findings}",
        marker = PHASE.prompt_marker(),
        findings = format_findings(&analysis.findings),
    )
}

pub async fn execute(ctx: &PhaseContext, analysis: &PhaseResult) -> PhaseResult {
    run_single_call(
        ctx,
        PHASE,
        FINDING_NAME,
        SYSTEM_PROMPT.to_string(),
        build_prompt(analysis),
    )
    .await
}
