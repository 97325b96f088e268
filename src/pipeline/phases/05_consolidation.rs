use super::llm_helper::{format_findings, run_single_call};
use crate::pipeline::result::PhaseResult;
use crate::pipeline::{PhaseContext, PhaseId};

const PHASE: PhaseId = PhaseId::Consolidation;

pub const FINDING_NAME: &str = "Consolidated Report";

const SYSTEM_PROMPT: &str = "You are a technical writer consolidating a multi-stage codebase \
analysis into one authoritative report.";

fn build_prompt(previous: &[&PhaseResult]) -> String {
    let mut sections = String::new();
    for result in previous {
        sections.push_str(&format!(
            "## {}\n\n{}",
            result.phase.title(),
            format_findings(&result.findings)
        ));
    }

    format!(
        "# {marker}\n\n\
         Consolidate every finding below into a single comprehensive report covering project \
         structure, technology stack, architecture, coding conventions and notable risks.\n\n\
         {sections}",
        marker = PHASE.prompt_marker(),
        sections = sections,
    )
}

/// Consolidates the results of all earlier phases, in phase order
pub async fn execute(ctx: &PhaseContext, previous: &[&PhaseResult]) -> PhaseResult {
    run_single_call(
        ctx,
        PHASE,
        FINDING_NAME,
        SYSTEM_PROMPT.to_string(),
        build_prompt(previous),
    )
    .await
}
