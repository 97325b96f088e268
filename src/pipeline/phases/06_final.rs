use super::llm_helper::{run_single_call, strip_code_fence};
use crate::pipeline::result::{Finding, PhaseResult};
use crate::pipeline::{PhaseContext, PhaseId};

const PHASE: PhaseId = PhaseId::Final;

pub const FINDING_NAME: &str = "Cursor Rules";

const SYSTEM_PROMPT: &str = "You write .cursorrules files: concise, actionable instructions that \
teach an AI coding assistant the conventions of one specific project.";

fn build_prompt(ctx: &PhaseContext, consolidation: &PhaseResult) -> String {
    format!(
        "# {marker}\n\n\
         Write the `.cursorrules` file for the project `{name}` based on the consolidated report.\n\
         Cover project context, technology stack, code style and naming, architecture and \
         module boundaries, testing, and things to avoid. Output only the file content.\n\n\
         ## Project Structure\n\n```\n{tree}```\n\n\
         ## Consolidated Report\n\n{report}\n",
        marker = PHASE.prompt_marker(),
        name = ctx.project.name(),
        tree = ctx.project.tree,
        report = consolidation.primary_text().unwrap_or_default().trim(),
    )
}

/// Generates the rules text; a fence wrapping the whole response is removed
pub async fn execute(ctx: &PhaseContext, consolidation: &PhaseResult) -> PhaseResult {
    let mut result = run_single_call(
        ctx,
        PHASE,
        FINDING_NAME,
        SYSTEM_PROMPT.to_string(),
        build_prompt(ctx, consolidation),
    )
    .await;

    if let Some(Finding::Completed { text, .. }) = result.findings.get_mut(FINDING_NAME) {
        *text = strip_code_fence(text).to_string();
    }
    result
}
