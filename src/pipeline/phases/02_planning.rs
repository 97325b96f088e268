use super::llm_helper::{format_findings, run_single_call};
use crate::pipeline::result::PhaseResult;
use crate::pipeline::{PhaseContext, PhaseId};

const PHASE: PhaseId = PhaseId::Planning;

pub const FINDING_NAME: &str = "Analysis Plan";

const SYSTEM_PROMPT: &str = "You are a lead software architect planning an in-depth code analysis. \
You assign files to a small team of specialist agents so that the important parts of the \
codebase are each read by the agent best suited to them.";

fn build_prompt(ctx: &PhaseContext, discovery: &PhaseResult) -> String {
    format!(
        r#"# {marker}

Using the discovery findings below, design a team of 3 to 5 specialist agents for a deep
analysis of the project. Give each agent a unique name, a description of its focus and the
files it should read. Only assign paths that appear in the project structure.

## Project Structure

```
{tree}```

## Discovery Findings

{findings}
Respond with the plan in exactly this format:

<analysis_plan>
<agent_1 name="Agent Name">
<description>What this agent focuses on</description>
<file_assignments>
<file_path>relative/path/to/file</file_path>
</file_assignments>
</agent_1>
</analysis_plan>"#,
        marker = PHASE.prompt_marker(),
        tree = ctx.project.tree,
        findings = format_findings(&discovery.findings),
    )
}

/// Asks for the analysis plan; fatal when the call fails
pub async fn execute(ctx: &PhaseContext, discovery: &PhaseResult) -> PhaseResult {
    run_single_call(
        ctx,
        PHASE,
        FINDING_NAME,
        SYSTEM_PROMPT.to_string(),
        build_prompt(ctx, discovery),
    )
    .await
}
