use super::llm_helper::format_findings;
use crate::agents::{parse_agent_definitions, select_agents, AgentDefinition, AgentSource};
use crate::pipeline::fanout::{merge_outcomes, run_agents, AgentTask};
use crate::pipeline::result::PhaseResult;
use crate::pipeline::{PhaseContext, PhaseId};
use crate::project::render_file_contents;
use tracing::{error, info};

const PHASE: PhaseId = PhaseId::Analysis;

fn system_prompt(agent: &AgentDefinition) -> String {
    let focus = if agent.description.is_empty() {
        "Analyze the files assigned to you."
    } else {
        agent.description.as_str()
    };
    format!(
        "You are the {}, a specialist performing a deep analysis of part of a codebase. {}\n\
         Be specific: cite files, types and functions, and describe the conventions you observe.",
        agent.name, focus
    )
}

fn build_prompt(ctx: &PhaseContext, agent: &AgentDefinition, discovery: &PhaseResult) -> String {
    let files = if agent.files.is_empty() {
        "_(no files were assigned)_\n".to_string()
    } else {
        render_file_contents(
            &ctx.project.root,
            &agent.files,
            ctx.config.max_files_per_agent,
            ctx.config.max_file_bytes,
        )
    };

    format!(
        "# {marker}\n\n\
         ## Project Structure\n\n```\n{tree}```\n\n\
         ## Discovery Findings\n\n{findings}\
         ## Assigned Files\n\n{files}\n\
         Report the patterns, abstractions, conventions and risks you find in these files.",
        marker = PHASE.prompt_marker(),
        tree = ctx.project.tree,
        findings = format_findings(&discovery.findings),
        files = files,
    )
}

/// Runs one agent per planned (or fallback) definition concurrently
///
/// Fatal only when there are no agents or every agent fails.
pub async fn execute(ctx: &PhaseContext, discovery: &PhaseResult, planning: &PhaseResult) -> PhaseResult {
    let result = PhaseResult::new(PHASE, ctx.model(PHASE).clone());
    let Some(client) = ctx.client(PHASE) else {
        return result.with_error("no LLM client configured for phase3");
    };

    let parsed = parse_agent_definitions(planning.primary_text().unwrap_or_default());
    let selection = select_agents(parsed, &ctx.project.files);

    let mut result = result.with_note(match selection.source {
        AgentSource::Planned => format!("{} agents from the analysis plan", selection.agents.len()),
        AgentSource::Fallback => "Analysis plan could not be parsed; default agents used".to_string(),
    });
    for agent in &selection.agents {
        result = result.with_note(format!("{}: {} assigned files", agent.name, agent.files.len()));
    }

    if selection.agents.is_empty() {
        return result.with_error("no analysis agents available");
    }

    info!(
        agents = selection.agents.len(),
        source = selection.source.as_str(),
        "Starting deep analysis"
    );

    let tasks = selection
        .agents
        .iter()
        .map(|agent| AgentTask {
            name: agent.name.clone(),
            request: ctx.request(PHASE, system_prompt(agent), build_prompt(ctx, agent, discovery)),
        })
        .collect();

    let outcomes = run_agents(
        PHASE,
        client.as_ref(),
        tasks,
        ctx.config.call_timeout,
        ctx.progress.as_ref(),
    )
    .await;

    let result = result.with_findings(merge_outcomes(outcomes));
    if result.completed_count() == 0 {
        error!("All analysis agents failed");
        return result.with_error("all analysis agents failed");
    }
    result
}
