use crate::pipeline::fanout::{merge_outcomes, run_agents, AgentTask};
use crate::pipeline::result::PhaseResult;
use crate::pipeline::{PhaseContext, PhaseId};
use crate::project::{find_manifests, render_file_contents};
use tracing::{debug, error};

const PHASE: PhaseId = PhaseId::Discovery;

/// The fixed discovery team: name and role
pub const DISCOVERY_AGENTS: [(&str, &str); 3] = [
    (
        "Structure Agent",
        "Map the directory and file organization: top-level layout, where source, tests, \
         configuration and documentation live, and any naming conventions.",
    ),
    (
        "Dependency Agent",
        "Identify external packages and frameworks from the manifests, their versions, and \
         how the project's internal parts depend on each other.",
    ),
    (
        "Tech Stack Agent",
        "Determine languages, frameworks, build tooling, runtime targets and notable \
         infrastructure (containers, CI, databases).",
    ),
];

fn system_prompt(name: &str, role: &str) -> String {
    format!(
        "You are the {}, part of a team analyzing a software project. {}\n\
         Report concrete observations grounded in the material provided. Use Markdown.",
        name, role
    )
}

fn build_prompt(ctx: &PhaseContext) -> String {
    let project = &ctx.project;
    let manifests = find_manifests(&project.files);
    let manifest_section = if manifests.is_empty() {
        "_(no dependency manifests found)_\n".to_string()
    } else {
        render_file_contents(
            &project.root,
            &manifests,
            ctx.config.max_files_per_agent,
            ctx.config.max_file_bytes,
        )
    };

    format!(
        "# {marker}\n\n\
         Perform an initial discovery of the project `{name}` from your area of expertise.\n\n\
         ## Project Structure\n\n```\n{tree}```\n\n\
         ## Dependency Manifests\n\n{manifests}\n\
         Summarize your findings in a few focused sections.",
        marker = PHASE.prompt_marker(),
        name = project.name(),
        tree = project.tree,
        manifests = manifest_section,
    )
}

/// Runs the three discovery agents concurrently; fatal only when all of them fail
pub async fn execute(ctx: &PhaseContext) -> PhaseResult {
    let result = PhaseResult::new(PHASE, ctx.model(PHASE).clone());
    let Some(client) = ctx.client(PHASE) else {
        return result.with_error("no LLM client configured for phase1");
    };

    let prompt = build_prompt(ctx);
    debug!(prompt_chars = prompt.len(), "Built discovery prompt");

    let tasks = DISCOVERY_AGENTS
        .iter()
        .map(|(name, role)| AgentTask {
            name: name.to_string(),
            request: ctx.request(PHASE, system_prompt(name, role), prompt.clone()),
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
        error!("All discovery agents failed");
        return result.with_error("all discovery agents failed");
    }
    result
}
