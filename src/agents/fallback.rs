use super::{AgentDefinition, ParsedPlan, PlanConfidence};
use tracing::{info, warn};

/// Where the Phase 3 agent set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentSource {
    Planned,
    Fallback,
}

impl AgentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentSource::Planned => "planned",
            AgentSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSelection {
    pub agents: Vec<AgentDefinition>,
    pub source: AgentSource,
}

/// The fixed agent set used when the plan yields no agents
///
/// Every agent is handed the whole project; the per-agent file cap is applied
/// when contents are read.
pub fn default_agents(project_files: &[String]) -> Vec<AgentDefinition> {
    [
        (
            "Code Analysis Agent",
            "Analyze implementation patterns, code organization and the key abstractions of the codebase.",
        ),
        (
            "Dependency Mapping Agent",
            "Map internal and external dependencies and the relationships between modules.",
        ),
        (
            "Architecture Agent",
            "Identify architectural patterns, layering and how data flows through the system.",
        ),
    ]
    .into_iter()
    .map(|(name, description)| {
        AgentDefinition::new(name, description).with_files(project_files.iter().cloned())
    })
    .collect()
}

/// Chooses the Phase 3 agents: the parsed plan when it has any, the defaults otherwise
pub fn select_agents(parsed: ParsedPlan, project_files: &[String]) -> AgentSelection {
    match parsed.confidence {
        PlanConfidence::Parsed if !parsed.agents.is_empty() => {
            info!("Using {} agents from the analysis plan", parsed.agents.len());
            AgentSelection {
                agents: parsed.agents,
                source: AgentSource::Planned,
            }
        }
        _ => {
            warn!("No agents could be parsed from the analysis plan, using default agents");
            AgentSelection {
                agents: default_agents(project_files),
                source: AgentSource::Fallback,
            }
        }
    }
}
