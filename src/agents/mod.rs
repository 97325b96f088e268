//! Phase 3 agent definitions
//!
//! Parsing the planning output and choosing the agent set are kept as two
//! separate steps: [`parse_agent_definitions`] reports what it found together
//! with a [`PlanConfidence`], and [`select_agents`] substitutes the default set
//! when nothing usable was found.

mod definition;
mod fallback;
mod parser;

pub use definition::AgentDefinition;
pub use fallback::{default_agents, select_agents, AgentSelection, AgentSource};
pub use parser::{parse_agent_definitions, ParsedPlan, PlanConfidence};
