//! The multi-phase analysis pipeline
//!
//! Data flows strictly forward: project → Phase 1 → Phase 2 → Phase 3 →
//! Phase 4 → Phase 5 → Final. Phases 1 and 3 fan out one concurrent call per
//! agent; the others make a single call.

pub mod config;
pub mod context;
pub mod fanout;
pub mod orchestrator;
mod phase;
pub mod phases;
pub mod result;

pub use config::PipelineConfig;
pub use context::PhaseContext;
pub use fanout::{merge_outcomes, run_agents, AgentOutcome, AgentTask};
pub use orchestrator::{AnalysisRun, PipelineError, PipelineOrchestrator};
pub use phase::PhaseId;
pub use result::{Finding, PhaseResult};
