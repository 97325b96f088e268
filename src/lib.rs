//! rules-architect - multi-phase LLM analysis that writes `.cursorrules`
//!
//! A run scans a project, then walks it through six phases:
//!
//! 1. **Initial Discovery**: structure, dependency and tech-stack agents run concurrently
//! 2. **Methodical Planning**: one call proposes the Phase 3 agents and their files
//! 3. **Deep Analysis**: the planned agents (or a fallback set) read their files concurrently
//! 4. **Synthesis** of the analysis findings
//! 5. **Consolidation** of every earlier phase into one report
//! 6. **Final**: generation of the `.cursorrules` content
//!
//! Each successful phase leaves a Markdown report in `phases_output/`; a
//! complete run also writes `metrics.md`, `.cursorrules` and `.cursorignore`.
//! Any phase can use a different provider and model, see [`ModelTable`].
//!
//! # Example Usage
//!
//! ```ignore
//! use rules_architect::{
//!     select_phase_clients, scan_project, ModelTable, PhaseContext, PipelineConfig,
//!     PipelineOrchestrator, ScanConfig,
//! };
//! use std::path::Path;
//!
//! async fn generate(path: &Path) -> anyhow::Result<()> {
//!     let models = ModelTable::load(None)?;
//!     let snapshot = scan_project(path, &ScanConfig::default())?;
//!     let clients = select_phase_clients(&models, None)?;
//!     let ctx = PhaseContext::new(clients, models, PipelineConfig::default(), snapshot);
//!
//!     let run = PipelineOrchestrator::new(ctx, path).run().await?;
//!     println!("Rules written to {}", run.rules_path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`agents`]: Phase 3 agent definitions, plan parsing and the fallback set
//! - [`config`]: runtime settings and the per-phase model table
//! - [`llm`]: client trait, genai-backed client, mock and record/replay wrappers
//! - [`pipeline`]: phase implementations, fan-out and the orchestrator
//! - [`project`]: scanning, exclusions, tree rendering and file reading
//! - [`output`]: phase reports, metrics and the rules files

pub mod agents;
pub mod cli;
pub mod config;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod project;
pub mod util;

pub use agents::{parse_agent_definitions, select_agents, AgentDefinition, AgentSelection, AgentSource, ParsedPlan};
pub use config::{ArchitectConfig, ConfigError, ModelConfig, ModelTable};
pub use llm::{
    select_phase_clients, BackendError, GenAIClient, LLMClient, LLMRequest, LLMResponse,
    MockLLMClient, PhaseClients, Provider, ReasoningMode,
};
pub use pipeline::{
    AnalysisRun, Finding, PhaseContext, PhaseId, PhaseResult, PipelineConfig, PipelineError,
    PipelineOrchestrator,
};
pub use project::{scan_project, ExclusionSet, ProjectSnapshot, ScanConfig, ScanError};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
