// Phase executors for the rule generation pipeline
//
// Each phase is self-contained with its own prompt builder and execution
// logic. Executors never return an error: a failed required call is recorded
// in the returned PhaseResult and the orchestrator decides to halt.

pub mod llm_helper;

#[path = "01_discovery.rs"]
pub mod discovery;
#[path = "02_planning.rs"]
pub mod planning;
#[path = "03_analysis.rs"]
pub mod analysis;
#[path = "04_synthesis.rs"]
pub mod synthesis;
#[path = "05_consolidation.rs"]
pub mod consolidation;
#[path = "06_final.rs"]
pub mod final_rules;
