//! Phase identifiers
//!
//! The pipeline is a fixed, strictly linear sequence of six phases. `PhaseId`
//! carries everything that is static about a phase: its order, its report file
//! name, its configuration key and the heading its prompt opens with.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseId {
    Discovery,
    Planning,
    Analysis,
    Synthesis,
    Consolidation,
    Final,
}

impl PhaseId {
    /// Execution order
    pub const ALL: [PhaseId; 6] = [
        PhaseId::Discovery,
        PhaseId::Planning,
        PhaseId::Analysis,
        PhaseId::Synthesis,
        PhaseId::Consolidation,
        PhaseId::Final,
    ];

    /// Key used in model tables and environment variable names
    pub fn key(&self) -> &'static str {
        match self {
            PhaseId::Discovery => "phase1",
            PhaseId::Planning => "phase2",
            PhaseId::Analysis => "phase3",
            PhaseId::Synthesis => "phase4",
            PhaseId::Consolidation => "phase5",
            PhaseId::Final => "final",
        }
    }

    pub fn from_key(key: &str) -> Option<PhaseId> {
        let key = key.trim().to_lowercase();
        PhaseId::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            PhaseId::Discovery => "Phase 1: Initial Discovery",
            PhaseId::Planning => "Phase 2: Methodical Planning",
            PhaseId::Analysis => "Phase 3: Deep Analysis",
            PhaseId::Synthesis => "Phase 4: Synthesis",
            PhaseId::Consolidation => "Phase 5: Consolidation",
            PhaseId::Final => "Final: Rule Generation",
        }
    }

    /// Heading every prompt of this phase opens with
    pub fn prompt_marker(&self) -> &'static str {
        match self {
            PhaseId::Discovery => "PHASE 1: INITIAL DISCOVERY",
            PhaseId::Planning => "PHASE 2: METHODICAL PLANNING",
            PhaseId::Analysis => "PHASE 3: DEEP ANALYSIS",
            PhaseId::Synthesis => "PHASE 4: SYNTHESIS",
            PhaseId::Consolidation => "PHASE 5: CONSOLIDATION",
            PhaseId::Final => "FINAL PHASE: CURSOR RULES GENERATION",
        }
    }

    /// Markdown report file written under `phases_output/`
    pub fn report_file(&self) -> &'static str {
        match self {
            PhaseId::Discovery => "phase1_discovery.md",
            PhaseId::Planning => "phase2_planning.md",
            PhaseId::Analysis => "phase3_analysis.md",
            PhaseId::Synthesis => "phase4_synthesis.md",
            PhaseId::Consolidation => "phase5_consolidation.md",
            PhaseId::Final => "final_analysis.md",
        }
    }

    /// Phases 1 and 3 fan out one call per agent, the rest make a single call
    pub fn is_fan_out(&self) -> bool {
        matches!(self, PhaseId::Discovery | PhaseId::Analysis)
    }

    pub fn next(&self) -> Option<PhaseId> {
        let idx = PhaseId::ALL.iter().position(|p| p == self)?;
        PhaseId::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
