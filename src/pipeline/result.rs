//! Phase outputs

use super::PhaseId;
use crate::config::ModelConfig;
use crate::llm::TokenUsage;
use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome of one agent or sub-call within a phase
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    Completed { text: String, usage: TokenUsage },
    Failed { error: String },
}

impl Finding {
    pub fn is_completed(&self) -> bool {
        matches!(self, Finding::Completed { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Finding::Completed { text, .. } => Some(text),
            Finding::Failed { .. } => None,
        }
    }
}

/// Everything one phase produced
///
/// A result with `error` set is fatal: the orchestrator stops and never hands
/// it to the next phase.
#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub phase: PhaseId,
    /// Keyed by agent or sub-result name
    pub findings: BTreeMap<String, Finding>,
    pub error: Option<String>,
    /// Sum over successful calls
    pub usage: TokenUsage,
    pub duration: Duration,
    pub model: ModelConfig,
    /// Free-form lines shown in the phase report, e.g. where the agents came from
    pub notes: Vec<String>,
}

impl PhaseResult {
    pub fn new(phase: PhaseId, model: ModelConfig) -> Self {
        Self {
            phase,
            findings: BTreeMap::new(),
            error: None,
            usage: TokenUsage::default(),
            duration: Duration::ZERO,
            model,
            notes: Vec::new(),
        }
    }

    /// Adds the findings and recomputes usage from the completed ones
    pub fn with_findings(mut self, findings: BTreeMap<String, Finding>) -> Self {
        self.findings.extend(findings);
        self.usage = self
            .findings
            .values()
            .filter_map(|f| match f {
                Finding::Completed { usage, .. } => Some(*usage),
                Finding::Failed { .. } => None,
            })
            .sum();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.error.is_some()
    }

    pub fn completed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.findings
            .iter()
            .filter_map(|(name, f)| f.text().map(|text| (name.as_str(), text)))
    }

    pub fn completed_count(&self) -> usize {
        self.findings.values().filter(|f| f.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.findings.len() - self.completed_count()
    }

    /// Text of the first completed finding; the whole output of single-call phases
    pub fn primary_text(&self) -> Option<&str> {
        self.completed().next().map(|(_, text)| text)
    }
}
