//! Per-phase Markdown reports under `phases_output/`

use super::metrics::RunMetrics;
use crate::pipeline::{Finding, PhaseResult};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PHASES_OUTPUT_DIR: &str = "phases_output";
pub const METRICS_FILE: &str = "metrics.md";

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Creates `<output_dir>/phases_output`
    pub fn new(output_dir: &Path) -> Result<Self> {
        let dir = output_dir.join(PHASES_OUTPUT_DIR);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_phase(&self, result: &PhaseResult) -> Result<PathBuf> {
        let path = self.dir.join(result.phase.report_file());
        std::fs::write(&path, render_phase_report(result))
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        debug!(phase = %result.phase.key(), path = %path.display(), "Wrote phase report");
        Ok(path)
    }

    pub fn write_metrics(&self, metrics: &RunMetrics) -> Result<PathBuf> {
        let path = self.dir.join(METRICS_FILE);
        std::fs::write(&path, metrics.to_markdown())
            .with_context(|| format!("Failed to write metrics: {}", path.display()))?;
        Ok(path)
    }
}

pub fn render_phase_report(result: &PhaseResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", result.phase.title());
    let _ = writeln!(out, "- Model: {}", result.model.label());
    let _ = writeln!(out, "- Duration: {:.2}s", result.duration.as_secs_f64());
    let _ = writeln!(
        out,
        "- Tokens: {} input, {} output",
        result.usage.input_tokens, result.usage.output_tokens
    );
    if result.findings.len() > 1 {
        let _ = writeln!(
            out,
            "- Agents: {} completed, {} failed",
            result.completed_count(),
            result.failed_count()
        );
    }
    out.push('\n');

    for note in &result.notes {
        let _ = writeln!(out, "> {}", note);
    }
    if !result.notes.is_empty() {
        out.push('\n');
    }

    for (name, finding) in &result.findings {
        let _ = writeln!(out, "## {}\n", name);
        match finding {
            Finding::Completed { text, .. } => {
                let _ = writeln!(out, "{}\n", text.trim());
            }
            Finding::Failed { error } => {
                let _ = writeln!(out, "**Failed:** {}\n", error);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::llm::{Provider, TokenUsage};
    use crate::pipeline::PhaseId;
    use std::collections::BTreeMap;

    fn analysis_result() -> PhaseResult {
        PhaseResult::new(PhaseId::Analysis, ModelConfig::new(Provider::Ollama, "llama3"))
            .with_findings(BTreeMap::from([
                (
                    "Architecture Agent".to_string(),
                    Finding::Completed {
                        text: "Layered design.".to_string(),
                        usage: TokenUsage::new(100, 20, 0),
                    },
                ),
                (
                    "Code Analysis Agent".to_string(),
                    Finding::Failed {
                        error: "Request timed out after 5 seconds".to_string(),
                    },
                ),
            ]))
            .with_note("Analysis plan could not be parsed; default agents used")
    }

    #[test]
    fn test_render_phase_report() {
        let report = render_phase_report(&analysis_result());

        assert!(report.starts_with("# Phase 3: Deep Analysis\n"));
        assert!(report.contains("- Model: ollama:llama3"));
        assert!(report.contains("- Agents: 1 completed, 1 failed"));
        assert!(report.contains("> Analysis plan could not be parsed"));
        assert!(report.contains("## Architecture Agent\n\nLayered design."));
        assert!(report.contains("**Failed:** Request timed out"));
    }

    #[test]
    fn test_write_phase() {
        let temp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(temp.path()).unwrap();
        let path = writer.write_phase(&analysis_result()).unwrap();

        assert_eq!(path, temp.path().join("phases_output/phase3_analysis.md"));
        assert!(std::fs::read_to_string(path).unwrap().contains("Layered design."));
    }
}
