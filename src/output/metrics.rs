use crate::llm::TokenUsage;
use crate::pipeline::{PhaseId, PhaseResult};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PhaseMetrics {
    pub phase: PhaseId,
    pub model: String,
    pub duration: Duration,
    pub completed: usize,
    pub failed: usize,
    pub usage: TokenUsage,
}

impl From<&PhaseResult> for PhaseMetrics {
    fn from(result: &PhaseResult) -> Self {
        Self {
            phase: result.phase,
            model: result.model.label(),
            duration: result.duration,
            completed: result.completed_count(),
            failed: result.failed_count(),
            usage: result.usage,
        }
    }
}

/// Summary of one run, written as `metrics.md`
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub project: String,
    pub total_time: Duration,
    pub phases: Vec<PhaseMetrics>,
}

impl RunMetrics {
    pub fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        project: impl Into<String>,
        total_time: Duration,
        results: &[PhaseResult],
    ) -> Self {
        Self {
            run_id,
            started_at,
            project: project.into(),
            total_time,
            phases: results.iter().map(PhaseMetrics::from).collect(),
        }
    }

    pub fn total_usage(&self) -> TokenUsage {
        self.phases.iter().map(|p| &p.usage).sum()
    }

    pub fn to_markdown(&self) -> String {
        let total = self.total_usage();
        let mut out = String::from("# Analysis Metrics\n\n");
        let _ = writeln!(out, "- Run ID: {}", self.run_id);
        let _ = writeln!(out, "- Started: {}", self.started_at.to_rfc3339());
        let _ = writeln!(out, "- Project: {}", self.project);
        let _ = writeln!(out, "- Total time: {:.2}s", self.total_time.as_secs_f64());
        let _ = writeln!(
            out,
            "- Total tokens: {} input, {} output, {} reasoning\n",
            total.input_tokens, total.output_tokens, total.reasoning_tokens
        );

        out.push_str("| Phase | Model | Duration | Calls ok | Calls failed | Input tokens | Output tokens |\n");
        out.push_str("|---|---|---|---|---|---|---|\n");
        for phase in &self.phases {
            let _ = writeln!(
                out,
                "| {} | {} | {:.2}s | {} | {} | {} | {} |",
                phase.phase.title(),
                phase.model,
                phase.duration.as_secs_f64(),
                phase.completed,
                phase.failed,
                phase.usage.input_tokens,
                phase.usage.output_tokens
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::llm::Provider;
    use crate::pipeline::Finding;
    use std::collections::BTreeMap;

    #[test]
    fn test_metrics_markdown() {
        let result = PhaseResult::new(PhaseId::Planning, ModelConfig::new(Provider::OpenAI, "o3-mini"))
            .with_findings(BTreeMap::from([(
                "Analysis Plan".to_string(),
                Finding::Completed {
                    text: "plan".to_string(),
                    usage: TokenUsage::new(1200, 300, 50),
                },
            )]))
            .with_duration(Duration::from_millis(1500));

        let metrics = RunMetrics::new(
            Uuid::new_v4(),
            Utc::now(),
            "demo",
            Duration::from_secs(3),
            &[result],
        );
        let markdown = metrics.to_markdown();

        assert_eq!(metrics.total_usage(), TokenUsage::new(1200, 300, 50));
        assert!(markdown.contains(&metrics.run_id.to_string()));
        assert!(markdown.contains("- Total tokens: 1200 input, 300 output, 50 reasoning"));
        assert!(markdown.contains("| Phase 2: Methodical Planning | openai:o3-mini | 1.50s | 1 | 0 | 1200 | 300 |"));
    }
}
