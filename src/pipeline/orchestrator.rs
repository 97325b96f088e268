use super::context::PhaseContext;
use super::phases::{analysis, consolidation, discovery, final_rules, planning, synthesis};
use super::result::PhaseResult;
use super::PhaseId;
use crate::llm::TokenUsage;
use crate::output::{
    enhance_rules, write_cursorignore, write_rules, ReportWriter, RunMetrics,
};
use crate::progress::ProgressEvent;
use crate::project::ExclusionSet;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{phase} failed: {cause}")]
    PhaseFailed { phase: PhaseId, cause: String },

    #[error("Failed to write output: {0:#}")]
    Output(#[from] anyhow::Error),
}

/// Everything one invocation produced
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub project_path: PathBuf,
    pub tree: String,
    /// In execution order
    pub results: Vec<PhaseResult>,
    pub rules: String,
    pub total_time: Duration,
    pub usage: TokenUsage,
    pub rules_path: PathBuf,
}

pub struct PipelineOrchestrator {
    ctx: PhaseContext,
    output_dir: PathBuf,
    exclusions: ExclusionSet,
}

impl PipelineOrchestrator {
    pub fn new(ctx: PhaseContext, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            output_dir: output_dir.into(),
            exclusions: ExclusionSet::default(),
        }
    }

    /// Exclusions written to `.cursorignore`
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs Phase 1 through Final, writing each report as soon as its phase succeeds
    ///
    /// The first fatal phase halts the run. Reports already written stay on disk.
    pub async fn run(&self) -> Result<AnalysisRun, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let ctx = &self.ctx;

        info!(
            run_id = %run_id,
            project = %ctx.project.root.display(),
            output = %self.output_dir.display(),
            "Starting pipeline"
        );
        ctx.progress.on_progress(&ProgressEvent::Started {
            project_path: ctx.project.root.display().to_string(),
        });

        let reports = ReportWriter::new(&self.output_dir)?;

        let phase_start = self.begin(PhaseId::Discovery);
        let discovery = self.finish(&reports, discovery::execute(ctx).await, phase_start)?;

        let phase_start = self.begin(PhaseId::Planning);
        let planning = self.finish(&reports, planning::execute(ctx, &discovery).await, phase_start)?;

        let phase_start = self.begin(PhaseId::Analysis);
        let analysis = self.finish(
            &reports,
            analysis::execute(ctx, &discovery, &planning).await,
            phase_start,
        )?;

        let phase_start = self.begin(PhaseId::Synthesis);
        let synthesis = self.finish(&reports, synthesis::execute(ctx, &analysis).await, phase_start)?;

        let phase_start = self.begin(PhaseId::Consolidation);
        let consolidation = self.finish(
            &reports,
            consolidation::execute(ctx, &[&discovery, &planning, &analysis, &synthesis]).await,
            phase_start,
        )?;

        let phase_start = self.begin(PhaseId::Final);
        let final_result = self.finish(
            &reports,
            final_rules::execute(ctx, &consolidation).await,
            phase_start,
        )?;

        let rules = enhance_rules(
            final_result.primary_text().unwrap_or_default(),
            ctx.config.enhance,
        );
        let rules_path = write_rules(&self.output_dir, &rules)?;
        write_cursorignore(&self.output_dir, &self.exclusions)?;

        let results = vec![
            discovery,
            planning,
            analysis,
            synthesis,
            consolidation,
            final_result,
        ];
        let total_time = start.elapsed();
        let metrics = RunMetrics::new(run_id, started_at, ctx.project.name(), total_time, &results);
        reports.write_metrics(&metrics)?;

        let usage = metrics.total_usage();
        info!(
            run_id = %run_id,
            total_time_ms = total_time.as_millis() as u64,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Pipeline complete"
        );
        ctx.progress
            .on_progress(&ProgressEvent::Completed { total_time });

        Ok(AnalysisRun {
            run_id,
            project_path: ctx.project.root.clone(),
            tree: ctx.project.tree.clone(),
            results,
            rules,
            total_time,
            usage,
            rules_path,
        })
    }

    fn begin(&self, phase: PhaseId) -> Instant {
        debug!(phase = %phase.key(), model = %self.ctx.model(phase), "Selected model for phase");
        self.ctx
            .progress
            .on_progress(&ProgressEvent::PhaseStarted { phase });
        Instant::now()
    }

    /// Halts on a fatal result, otherwise writes the phase report and passes the result on
    fn finish(
        &self,
        reports: &ReportWriter,
        result: PhaseResult,
        started: Instant,
    ) -> Result<PhaseResult, PipelineError> {
        let result = result.with_duration(started.elapsed());
        let phase = result.phase;

        if let Some(cause) = &result.error {
            error!(phase = %phase, error = %cause, "Phase failed, halting pipeline");
            self.ctx.progress.on_progress(&ProgressEvent::PhaseFailed {
                phase,
                error: cause.clone(),
            });
            return Err(PipelineError::PhaseFailed {
                phase,
                cause: cause.clone(),
            });
        }

        reports.write_phase(&result)?;
        debug!(phase = %phase.key(), findings = result.findings.len(), "Phase report written");
        self.ctx.progress.on_progress(&ProgressEvent::PhaseComplete {
            phase,
            duration: result.duration,
            failed_agents: result.failed_count(),
        });
        Ok(result)
    }
}
