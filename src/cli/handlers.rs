//! Command handlers, each returning the process exit code

use crate::cli::commands::{AnalyzeArgs, ModelsArgs};
use crate::cli::output::{ModelsReport, OutputFormatter};
use crate::config::{ArchitectConfig, ModelTable};
use crate::llm::{is_ollama_available, select_phase_clients, Provider, RecordingMode, RecordingSettings};
use crate::pipeline::{PhaseContext, PipelineError, PipelineOrchestrator};
use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler};
use crate::project::{scan_project, ExclusionSet, ScanConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Run completed and `.cursorrules` was written
pub const EXIT_SUCCESS: i32 = 0;
/// A phase failed fatally or output could not be written
pub const EXIT_PIPELINE_FAILED: i32 = 1;
/// Bad configuration, missing credentials or unreadable project path
pub const EXIT_STARTUP_ERROR: i32 = 2;

fn startup_error(message: impl std::fmt::Display) -> i32 {
    error!("{}", message);
    eprintln!("Error: {}", message);
    EXIT_STARTUP_ERROR
}

pub async fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    let mut config = ArchitectConfig::default();
    if let Some(timeout) = args.timeout {
        config.call_timeout_secs = timeout;
    }
    if let Some(depth) = args.max_depth {
        config.tree_depth = depth;
    }
    if let Err(e) = config.validate() {
        return startup_error(e);
    }
    debug!("Configuration: {}", config);

    let models = match ModelTable::load(args.config.as_deref()) {
        Ok(models) => models,
        Err(e) => return startup_error(e),
    };
    if let Err(e) = models.validate_token_budget(config.max_tokens) {
        return startup_error(e);
    }

    // Replay never reaches a provider
    if config.recording_mode != Some(RecordingMode::Replay) {
        if let Err(e) = models.validate_credentials() {
            return startup_error(e);
        }
    }

    let exclusions = match &args.exclude {
        Some(list) => ExclusionSet::with_user_list(list),
        None => ExclusionSet::default(),
    };
    let scan_config = ScanConfig {
        max_files: config.max_scan_files,
        tree_depth: config.tree_depth,
        exclusions: exclusions.clone(),
    };
    let progress = Arc::new(LoggingHandler);
    let scan_start = Instant::now();
    let snapshot = match scan_project(&args.path, &scan_config) {
        Ok(snapshot) => snapshot,
        Err(e) => return startup_error(e),
    };
    if snapshot.truncated {
        warn!(
            limit = config.max_scan_files,
            "Project has more files than the scan limit; the rest are ignored"
        );
    }
    progress.on_progress(&ProgressEvent::ScanComplete {
        files: snapshot.files.len(),
        scan_time: scan_start.elapsed(),
    });

    let recording = config.recording_mode.map(|mode| RecordingSettings {
        mode,
        dir: config.recordings_dir.clone(),
    });
    let clients = match select_phase_clients(&models, recording.as_ref()) {
        Ok(clients) => clients,
        Err(e) => return startup_error(format!("{:#}", e)),
    };

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| snapshot.root.clone());
    let pipeline_config = config.pipeline_config().with_enhance(args.enhance_enabled());
    let ctx = PhaseContext::new(clients, models, pipeline_config, snapshot)
        .with_progress(progress);
    let orchestrator = PipelineOrchestrator::new(ctx, output_dir).with_exclusions(exclusions);

    match orchestrator.run().await {
        Ok(run) => {
            if !quiet {
                print!("{}", OutputFormatter::format_run_summary(&run));
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let PipelineError::PhaseFailed { .. } = e {
                eprintln!(
                    "Reports of completed phases remain in {}",
                    orchestrator
                        .output_dir()
                        .join(crate::output::PHASES_OUTPUT_DIR)
                        .display()
                );
            }
            EXIT_PIPELINE_FAILED
        }
    }
}

pub async fn handle_models(args: &ModelsArgs) -> i32 {
    let models = match ModelTable::load(args.config.as_deref()) {
        Ok(models) => models,
        Err(e) => return startup_error(e),
    };

    let ollama_reachable = if models.providers().contains(&Provider::Ollama) {
        Some(is_ollama_available().await)
    } else {
        None
    };

    let report = ModelsReport::new(&models, ollama_reachable);
    match OutputFormatter::new(args.format.into()).format_models(&report) {
        Ok(text) => {
            println!("{}", text.trim_end());
            EXIT_SUCCESS
        }
        Err(e) => startup_error(format!("{:#}", e)),
    }
}
