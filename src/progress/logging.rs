//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { project_path } => {
                info!(project = %project_path, "Starting analysis");
            }
            ProgressEvent::ScanComplete { files, scan_time } => {
                info!(
                    files,
                    scan_time_ms = scan_time.as_millis() as u64,
                    "Project scan complete"
                );
            }
            ProgressEvent::PhaseStarted { phase } => {
                info!(phase = %phase, "Phase started");
            }
            ProgressEvent::AgentStarted { phase, agent } => {
                debug!(phase = %phase.key(), agent = %agent, "Agent started");
            }
            ProgressEvent::AgentComplete {
                phase,
                agent,
                duration,
                success,
            } => {
                if *success {
                    info!(
                        phase = %phase.key(),
                        agent = %agent,
                        duration_ms = duration.as_millis() as u64,
                        "Agent complete"
                    );
                } else {
                    warn!(
                        phase = %phase.key(),
                        agent = %agent,
                        duration_ms = duration.as_millis() as u64,
                        "Agent failed"
                    );
                }
            }
            ProgressEvent::PhaseComplete {
                phase,
                duration,
                failed_agents,
            } => {
                if *failed_agents > 0 {
                    warn!(
                        phase = %phase,
                        duration_ms = duration.as_millis() as u64,
                        failed_agents,
                        "Phase complete with failed agents"
                    );
                } else {
                    info!(
                        phase = %phase,
                        duration_ms = duration.as_millis() as u64,
                        "Phase complete"
                    );
                }
            }
            ProgressEvent::PhaseFailed { phase, error } => {
                error!(phase = %phase, error = %error, "Phase failed");
            }
            ProgressEvent::Completed { total_time } => {
                info!(
                    total_time_ms = total_time.as_millis() as u64,
                    "Analysis complete"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PhaseId;
    use std::time::Duration;

    #[test]
    fn test_logging_handler_all_events() {
        let handler = LoggingHandler;

        handler.on_progress(&ProgressEvent::Started {
            project_path: "/test".to_string(),
        });
        handler.on_progress(&ProgressEvent::ScanComplete {
            files: 12,
            scan_time: Duration::from_millis(5),
        });
        handler.on_progress(&ProgressEvent::AgentComplete {
            phase: PhaseId::Analysis,
            agent: "Architecture Agent".to_string(),
            duration: Duration::from_millis(10),
            success: false,
        });
        handler.on_progress(&ProgressEvent::PhaseFailed {
            phase: PhaseId::Planning,
            error: "timeout".to_string(),
        });
        handler.on_progress(&ProgressEvent::Completed {
            total_time: Duration::from_secs(1),
        });
    }
}
