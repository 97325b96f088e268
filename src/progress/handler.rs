//! Progress handler trait and events

use crate::pipeline::PhaseId;
use std::time::Duration;

/// Events emitted while a run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started { project_path: String },

    /// Project scan completed
    ScanComplete { files: usize, scan_time: Duration },

    PhaseStarted { phase: PhaseId },

    /// One agent call of a fan-out phase started
    AgentStarted { phase: PhaseId, agent: String },

    /// One agent call finished, successfully or not
    AgentComplete {
        phase: PhaseId,
        agent: String,
        duration: Duration,
        success: bool,
    },

    PhaseComplete {
        phase: PhaseId,
        duration: Duration,
        failed_agents: usize,
    },

    /// A phase failed fatally; no later phase runs
    PhaseFailed { phase: PhaseId, error: String },

    /// Run completed successfully
    Completed { total_time: Duration },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&ProgressEvent::Started {
            project_path: "/test".to_string(),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Started {
            project_path: "/test".to_string(),
        });
        handler.on_progress(&ProgressEvent::PhaseStarted {
            phase: PhaseId::Discovery,
        });
        handler.on_progress(&ProgressEvent::Completed {
            total_time: Duration::from_secs(5),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::AgentStarted {
            phase: PhaseId::Analysis,
            agent: "Architecture Agent".to_string(),
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("AgentStarted"));
        assert!(debug_str.contains("Architecture Agent"));
    }
}
