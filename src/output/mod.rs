//! Files written by a run: phase reports, metrics, rules and ignore file

mod metrics;
mod reports;
mod rules;

pub use metrics::{PhaseMetrics, RunMetrics};
pub use reports::{render_phase_report, ReportWriter, METRICS_FILE, PHASES_OUTPUT_DIR};
pub use rules::{enhance_rules, write_cursorignore, write_rules, IGNORE_FILE, RULES_FILE};
