//! Output formatting for the CLI
//!
//! The `models` listing supports JSON, YAML and human-readable text; the
//! analysis summary is always human-readable.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::ModelTable;
use crate::llm::Provider;
use crate::pipeline::AnalysisRun;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseModelRow {
    pub phase: String,
    pub title: String,
    pub provider: Provider,
    pub model: String,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_env: Option<String>,
    pub credentials_set: bool,
    /// Only checked for Ollama
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
}

/// What the `models` command prints
#[derive(Debug, Clone, Serialize)]
pub struct ModelsReport {
    pub phases: Vec<PhaseModelRow>,
    pub providers: Vec<ProviderStatus>,
}

impl ModelsReport {
    /// `ollama_reachable` is the reachability check result, used when the table references Ollama
    pub fn new(table: &ModelTable, ollama_reachable: Option<bool>) -> Self {
        let phases = table
            .iter()
            .map(|(phase, config)| PhaseModelRow {
                phase: phase.key().to_string(),
                title: phase.title().to_string(),
                provider: config.provider,
                model: config.model.clone(),
                reasoning: config.reasoning.to_string(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            })
            .collect();

        let providers = table
            .providers()
            .into_iter()
            .map(|provider| ProviderStatus {
                provider,
                credential_env: provider.credential_env().map(str::to_string),
                credentials_set: provider.has_credentials(),
                reachable: if provider == Provider::Ollama {
                    ollama_reachable
                } else {
                    None
                },
            })
            .collect();

        Self { phases, providers }
    }
}

/// Output formatter for CLI results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_models(&self, report: &ModelsReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize model table to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize model table to YAML")
            }
            OutputFormat::Human => Ok(Self::format_models_human(report)),
        }
    }

    fn format_models_human(report: &ModelsReport) -> String {
        let mut output = String::new();

        output.push_str("Phase Models\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for row in &report.phases {
            output.push_str(&format!(
                "{:<32} {}:{}",
                row.title, row.provider, row.model
            ));
            if row.reasoning != "disabled" {
                output.push_str(&format!(" (reasoning: {})", row.reasoning));
            }
            output.push('\n');
        }

        output.push_str("\nProviders\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for status in &report.providers {
            let symbol = if status.credentials_set && status.reachable != Some(false) {
                "\u{2713}"
            } else {
                "\u{2717}"
            };
            output.push_str(&format!("{} {}\n", symbol, status.provider));
            match &status.credential_env {
                Some(var) => output.push_str(&format!(
                    "  Credential: {} ({})\n",
                    var,
                    if status.credentials_set { "set" } else { "missing" }
                )),
                None => output.push_str("  Credential: not required\n"),
            }
            if let Some(reachable) = status.reachable {
                output.push_str(&format!(
                    "  Server: {}\n",
                    if reachable { "reachable" } else { "unreachable" }
                ));
            }
        }

        output
    }

    /// Summary printed after a successful run
    pub fn format_run_summary(run: &AnalysisRun) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Cursor rules generated\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Project:   {}\n", run.project_path.display()));
        output.push_str(&format!("Rules:     {}\n", run.rules_path.display()));
        output.push_str(&format!("Run ID:    {}\n\n", run.run_id));

        output.push_str("Phases:\n");
        for (i, result) in run.results.iter().enumerate() {
            let connector = if i + 1 == run.results.len() {
                "\u{2514}\u{2500}"
            } else {
                "\u{251C}\u{2500}"
            };
            output.push_str(&format!(
                "{} {:<32} {:>7.1}s",
                connector,
                result.phase.title(),
                result.duration.as_secs_f64()
            ));
            if result.failed_count() > 0 {
                output.push_str(&format!(
                    "  ({} of {} agents failed)",
                    result.failed_count(),
                    result.findings.len()
                ));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "\nTokens: {} input, {} output\n",
            run.usage.input_tokens, run.usage.output_tokens
        ));
        output.push_str(&format!(
            "Completed in {:.1}s\n",
            run.total_time.as_secs_f64()
        ));
        output
    }
}
