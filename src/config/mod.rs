//! Configuration management for rules-architect
//!
//! Runtime settings are loaded from environment variables with sensible
//! defaults ([`ArchitectConfig`]). The per-phase model selection lives in
//! [`ModelTable`], which starts from built-in defaults and can be overridden
//! from a TOML file and from environment variables.
//!
//! # Environment Variables
//!
//! - `RULES_ARCHITECT_LOG_LEVEL`: Logging level - default: "info"
//! - `RULES_ARCHITECT_CALL_TIMEOUT`: Per-call timeout in seconds - default: "300"
//! - `RULES_ARCHITECT_MAX_TOKENS`: Output token limit per call - default: "16384"
//! - `RULES_ARCHITECT_MAX_FILE_BYTES`: Bytes of each file shown to an agent - default: "65536"
//! - `RULES_ARCHITECT_MAX_FILES_PER_AGENT`: Files read per Phase 3 agent - default: "40"
//! - `RULES_ARCHITECT_MAX_SCAN_FILES`: Files collected from the project - default: "5000"
//! - `RULES_ARCHITECT_TREE_DEPTH`: Depth of the rendered project tree - default: "6"
//! - `RULES_ARCHITECT_RECORDING_MODE`: record|replay|auto - unset disables recording
//! - `RULES_ARCHITECT_RECORDINGS_DIR`: Where recordings live
//! - `RULES_ARCHITECT_PHASE1_MODEL` .. `RULES_ARCHITECT_PHASE5_MODEL`,
//!   `RULES_ARCHITECT_FINAL_MODEL`: `provider:model[@reasoning]` overrides
//!
//! ## Provider credentials
//! Read by the `genai` library, only required for providers the model table uses:
//! `ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, `GEMINI_API_KEY`, `DEEPSEEK_API_KEY`,
//! `XAI_API_KEY`, `GROQ_API_KEY`. Ollama needs none (`OLLAMA_HOST` is optional).

pub mod models;

pub use models::{ModelConfig, ModelTable};

use crate::llm::RecordingMode;
use crate::pipeline::PipelineConfig;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_TOKENS: u32 = 16_384;
const DEFAULT_MAX_FILE_BYTES: usize = 65_536;
const DEFAULT_MAX_FILES_PER_AGENT: usize = 40;
const DEFAULT_MAX_SCAN_FILES: usize = 5_000;
const DEFAULT_TREE_DEPTH: usize = 6;

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider '{value}' for {context}{}. Valid options: anthropic, openai, gemini, deepseek, xai, groq, ollama", hint(.suggestion))]
    InvalidProvider {
        value: String,
        context: String,
        suggestion: Option<String>,
    },

    #[error("Invalid reasoning mode '{value}' for {context}. Valid options: disabled, enabled, low, medium, high")]
    InvalidReasoning { value: String, context: String },

    #[error("Invalid model specification '{0}'. Expected provider:model[@reasoning]")]
    InvalidModelSpec(String),

    #[error("Unknown phase '{value}' in model table{}. Valid phases: phase1, phase2, phase3, phase4, phase5, final", hint(.suggestion))]
    UnknownPhase {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Missing credential for provider {provider}: set {env_var} (used by {phases})")]
    MissingCredential {
        provider: String,
        env_var: String,
        phases: String,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Failed to read configuration file {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Backend initialization failed: {0}")]
    BackendInit(String),
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

/// Returns the closest candidate when it is similar enough to be a likely typo
pub(crate) fn closest_match<'a>(
    value: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let value = value.to_lowercase();
    candidates
        .into_iter()
        .map(|c| (strsim::jaro_winkler(&value, c), c))
        .filter(|(score, _)| *score >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

/// Runtime settings shared by every phase
#[derive(Debug, Clone)]
pub struct ArchitectConfig {
    /// Per-call timeout in seconds
    pub call_timeout_secs: u64,

    /// Output token limit for each call
    pub max_tokens: u32,

    /// Bytes of each assigned file included in a Phase 3 prompt
    pub max_file_bytes: usize,

    /// Files read for one Phase 3 agent
    pub max_files_per_agent: usize,

    /// Files collected while scanning the project
    pub max_scan_files: usize,

    /// Depth of the rendered project tree
    pub tree_depth: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Record/replay of LLM exchanges, `None` when disabled
    pub recording_mode: Option<RecordingMode>,

    pub recordings_dir: PathBuf,

    /// Numeric variables that were set but did not parse, as `(name, raw value)`
    pub invalid_env: Vec<(String, String)>,
}

fn env_parse<T: std::str::FromStr>(
    key: &str,
    default: T,
    invalid: &mut Vec<(String, String)>,
) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                invalid.push((key.to_string(), raw));
                default
            }
        },
        Err(_) => default,
    }
}

impl Default for ArchitectConfig {
    /// Loads settings from `RULES_ARCHITECT_*` environment variables, falling
    /// back to defaults for anything missing
    ///
    /// Unparsable numbers are kept in `invalid_env` and rejected by `validate`.
    fn default() -> Self {
        let mut invalid_env = Vec::new();
        let recording_mode = env::var("RULES_ARCHITECT_RECORDING_MODE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match RecordingMode::parse(&s) {
                Ok(mode) => Some(mode),
                Err(e) => {
                    warn!("{}; recording disabled", e);
                    None
                }
            });

        let recordings_dir = env::var("RULES_ARCHITECT_RECORDINGS_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::cache_dir()
                    .unwrap_or_else(env::temp_dir)
                    .join("rules-architect")
                    .join("recordings")
            });

        let log_level = env::var("RULES_ARCHITECT_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let call_timeout_secs = env_parse(
            "RULES_ARCHITECT_CALL_TIMEOUT",
            DEFAULT_CALL_TIMEOUT_SECS,
            &mut invalid_env,
        );
        let max_tokens = env_parse("RULES_ARCHITECT_MAX_TOKENS", DEFAULT_MAX_TOKENS, &mut invalid_env);
        let max_file_bytes = env_parse(
            "RULES_ARCHITECT_MAX_FILE_BYTES",
            DEFAULT_MAX_FILE_BYTES,
            &mut invalid_env,
        );
        let max_files_per_agent = env_parse(
            "RULES_ARCHITECT_MAX_FILES_PER_AGENT",
            DEFAULT_MAX_FILES_PER_AGENT,
            &mut invalid_env,
        );
        let max_scan_files = env_parse(
            "RULES_ARCHITECT_MAX_SCAN_FILES",
            DEFAULT_MAX_SCAN_FILES,
            &mut invalid_env,
        );
        let tree_depth = env_parse("RULES_ARCHITECT_TREE_DEPTH", DEFAULT_TREE_DEPTH, &mut invalid_env);

        Self {
            call_timeout_secs,
            max_tokens,
            max_file_bytes,
            max_files_per_agent,
            max_scan_files,
            tree_depth,
            log_level,
            recording_mode,
            recordings_dir,
            invalid_env,
        }
    }
}

impl ArchitectConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((key, raw)) = self.invalid_env.first() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid value for {}: '{}' is not a non-negative integer",
                key, raw
            )));
        }

        if self.call_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Call timeout must be at least 1 second".to_string(),
            ));
        }
        if self.call_timeout_secs > 3600 {
            return Err(ConfigError::ValidationFailed(
                "Call timeout cannot exceed 1 hour".to_string(),
            ));
        }

        if self.max_tokens < 256 {
            return Err(ConfigError::ValidationFailed(
                "Max tokens must be at least 256".to_string(),
            ));
        }

        if self.max_file_bytes < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Max file bytes must be at least 1KB".to_string(),
            ));
        }

        if self.max_files_per_agent == 0 || self.max_scan_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "File limits must be greater than zero".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Pipeline settings derived from this configuration
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new()
            .with_call_timeout(self.call_timeout())
            .with_max_tokens(self.max_tokens)
            .with_max_file_bytes(self.max_file_bytes)
            .with_max_files_per_agent(self.max_files_per_agent)
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> std::collections::BTreeMap<String, String> {
        let mut map = std::collections::BTreeMap::new();

        map.insert(
            "call_timeout_secs".to_string(),
            self.call_timeout_secs.to_string(),
        );
        map.insert("max_tokens".to_string(), self.max_tokens.to_string());
        map.insert("max_file_bytes".to_string(), self.max_file_bytes.to_string());
        map.insert(
            "max_files_per_agent".to_string(),
            self.max_files_per_agent.to_string(),
        );
        map.insert("max_scan_files".to_string(), self.max_scan_files.to_string());
        map.insert("tree_depth".to_string(), self.tree_depth.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());
        if let Some(mode) = self.recording_mode {
            map.insert("recording_mode".to_string(), format!("{:?}", mode));
            map.insert(
                "recordings_dir".to_string(),
                self.recordings_dir.display().to_string(),
            );
        }

        map
    }
}

impl fmt::Display for ArchitectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rules Architect Configuration:")?;
        writeln!(f, "  Call Timeout: {}s", self.call_timeout_secs)?;
        writeln!(f, "  Max Tokens: {}", self.max_tokens)?;
        writeln!(f, "  Max File Bytes: {}", self.max_file_bytes)?;
        writeln!(f, "  Max Files Per Agent: {}", self.max_files_per_agent)?;
        writeln!(f, "  Tree Depth: {}", self.tree_depth)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        if let Some(mode) = self.recording_mode {
            writeln!(
                f,
                "  Recording: {:?} ({})",
                mode,
                self.recordings_dir.display()
            )?;
        }
        Ok(())
    }
}
