//! Per-phase model selection
//!
//! The table starts from built-in defaults, then applies a TOML file and
//! finally `RULES_ARCHITECT_<PHASE>_MODEL` environment overrides. Once built it
//! is never mutated; executors receive it by reference.

use super::{closest_match, ConfigError};
use crate::llm::{Provider, ReasoningMode, THINKING_BUDGET_TOKENS};
use crate::pipeline::PhaseId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CLAUDE_SONNET: &str = "claude-3-7-sonnet-20250219";
const OPENAI_O3_MINI: &str = "o3-mini";

/// Model used by one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model: String,
    #[serde(default)]
    pub reasoning: ReasoningMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Overrides the global output token limit for this phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelConfig {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            reasoning: ReasoningMode::Disabled,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: ReasoningMode) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Parses `provider:model[@reasoning]`
    ///
    /// Only the first `:` separates the provider, so Ollama tags such as
    /// `ollama:qwen2.5-coder:7b` keep their colon.
    pub fn parse_spec(spec: &str, context: &str) -> Result<Self, ConfigError> {
        let (provider_raw, rest) = spec
            .trim()
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidModelSpec(spec.to_string()))?;

        let (model, reasoning_raw) = match rest.rsplit_once('@') {
            Some((model, reasoning)) => (model, Some(reasoning)),
            None => (rest, None),
        };

        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModelSpec(spec.to_string()));
        }

        let provider = parse_provider(provider_raw, context)?;
        let reasoning = match reasoning_raw {
            Some(raw) => parse_reasoning(raw, context)?,
            None => ReasoningMode::Disabled,
        };

        Ok(Self::new(provider, model.trim()).with_reasoning(reasoning))
    }

    /// Short label such as `anthropic:claude-3-7-sonnet-20250219 (reasoning: enabled)`
    pub fn label(&self) -> String {
        if self.reasoning.is_enabled() {
            format!(
                "{}:{} (reasoning: {})",
                self.provider, self.model, self.reasoning
            )
        } else {
            format!("{}:{}", self.provider, self.model)
        }
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn parse_provider(raw: &str, context: &str) -> Result<Provider, ConfigError> {
    raw.parse::<Provider>()
        .map_err(|value| ConfigError::InvalidProvider {
            suggestion: closest_match(&value, Provider::ALL.iter().map(|p| p.as_str())),
            value,
            context: context.to_string(),
        })
}

fn parse_reasoning(raw: &str, context: &str) -> Result<ReasoningMode, ConfigError> {
    raw.parse::<ReasoningMode>()
        .map_err(|_| ConfigError::InvalidReasoning {
            value: raw.to_string(),
            context: context.to_string(),
        })
}

/// One `[phaseN]` table of the TOML file; every field is optional so a file
/// can override just the reasoning mode of a phase
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelEntry {
    provider: Option<String>,
    model: Option<String>,
    reasoning: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

/// One `ModelConfig` per phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelTable {
    entries: BTreeMap<PhaseId, ModelConfig>,
}

impl Default for ModelTable {
    fn default() -> Self {
        let claude = || ModelConfig::new(Provider::Anthropic, CLAUDE_SONNET);
        let o3 = || ModelConfig::new(Provider::OpenAI, OPENAI_O3_MINI).with_reasoning(ReasoningMode::High);

        let entries = BTreeMap::from([
            (PhaseId::Discovery, claude()),
            (PhaseId::Planning, o3()),
            (
                PhaseId::Analysis,
                claude().with_reasoning(ReasoningMode::Enabled),
            ),
            (PhaseId::Synthesis, o3()),
            (PhaseId::Consolidation, claude()),
            (PhaseId::Final, claude()),
        ]);

        Self { entries }
    }
}

impl ModelTable {
    /// Table with the same model for every phase, mostly for local runs and tests
    pub fn uniform(config: ModelConfig) -> Self {
        Self {
            entries: PhaseId::ALL
                .into_iter()
                .map(|phase| (phase, config.clone()))
                .collect(),
        }
    }

    pub fn get(&self, phase: PhaseId) -> &ModelConfig {
        // Every constructor fills all six phases
        &self.entries[&phase]
    }

    pub fn set(&mut self, phase: PhaseId, config: ModelConfig) {
        self.entries.insert(phase, config);
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseId, &ModelConfig)> {
        self.entries.iter().map(|(phase, config)| (*phase, config))
    }

    /// Distinct providers referenced by the table
    pub fn providers(&self) -> BTreeSet<Provider> {
        self.entries.values().map(|c| c.provider).collect()
    }

    /// Default location of the TOML overrides file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rules-architect").join("models.toml"))
    }

    /// Builds the effective table: defaults, then the TOML file, then env overrides
    ///
    /// An explicit `path` must exist. The default path is only read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut table = Self::default();

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(file) = file {
            let content = std::fs::read_to_string(&file).map_err(|e| ConfigError::Io {
                path: file.clone(),
                error: e.to_string(),
            })?;
            table.apply_toml_str(&content)?;
            info!(path = %file.display(), "Loaded model table overrides");
        }

        table.apply_env()?;
        Ok(table)
    }

    /// Parses a TOML document of `[phaseN]` / `[final]` tables on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        table.apply_toml_str(content)?;
        Ok(table)
    }

    fn apply_toml_str(&mut self, content: &str) -> Result<(), ConfigError> {
        let doc: toml::Table = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            field: "model table".to_string(),
            error: e.to_string(),
        })?;

        for (key, value) in doc {
            let phase = PhaseId::from_key(&key).ok_or_else(|| ConfigError::UnknownPhase {
                suggestion: closest_match(&key, PhaseId::ALL.iter().map(|p| p.key())),
                value: key.clone(),
            })?;

            let entry: ModelEntry = value.try_into().map_err(|e: toml::de::Error| {
                ConfigError::ParseError {
                    field: key.clone(),
                    error: e.to_string(),
                }
            })?;

            let context = format!("[{}]", key);
            let current = self.entries.get_mut(&phase).ok_or_else(|| {
                ConfigError::ValidationFailed(format!("no default model for {}", key))
            })?;

            if let Some(provider) = entry.provider {
                current.provider = parse_provider(&provider, &context)?;
            }
            if let Some(model) = entry.model {
                if model.trim().is_empty() {
                    return Err(ConfigError::ValidationFailed(format!(
                        "{} has an empty model name",
                        context
                    )));
                }
                current.model = model.trim().to_string();
            }
            if let Some(reasoning) = entry.reasoning {
                current.reasoning = parse_reasoning(&reasoning, &context)?;
            }
            if entry.temperature.is_some() {
                current.temperature = entry.temperature;
            }
            if entry.max_tokens.is_some() {
                current.max_tokens = entry.max_tokens;
            }
            debug!(phase = %key, model = %current, "Applied model override from file");
        }

        Ok(())
    }

    /// Applies `RULES_ARCHITECT_PHASE1_MODEL` .. `RULES_ARCHITECT_FINAL_MODEL`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        for phase in PhaseId::ALL {
            let var = format!("RULES_ARCHITECT_{}_MODEL", phase.key().to_uppercase());
            let Ok(spec) = env::var(&var) else {
                continue;
            };
            if spec.trim().is_empty() {
                continue;
            }

            let parsed = ModelConfig::parse_spec(&spec, &var)?;
            let current = self.entries.get_mut(&phase);
            match current {
                Some(current) => {
                    current.provider = parsed.provider;
                    current.model = parsed.model;
                    current.reasoning = parsed.reasoning;
                }
                None => {
                    self.entries.insert(phase, parsed);
                }
            }
            debug!(phase = %phase.key(), spec = %spec, "Applied model override from {}", var);
        }
        Ok(())
    }

    /// Checks that every provider the table references has its API key set
    pub fn validate_credentials(&self) -> Result<(), ConfigError> {
        for provider in self.providers() {
            if provider.has_credentials() {
                continue;
            }
            let phases: Vec<&str> = self
                .iter()
                .filter(|(_, c)| c.provider == provider)
                .map(|(phase, _)| phase.key())
                .collect();
            return Err(ConfigError::MissingCredential {
                provider: provider.to_string(),
                env_var: provider.credential_env().unwrap_or_default().to_string(),
                phases: phases.join(", "),
            });
        }
        Ok(())
    }

    /// Checks that phases with extended thinking leave room for an answer
    ///
    /// The output limit must exceed the thinking budget, otherwise the provider
    /// rejects the request. `default_max_tokens` applies to phases without their
    /// own `max_tokens`.
    pub fn validate_token_budget(&self, default_max_tokens: u32) -> Result<(), ConfigError> {
        for (phase, config) in self.iter() {
            if config.reasoning != ReasoningMode::Enabled {
                continue;
            }
            let max_tokens = config.max_tokens.unwrap_or(default_max_tokens);
            if max_tokens <= THINKING_BUDGET_TOKENS {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} uses extended thinking with a {} token budget, so max_tokens must exceed it (got {})",
                    phase.key(),
                    THINKING_BUDGET_TOKENS,
                    max_tokens
                )));
            }
        }
        Ok(())
    }

    /// Converts the table to a display map keyed by phase
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(phase, config)| (phase.key().to_string(), config.label()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_thinking_budget_needs_headroom() {
        let table = ModelTable::default();
        assert!(table.validate_token_budget(16_384).is_ok());

        // Global limit at the budget leaves no room for the answer
        let err = table.validate_token_budget(8_192).unwrap_err().to_string();
        assert!(err.contains("phase3"), "{}", err);
        assert!(err.contains("8192"), "{}", err);

        // A per-phase limit takes precedence over the global one
        let mut table = ModelTable::uniform(ModelConfig::new(Provider::Ollama, "llama3"));
        table.set(
            PhaseId::Synthesis,
            ModelConfig {
                max_tokens: Some(4_096),
                ..ModelConfig::new(Provider::Anthropic, CLAUDE_SONNET)
                    .with_reasoning(ReasoningMode::Enabled)
            },
        );
        let err = table.validate_token_budget(32_000).unwrap_err().to_string();
        assert!(err.contains("phase4"), "{}", err);

        // Without extended thinking a small limit is fine
        let table = ModelTable::uniform(ModelConfig::new(Provider::Ollama, "llama3"));
        assert!(table.validate_token_budget(1_024).is_ok());
    }

    #[test]
    fn test_defaults_cover_every_phase() {
        let table = ModelTable::default();
        for phase in PhaseId::ALL {
            assert!(!table.get(phase).model.is_empty());
        }
        assert_eq!(
            table.get(PhaseId::Analysis).reasoning,
            ReasoningMode::Enabled
        );
        assert_eq!(table.get(PhaseId::Planning).provider, Provider::OpenAI);
        assert_eq!(
            table.providers(),
            BTreeSet::from([Provider::Anthropic, Provider::OpenAI])
        );
    }

    #[test]
    fn test_parse_spec() {
        let config = ModelConfig::parse_spec("openai:gpt-4o@high", "test").unwrap();
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.reasoning, ReasoningMode::High);

        let config = ModelConfig::parse_spec("ollama:qwen2.5-coder:7b", "test").unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.model, "qwen2.5-coder:7b");
        assert_eq!(config.reasoning, ReasoningMode::Disabled);
    }

    #[test]
    fn test_parse_spec_errors() {
        assert!(matches!(
            ModelConfig::parse_spec("gpt-4o", "test"),
            Err(ConfigError::InvalidModelSpec(_))
        ));
        assert!(matches!(
            ModelConfig::parse_spec("openai:", "test"),
            Err(ConfigError::InvalidModelSpec(_))
        ));
        assert!(matches!(
            ModelConfig::parse_spec("openai:o3@extreme", "test"),
            Err(ConfigError::InvalidReasoning { .. })
        ));

        match ModelConfig::parse_spec("antropic:claude", "test") {
            Err(ConfigError::InvalidProvider { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("anthropic"));
            }
            other => panic!("expected InvalidProvider, got {:?}", other),
        }
    }

    #[test]
    fn test_from_toml_overrides_single_field() {
        let table = ModelTable::from_toml_str(
            r#"
            [phase2]
            reasoning = "low"

            [final]
            provider = "gemini"
            model = "gemini-2.0-flash"
            temperature = 0.2
            max_tokens = 4096
            "#,
        )
        .unwrap();

        let planning = table.get(PhaseId::Planning);
        assert_eq!(planning.model, OPENAI_O3_MINI);
        assert_eq!(planning.reasoning, ReasoningMode::Low);

        let final_model = table.get(PhaseId::Final);
        assert_eq!(final_model.provider, Provider::Gemini);
        assert_eq!(final_model.temperature, Some(0.2));
        assert_eq!(final_model.max_tokens, Some(4096));
    }

    #[test]
    fn test_from_toml_unknown_phase_suggests() {
        match ModelTable::from_toml_str("[phase6]\nmodel = \"x\"\n") {
            Err(ConfigError::UnknownPhase { value, suggestion }) => {
                assert_eq!(value, "phase6");
                assert!(suggestion.is_some());
            }
            other => panic!("expected UnknownPhase, got {:?}", other),
        }
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields_and_bad_syntax() {
        assert!(matches!(
            ModelTable::from_toml_str("[phase1]\nmodle = \"x\"\n"),
            Err(ConfigError::ParseError { .. })
        ));
        assert!(matches!(
            ModelTable::from_toml_str("[phase1\n"),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = ModelTable::load(Some(Path::new("/definitely/not/here/models.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("RULES_ARCHITECT_PHASE4_MODEL", "deepseek:deepseek-reasoner@medium");
        let mut table = ModelTable::default();
        let result = table.apply_env();
        env::remove_var("RULES_ARCHITECT_PHASE4_MODEL");

        result.unwrap();
        let synthesis = table.get(PhaseId::Synthesis);
        assert_eq!(synthesis.provider, Provider::DeepSeek);
        assert_eq!(synthesis.model, "deepseek-reasoner");
        assert_eq!(synthesis.reasoning, ReasoningMode::Medium);
    }

    #[test]
    #[serial]
    fn test_validate_credentials() {
        let old = env::var("GROQ_API_KEY").ok();
        env::remove_var("GROQ_API_KEY");

        let table = ModelTable::uniform(ModelConfig::new(Provider::Groq, "llama-3.3-70b"));
        match table.validate_credentials() {
            Err(ConfigError::MissingCredential { env_var, phases, .. }) => {
                assert_eq!(env_var, "GROQ_API_KEY");
                assert!(phases.contains("phase1"));
                assert!(phases.contains("final"));
            }
            other => panic!("expected MissingCredential, got {:?}", other),
        }

        if let Some(v) = old {
            env::set_var("GROQ_API_KEY", v);
        }

        let ollama = ModelTable::uniform(ModelConfig::new(Provider::Ollama, "llama3"));
        assert!(ollama.validate_credentials().is_ok());
    }

    #[test]
    fn test_label() {
        let config = ModelConfig::new(Provider::Anthropic, CLAUDE_SONNET);
        assert_eq!(config.label(), format!("anthropic:{}", CLAUDE_SONNET));
        let config = config.with_reasoning(ReasoningMode::Enabled);
        assert!(config.label().ends_with("(reasoning: enabled)"));
    }
}
