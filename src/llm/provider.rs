//! Provider and reasoning-mode identifiers
//!
//! A [`Provider`] names one LLM backend. Every provider except Ollama needs a
//! credential in the environment; the variable names match the ones the
//! `genai` crate reads.

use genai::adapter::AdapterKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Anthropic Claude
    Anthropic,
    /// OpenAI GPT and o-series models
    OpenAI,
    /// Google Gemini
    Gemini,
    /// DeepSeek
    DeepSeek,
    /// xAI Grok
    Xai,
    /// Groq
    Groq,
    /// Ollama local inference
    Ollama,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::Anthropic,
        Provider::OpenAI,
        Provider::Gemini,
        Provider::DeepSeek,
        Provider::Xai,
        Provider::Groq,
        Provider::Ollama,
    ];

    /// Lowercase identifier used in configuration files and CLI flags
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
            Provider::DeepSeek => "deepseek",
            Provider::Xai => "xai",
            Provider::Groq => "groq",
            Provider::Ollama => "ollama",
        }
    }

    pub fn adapter_kind(&self) -> AdapterKind {
        match self {
            Provider::Anthropic => AdapterKind::Anthropic,
            Provider::OpenAI => AdapterKind::OpenAI,
            Provider::Gemini => AdapterKind::Gemini,
            Provider::DeepSeek => AdapterKind::DeepSeek,
            Provider::Xai => AdapterKind::Xai,
            Provider::Groq => AdapterKind::Groq,
            Provider::Ollama => AdapterKind::Ollama,
        }
    }

    /// Environment variable holding the API key, `None` when no key is needed
    pub fn credential_env(&self) -> Option<&'static str> {
        match self {
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Provider::Xai => Some("XAI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Ollama => None,
        }
    }

    pub fn has_credentials(&self) -> bool {
        match self.credential_env() {
            None => true,
            Some(var) => std::env::var(var)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false),
        }
    }

    pub fn default_endpoint(&self) -> String {
        match self {
            Provider::Anthropic => "https://api.anthropic.com/v1/".to_string(),
            Provider::OpenAI => "https://api.openai.com/v1/".to_string(),
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            Provider::DeepSeek => "https://api.deepseek.com/v1/".to_string(),
            Provider::Xai => "https://api.x.ai/v1/".to_string(),
            Provider::Groq => "https://api.groq.com/openai/v1/".to_string(),
            Provider::Ollama => {
                let host = std::env::var("OLLAMA_HOST")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string());
                format!("{}/v1/", host.trim_end_matches('/'))
            }
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAI),
            "gemini" | "google" => Ok(Provider::Gemini),
            "deepseek" => Ok(Provider::DeepSeek),
            "xai" | "grok" => Ok(Provider::Xai),
            "groq" => Ok(Provider::Groq),
            "ollama" => Ok(Provider::Ollama),
            other => Err(other.to_string()),
        }
    }
}

/// How much reasoning the model is asked to spend on a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningMode {
    /// Plain completion
    #[default]
    Disabled,
    /// Extended thinking with a token budget (Claude style)
    Enabled,
    Low,
    Medium,
    High,
}

impl ReasoningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningMode::Disabled => "disabled",
            ReasoningMode::Enabled => "enabled",
            ReasoningMode::Low => "low",
            ReasoningMode::Medium => "medium",
            ReasoningMode::High => "high",
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != ReasoningMode::Disabled
    }
}

impl fmt::Display for ReasoningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(ReasoningMode::Disabled),
            "enabled" | "on" => Ok(ReasoningMode::Enabled),
            "low" => Ok(ReasoningMode::Low),
            "medium" => Ok(ReasoningMode::Medium),
            "high" => Ok(ReasoningMode::High),
            other => Err(other.to_string()),
        }
    }
}
