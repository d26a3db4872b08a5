//! Generation client: two model profiles over one HTTP caller.
//!
//! ```text
//! Orchestrator ──► GenerationClient::generate(Profile::Coder, prompt)     ──► sqlcoder (temperature 0)
//!              └─► GenerationClient::generate(Profile::Explainer, prompt) ──► llama3   (temperature 0.7)
//! ```
//!
//! Each call is independent; nothing is shared between invocations except
//! the pooled `reqwest::Client`.

pub mod http;

pub use http::HttpGenerationClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Which generation profile a call uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Deterministic SQL synthesis.
    Coder,
    /// Fluent natural-language summaries.
    Explainer,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Coder => "coder",
            Profile::Explainer => "explainer",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates text for a prompt under a named profile.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, profile: Profile, prompt: &str) -> Result<String, ServerError>;
}

/// Wire protocol spoken by a generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adapter {
    /// Ollama `/api/chat`
    #[default]
    Ollama,
    /// OpenAI-compatible `/chat/completions`
    #[serde(alias = "opencode")]
    Openai,
    /// Anthropic-compatible `/v1/messages`
    Anthropic,
}

impl std::str::FromStr for Adapter {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Adapter::Ollama),
            "openai" | "opencode" => Ok(Adapter::Openai),
            "anthropic" | "claude" => Ok(Adapter::Anthropic),
            other => Err(ServerError::Config(format!("unknown LLM adapter: {}", other))),
        }
    }
}

impl Adapter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adapter::Ollama => "ollama",
            Adapter::Openai => "openai",
            Adapter::Anthropic => "anthropic",
        }
    }
}

/// Configuration of one generation profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    #[serde(default)]
    pub adapter: Adapter,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    pub model: String,

    pub temperature: f64,

    /// Bearer / x-api-key credential (not needed for a local Ollama)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

impl ModelProfile {
    /// SQL-specialized, deterministic profile.
    pub fn coder() -> Self {
        Self {
            adapter: Adapter::Ollama,
            base_url: default_base_url(),
            model: "sqlcoder:7b".to_string(),
            temperature: 0.0,
            api_key: None,
            system_prompt: None,
            max_tokens: default_max_tokens(),
        }
    }

    /// Conversational profile for summaries.
    pub fn explainer() -> Self {
        Self {
            model: "llama3".to_string(),
            temperature: 0.7,
            ..Self::coder()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles() {
        let coder = ModelProfile::coder();
        let explainer = ModelProfile::explainer();
        assert_eq!(coder.temperature, 0.0);
        assert!(explainer.temperature > 0.0);
        assert_eq!(coder.base_url, explainer.base_url);
        assert_ne!(coder.model, explainer.model);
    }

    #[test]
    fn test_adapter_aliases() {
        assert_eq!("OLLAMA".parse::<Adapter>().unwrap(), Adapter::Ollama);
        assert_eq!("opencode".parse::<Adapter>().unwrap(), Adapter::Openai);
        assert_eq!("claude".parse::<Adapter>().unwrap(), Adapter::Anthropic);
        assert!(matches!("bard".parse::<Adapter>(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_profile_yaml_defaults() {
        let profile: ModelProfile = serde_yaml::from_str("model: llama3\ntemperature: 0.4\n").unwrap();
        assert_eq!(profile.adapter, Adapter::Ollama);
        assert_eq!(profile.base_url, DEFAULT_BASE_URL);
        assert_eq!(profile.max_tokens, 2048);
        assert!(profile.api_key.is_none());
    }
}
