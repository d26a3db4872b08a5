//! HTTP generation client: calls Ollama, OpenAI-compatible or
//! Anthropic-compatible chat APIs directly via reqwest.

use std::time::Duration;

use async_trait::async_trait;

use super::{Adapter, GenerationClient, ModelProfile, Profile};
use crate::error::ServerError;

/// Default per-call HTTP timeout.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 300;

/// Calls the configured backend for each profile.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    coder: ModelProfile,
    explainer: ModelProfile,
}

impl HttpGenerationClient {
    pub fn new(coder: ModelProfile, explainer: ModelProfile) -> Self {
        Self::with_timeout(coder, explainer, Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS))
    }

    pub fn with_timeout(coder: ModelProfile, explainer: ModelProfile, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            coder,
            explainer,
        }
    }

    pub fn profile(&self, profile: Profile) -> &ModelProfile {
        match profile {
            Profile::Coder => &self.coder,
            Profile::Explainer => &self.explainer,
        }
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, profile: Profile, prompt: &str) -> Result<String, ServerError> {
        let config = self.profile(profile);
        let url = endpoint_url(config);
        let body = request_body(config, prompt);

        tracing::info!(
            "[Generation] Calling {} API: {} (profile: {}, model: {})",
            config.adapter.as_str(),
            url,
            profile,
            config.model
        );

        let mut request = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body);

        request = match (config.adapter, config.api_key.as_deref()) {
            (Adapter::Anthropic, key) => request
                .header("x-api-key", key.unwrap_or_default())
                .header("anthropic-version", "2023-06-01"),
            (_, Some(key)) if !key.is_empty() => {
                request.header("Authorization", format!("Bearer {}", key))
            }
            _ => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ServerError::Generation(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ServerError::Generation(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(ServerError::Generation(format!(
                "API returned {}: {}",
                status, response_text
            )));
        }

        let json: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| ServerError::Generation(format!("Failed to parse response JSON: {}", e)))?;

        extract_content(config.adapter, &json).ok_or_else(|| {
            ServerError::Generation(format!(
                "{} response contained no text content",
                config.adapter.as_str()
            ))
        })
    }
}

fn endpoint_url(config: &ModelProfile) -> String {
    let base = config.base_url.trim_end_matches('/');
    match config.adapter {
        Adapter::Ollama => format!("{}/api/chat", base),
        Adapter::Openai => format!("{}/chat/completions", base),
        Adapter::Anthropic => format!("{}/v1/messages", base),
    }
}

/// Build the JSON request body for a single-turn prompt.
pub fn request_body(config: &ModelProfile, prompt: &str) -> serde_json::Value {
    let mut messages = vec![];
    if config.adapter != Adapter::Anthropic {
        if let Some(system) = config.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
    }
    messages.push(serde_json::json!({ "role": "user", "content": prompt }));

    let temperature = serde_json::Number::from_f64(config.temperature)
        .unwrap_or_else(|| serde_json::Number::from(0));

    match config.adapter {
        Adapter::Ollama => serde_json::json!({
            "model": config.model,
            "messages": messages,
            "stream": false,
            "options": { "temperature": temperature }
        }),
        Adapter::Openai => serde_json::json!({
            "model": config.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": config.max_tokens
        }),
        Adapter::Anthropic => {
            let mut body = serde_json::json!({
                "model": config.model,
                "max_tokens": config.max_tokens,
                "messages": messages,
                "temperature": temperature
            });
            if let Some(system) = config.system_prompt.as_deref().filter(|s| !s.is_empty()) {
                body["system"] = serde_json::Value::String(system.to_string());
            }
            body
        }
    }
}

/// Extract the generated text from a backend response.
pub fn extract_content(adapter: Adapter, json: &serde_json::Value) -> Option<String> {
    match adapter {
        Adapter::Ollama => json
            .get("message")
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string()),
        Adapter::Openai => json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string()),
        Adapter::Anthropic => json
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|arr| {
                arr.iter()
                    .filter_map(|block| {
                        if block.get("type").and_then(|t| t.as_str()) == Some("text") {
                            block.get("text").and_then(|t| t.as_str()).map(|s| s.to_string())
                        } else {
                            None
                        }
                    })
                    .reduce(|a, b| format!("{}\n{}", a, b))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_body_carries_temperature() {
        let body = request_body(&ModelProfile::coder(), "count employees");
        assert_eq!(body["model"], "sqlcoder:7b");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "count employees");
    }

    #[test]
    fn test_openai_body_includes_system_prompt() {
        let profile = ModelProfile {
            adapter: Adapter::Openai,
            system_prompt: Some("You are a friendly analyst.".to_string()),
            ..ModelProfile::explainer()
        };
        let body = request_body(&profile, "summarize");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "summarize");
        assert_eq!(body["temperature"], 0.7);
    }

    #[test]
    fn test_anthropic_body_uses_top_level_system() {
        let profile = ModelProfile {
            adapter: Adapter::Anthropic,
            system_prompt: Some("Be brief.".to_string()),
            ..ModelProfile::explainer()
        };
        let body = request_body(&profile, "summarize");
        assert_eq!(body["system"], "Be brief.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["max_tokens"], 2048);
    }

    #[test]
    fn test_endpoint_urls() {
        let mut profile = ModelProfile::coder();
        profile.base_url = "http://ollama:11434/".to_string();
        assert_eq!(endpoint_url(&profile), "http://ollama:11434/api/chat");
        profile.adapter = Adapter::Openai;
        assert_eq!(endpoint_url(&profile), "http://ollama:11434/chat/completions");
        profile.adapter = Adapter::Anthropic;
        assert_eq!(endpoint_url(&profile), "http://ollama:11434/v1/messages");
    }

    #[test]
    fn test_extract_content_per_adapter() {
        let ollama = serde_json::json!({
            "model": "sqlcoder:7b",
            "message": { "role": "assistant", "content": "SELECT 1" },
            "done": true
        });
        assert_eq!(extract_content(Adapter::Ollama, &ollama).as_deref(), Some("SELECT 1"));

        let openai = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello" } }]
        });
        assert_eq!(extract_content(Adapter::Openai, &openai).as_deref(), Some("Hello"));

        let anthropic = serde_json::json!({
            "content": [
                { "type": "text", "text": "first" },
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": "second" }
            ]
        });
        assert_eq!(
            extract_content(Adapter::Anthropic, &anthropic).as_deref(),
            Some("first\nsecond")
        );

        assert_eq!(extract_content(Adapter::Ollama, &openai), None);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_generation_error() {
        let mut coder = ModelProfile::coder();
        coder.base_url = "http://127.0.0.1:9".to_string();
        let client = HttpGenerationClient::with_timeout(
            coder,
            ModelProfile::explainer(),
            Duration::from_secs(2),
        );
        let err = client.generate(Profile::Coder, "SELECT").await.unwrap_err();
        assert!(matches!(err, ServerError::Generation(_)));
    }
}
