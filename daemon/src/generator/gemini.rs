use std::env;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use banglish_core::{GenerationError, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::generator::raw_reply;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiGenerator {
    endpoint: String,
    api_key: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    client: Client,
}

impl GeminiGenerator {
    /// Reads the API key from the environment variable named by
    /// `model.gemini_api_key_env`.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let api_key = env::var(&config.gemini_api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "model.backend is gemini but {} is not set",
                    config.gemini_api_key_env
                )
            })?;
        Self::with_api_key(config, api_key)
    }

    fn with_api_key(config: ModelConfig, api_key: String) -> Result<Self> {
        if config.gemini_model.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is gemini but model.gemini_model is empty"
            ));
        }
        Ok(Self {
            endpoint: format!(
                "{API_BASE}/models/{}:generateContent",
                config.gemini_model.trim()
            ),
            api_key,
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens.max(1),
            client: Client::builder()
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    fn content_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: 1,
                max_output_tokens: self.max_tokens,
            },
        }
    }

    async fn run_gemini(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.content_request(prompt))
            .send()
            .await
            .context("failed to call gemini API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read gemini response body")?;

        if !status.is_success() {
            return Err(anyhow!("gemini API failed ({status}): {body}"));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).context("invalid gemini response format")?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let raw = self.run_gemini(prompt).await?;
        raw_reply(raw)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first candidate; empty when the reply was blocked.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> GeminiGenerator {
        GeminiGenerator::with_api_key(ModelConfig::default(), "test-key".to_string()).unwrap()
    }

    #[test]
    fn missing_key_fails_init() {
        let config = ModelConfig {
            gemini_api_key_env: "BANGLISH_TEST_UNSET_GEMINI_KEY".to_string(),
            ..ModelConfig::default()
        };
        assert!(GeminiGenerator::new(config).is_err());
    }

    #[test]
    fn targets_configured_model() {
        assert_eq!(
            generator().endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn request_uses_camel_case_config() {
        let payload = serde_json::to_value(generator().content_request("kri?")).unwrap();
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "kri?");
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 16);
        assert_eq!(payload["generationConfig"]["topK"], 1);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"kemon"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), "kemon");

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(blocked.text(), "");
    }
}
