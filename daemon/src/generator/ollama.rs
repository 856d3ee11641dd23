use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use banglish_core::{GenerationError, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::generator::raw_reply;

const SYSTEM_PROMPT: &str =
    "You check Banglish spelling. Answer with a single word and no explanation.";

pub struct OllamaGenerator {
    base_url: String,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    client: Client,
}

impl OllamaGenerator {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Self::with_client(config, client)
    }

    fn with_client(config: ModelConfig, client: Client) -> Result<Self> {
        if config.ollama_model.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is ollama but model.ollama_model is empty"
            ));
        }
        if config.ollama_host.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is ollama but model.ollama_host is empty"
            ));
        }

        Ok(Self {
            base_url: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.ollama_model,
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens.max(1),
            client,
        })
    }

    fn chat_request(&self, prompt: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.model.clone(),
            stream: false,
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            options: OllamaOptions {
                temperature: self.temperature,
                top_p: self.top_p,
                num_predict: self.max_tokens,
            },
        }
    }

    async fn run_ollama(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(endpoint)
            .json(&self.chat_request(prompt))
            .send()
            .await
            .context("failed to call ollama API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read ollama response body")?;

        if !status.is_success() {
            return Err(anyhow!("ollama API failed ({status}): {body}"));
        }

        let parsed: OllamaChatResponse =
            serde_json::from_str(&body).context("invalid ollama response format")?;
        Ok(parsed.message.content)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let raw = self.run_ollama(prompt).await?;
        raw_reply(raw)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    stream: bool,
    messages: Vec<OllamaMessage>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageResponse {
    content: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use banglish_core::ContextVerifier;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn generator() -> OllamaGenerator {
        OllamaGenerator::new(ModelConfig {
            ollama_host: "http://localhost:11434/".to_string(),
            ollama_model: "llama3".to_string(),
            ..ModelConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn requires_model_name() {
        assert!(OllamaGenerator::new(ModelConfig::default()).is_err());
    }

    #[test]
    fn builds_non_streaming_chat() {
        let generator = generator();
        assert_eq!(generator.base_url, "http://localhost:11434");
        let payload = serde_json::to_value(generator.chat_request("Original word: kri")).unwrap();
        assert_eq!(payload["stream"], false);
        assert_eq!(payload["model"], "llama3");
        assert_eq!(payload["messages"][1]["content"], "Original word: kri");
        assert_eq!(payload["options"]["num_predict"], 16);
    }

    #[test]
    fn parses_chat_reply() {
        let raw = r#"{"model":"llama3","message":{"role":"assistant","content":"kori\n"},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, "kori\n");
    }

    /// Answers one `/api/chat` request with `content`, then closes.
    async fn serve_chat_reply(content: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let body = serde_json::json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": content },
            "done": true,
        })
        .to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 4096];
            loop {
                let read = stream.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
                let Some(end) = request.windows(4).position(|window| window == b"\r\n\r\n") else {
                    continue;
                };
                let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{address}")
    }

    fn local_generator(host: String) -> OllamaGenerator {
        let config = ModelConfig {
            ollama_host: host,
            ollama_model: "llama3".to_string(),
            ..ModelConfig::default()
        };
        OllamaGenerator::with_client(config, Client::builder().no_proxy().build().unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn returns_reply_untruncated() {
        let host = serve_chat_reply("koro\nThe suggested correction is better.").await;
        let reply = local_generator(host).generate("Original word: kore").await.unwrap();
        assert_eq!(reply, "koro\nThe suggested correction is better.");
    }

    #[tokio::test]
    async fn verifier_rejects_multi_line_reply() {
        let host = serve_chat_reply("koro\nThe suggested correction is better.").await;
        let verifier = ContextVerifier::new(Arc::new(local_generator(host)), 2000);
        assert_eq!(verifier.verify("kore", "koro", None, None).await, "kore");
    }

    #[tokio::test]
    async fn verifier_accepts_single_word_reply() {
        let host = serve_chat_reply(" \"koro\"\n").await;
        let verifier = ContextVerifier::new(Arc::new(local_generator(host)), 2000);
        assert_eq!(verifier.verify("kore", "koro", None, None).await, "koro");
    }

    #[tokio::test]
    async fn multi_line_proposal_is_discarded() {
        let host = serve_chat_reply("kemon\nbecause kmn is short for kemon").await;
        let verifier = ContextVerifier::new(Arc::new(local_generator(host)), 2000);
        assert_eq!(verifier.propose("kmn", None, None).await, None);
    }
}
