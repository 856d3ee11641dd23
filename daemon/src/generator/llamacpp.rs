use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use banglish_core::{GenerationError, TextGenerator};
use tokio::process::Command;

use crate::config::ModelConfig;
use crate::generator::raw_reply;

pub struct LlamaCppGenerator {
    model_path: String,
    cli_path: String,
    ctx_len: u32,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl LlamaCppGenerator {
    pub fn new(config: ModelConfig) -> Result<Self> {
        if config.model_path.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is llamacpp but model.model_path is empty"
            ));
        }
        Ok(Self {
            model_path: config.model_path,
            cli_path: config.llama_cli_path,
            ctx_len: config.ctx_len,
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens.max(1),
        })
    }

    fn command(&self, prompt: &str) -> Command {
        let mut command = Command::new(&self.cli_path);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("-n")
            .arg(self.max_tokens.to_string())
            .arg("-c")
            .arg(self.ctx_len.to_string())
            .arg("--temp")
            .arg(self.temperature.to_string())
            .arg("--top-p")
            .arg(self.top_p.to_string())
            .arg("-p")
            .arg(prompt)
            .arg("--no-display-prompt")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The verifier drops this future on timeout; the child goes with it.
            .kill_on_drop(true);
        command
    }

    async fn run_llama_cli(&self, prompt: &str) -> Result<String> {
        let output = self
            .command(prompt)
            .output()
            .await
            .context("failed to execute llama.cpp")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(anyhow!(
                "llama.cpp exited with {}: {}",
                output.status,
                stderr
            ));
        }

        String::from_utf8(output.stdout).context("llama.cpp stdout is not UTF-8")
    }
}

#[async_trait]
impl TextGenerator for LlamaCppGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let raw = self.run_llama_cli(prompt).await?;
        raw_reply(raw)
    }

    fn name(&self) -> &'static str {
        "llamacpp"
    }
}
