use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use banglish_core::CorrectionConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub correction: CorrectionConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();
        if config_path.exists() {
            return Self::from_file(&config_path);
        }

        Ok(DaemonConfig::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse TOML from {}", path.display()))
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("BANGLISH_CONFIG") {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("banglish").join("config.toml");
    }

    Path::new("/tmp/banglish.toml").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_socket_path() -> PathBuf {
    Path::new("/tmp/banglish.sock").to_path_buf()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_backend")]
    pub backend: ModelBackend,
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,
    #[serde(default)]
    pub ollama_model: String,
    #[serde(default)]
    pub model_path: String,
    #[serde(default = "default_llama_cli_path")]
    pub llama_cli_path: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// Name of the environment variable holding the API key, never the key.
    #[serde(default = "default_gemini_api_key_env")]
    pub gemini_api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_ctx_len")]
    pub ctx_len: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            ollama_host: default_ollama_host(),
            ollama_model: String::new(),
            model_path: String::new(),
            llama_cli_path: default_llama_cli_path(),
            gemini_model: default_gemini_model(),
            gemini_api_key_env: default_gemini_api_key_env(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            ctx_len: default_ctx_len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    Offline,
    Ollama,
    Llamacpp,
    Gemini,
}

fn default_backend() -> ModelBackend {
    ModelBackend::Offline
}

fn default_ollama_host() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_llama_cli_path() -> String {
    "llama-cli".to_string()
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_gemini_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    16
}

fn default_ctx_len() -> u32 {
    1024
}
