use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Tunables for the correction cascade. Deserialised from the `[correction]`
/// table of the daemon config; every field falls back to its default.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionConfig {
    #[serde(default = "default_dictionary_path")]
    pub dictionary_path: PathBuf,
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    #[serde(default = "default_suggest_threshold")]
    pub suggest_threshold: u8,
    #[serde(default = "default_suggestions_per_word")]
    pub suggestions_per_word: usize,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_verify_timeout_ms")]
    pub verify_timeout_ms: u64,
    #[serde(default)]
    pub generative_fallback: bool,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            dictionary_path: default_dictionary_path(),
            fuzzy_threshold: default_fuzzy_threshold(),
            suggest_threshold: default_suggest_threshold(),
            suggestions_per_word: default_suggestions_per_word(),
            max_suggestions: default_max_suggestions(),
            verify_timeout_ms: default_verify_timeout_ms(),
            generative_fallback: false,
        }
    }
}

impl CorrectionConfig {
    /// Clamps thresholds into `0..=100`.
    pub fn normalized(mut self) -> Self {
        self.fuzzy_threshold = self.fuzzy_threshold.min(100);
        self.suggest_threshold = self.suggest_threshold.min(100);
        if self.verify_timeout_ms == 0 {
            self.verify_timeout_ms = default_verify_timeout_ms();
        }
        self
    }
}

fn default_dictionary_path() -> PathBuf {
    if let Some(base) = dirs::data_dir() {
        return base.join("banglish").join("corrections.json");
    }
    Path::new("/tmp/banglish-corrections.json").to_path_buf()
}

fn default_fuzzy_threshold() -> u8 {
    80
}

fn default_suggest_threshold() -> u8 {
    65
}

fn default_suggestions_per_word() -> usize {
    3
}

fn default_max_suggestions() -> usize {
    5
}

fn default_verify_timeout_ms() -> u64 {
    2500
}
