mod gemini;
mod llamacpp;
mod offline;
mod ollama;

use std::sync::Arc;

use banglish_core::{GenerationError, TextGenerator};
use tracing::{info, warn};

pub use offline::OfflineGenerator;

use crate::config::{ModelBackend, ModelConfig};

/// Builds the configured backend. A backend that cannot be initialised
/// degrades to [`OfflineGenerator`], under which every guess is rejected.
pub fn build_generator(model: &ModelConfig) -> Arc<dyn TextGenerator> {
    let built: anyhow::Result<Arc<dyn TextGenerator>> = match model.backend {
        ModelBackend::Offline => Ok(Arc::new(OfflineGenerator)),
        ModelBackend::Ollama => {
            ollama::OllamaGenerator::new(model.clone()).map(|g| Arc::new(g) as Arc<dyn TextGenerator>)
        }
        ModelBackend::Llamacpp => llamacpp::LlamaCppGenerator::new(model.clone())
            .map(|g| Arc::new(g) as Arc<dyn TextGenerator>),
        ModelBackend::Gemini => {
            gemini::GeminiGenerator::new(model.clone()).map(|g| Arc::new(g) as Arc<dyn TextGenerator>)
        }
    };

    match built {
        Ok(generator) => {
            info!(backend = generator.name(), "text generation backend ready");
            generator
        }
        Err(error) => {
            warn!(
                backend = ?model.backend,
                "failed to init generation backend, corrections will not be verified: {error:#}"
            );
            Arc::new(OfflineGenerator)
        }
    }
}

/// Passes a completion through untouched; the verifier decides what it means.
pub(crate) fn raw_reply(raw: String) -> Result<String, GenerationError> {
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyReply);
    }
    Ok(raw)
}
