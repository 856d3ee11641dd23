use async_trait::async_trait;
use banglish_core::{GenerationError, TextGenerator};

/// No model configured. Every call fails, so the verifier keeps original
/// words and only dictionary and fuzzy corrections apply.
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable(
            "no text generation backend configured".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
