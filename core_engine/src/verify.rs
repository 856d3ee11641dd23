//! Context verification of heuristic corrections through an external
//! text-generation backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::GenerationError;

/// Anything that turns a prompt into free-form text, or fails.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    fn name(&self) -> &'static str {
        "generator"
    }
}

/// Accepts or rejects a proposed correction. Every failure resolves to the
/// original word.
#[derive(Clone)]
pub struct ContextVerifier {
    generator: Arc<dyn TextGenerator>,
    timeout_ms: u64,
}

impl ContextVerifier {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout_ms: u64) -> Self {
        Self {
            generator,
            timeout_ms: timeout_ms.max(1),
        }
    }

    /// Returns either `original` or `corrected`, never anything else.
    pub async fn verify(
        &self,
        original: &str,
        corrected: &str,
        left: Option<&str>,
        right: Option<&str>,
    ) -> String {
        let prompt = verification_prompt(original, corrected, left, right);
        match self.ask(&prompt).await {
            Ok(reply) if reply == corrected.to_lowercase() => {
                debug!(original, corrected, "correction accepted");
                corrected.to_string()
            }
            Ok(reply) if reply == original.to_lowercase() => {
                debug!(original, corrected, "correction rejected");
                original.to_string()
            }
            Ok(reply) => {
                warn!(original, corrected, %reply, "verifier reply matched neither word");
                original.to_string()
            }
            Err(error) => {
                warn!(
                    original,
                    corrected,
                    backend = self.generator.name(),
                    "verification failed: {error}"
                );
                original.to_string()
            }
        }
    }

    /// Asks the backend for a standalone correction of `word`. Only a single
    /// ASCII-alphabetic token that differs from the input is returned.
    pub async fn propose(
        &self,
        word: &str,
        left: Option<&str>,
        right: Option<&str>,
    ) -> Option<String> {
        let prompt = correction_prompt(word, left, right);
        match self.ask(&prompt).await {
            Ok(reply)
                if !reply.is_empty()
                    && reply.chars().all(|ch| ch.is_ascii_alphabetic())
                    && reply != word.to_lowercase() =>
            {
                Some(reply)
            }
            Ok(reply) => {
                debug!(word, %reply, "discarding generated correction");
                None
            }
            Err(error) => {
                warn!(
                    word,
                    backend = self.generator.name(),
                    "generated correction failed: {error}"
                );
                None
            }
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
        let reply = timeout(
            Duration::from_millis(self.timeout_ms),
            self.generator.generate(prompt),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.timeout_ms))??;
        Ok(clean_reply(&reply))
    }
}

/// Trims, drops quote characters and lowercases a raw backend reply.
pub fn clean_reply(raw: &str) -> String {
    raw.trim()
        .replace(['"', '\'', '`'], "")
        .trim()
        .to_lowercase()
}

fn context_phrase(word: &str, left: Option<&str>, right: Option<&str>) -> String {
    let mut phrase = String::new();
    if let Some(left) = left {
        phrase.push_str(left);
        phrase.push(' ');
    }
    phrase.push_str(word);
    if let Some(right) = right {
        phrase.push(' ');
        phrase.push_str(right);
    }
    phrase
}

pub fn verification_prompt(
    original: &str,
    corrected: &str,
    left: Option<&str>,
    right: Option<&str>,
) -> String {
    let context = context_phrase(original, left, right);
    format!(
        "You verify spelling corrections for Banglish (Bengali written with English letters).\n\
         Original word: {original}\n\
         Suggested correction: {corrected}\n\
         Context: \"{context}\"\n\
         Consider the surrounding words, whether the meaning is kept and whether the \
         correction follows Bengali spelling patterns.\n\
         Reply with exactly one word and nothing else:\n\
         - \"{original}\" if the original is correct or you are unsure\n\
         - \"{corrected}\" if the correction is better"
    )
}

pub fn correction_prompt(word: &str, left: Option<&str>, right: Option<&str>) -> String {
    let context = context_phrase(word, left, right);
    format!(
        "You correct informal Banglish (Bengali written with English letters) spellings \
         to their standard Banglish form. Do not use Bengali script.\n\
         Examples: ame -> ami, kmn -> kemon, valo -> bhalo, kivabe -> kibhabe, acha -> achcha.\n\
         Only correct the word if it is misspelled; keep valid dialect forms.\n\
         Context: \"{context}\"\n\
         Reply with the corrected form of \"{word}\" only."
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replies with a fixed string and records every prompt.
    pub struct ScriptedGenerator {
        reply: Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|message| GenerationError::Backend(anyhow::anyhow!(message)))
        }
    }

    /// Accepts whatever correction the prompt proposes.
    pub struct AcceptingGenerator;

    #[async_trait]
    impl TextGenerator for AcceptingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            prompt
                .lines()
                .find_map(|line| line.strip_prefix("Suggested correction: "))
                .map(str::to_string)
                .ok_or(GenerationError::EmptyReply)
        }
    }

    /// Never answers.
    pub struct StalledGenerator;

    #[async_trait]
    impl TextGenerator for StalledGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            std::future::pending::<()>().await;
            Err(GenerationError::EmptyReply)
        }
    }
}
