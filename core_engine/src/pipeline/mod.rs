mod script;
mod segment;

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

pub use script::contains_bengali;
use segment::Token;

use crate::config::CorrectionConfig;
use crate::dictionary::CorrectionDictionary;
use crate::forms::WordFormTable;
use crate::fuzzy::FuzzyMatcher;
use crate::gloss::GlossMap;
use crate::pattern::PatternNormalizer;
use crate::verify::{ContextVerifier, TextGenerator};

/// How a single word left the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Already Bengali script; not touched.
    NativeScript,
    /// Dictionary key or vocabulary word. Trusted, never verified.
    DictionaryHit,
    /// Word-form guess, accepted or rejected by the verifier.
    FormCandidate { accepted: bool },
    /// Pattern-normaliser guess, accepted or rejected by the verifier.
    PatternCandidate { accepted: bool },
    /// Nearest vocabulary word at or above the single-match threshold.
    Fuzzy { confidence: u8 },
    /// Backend-proposed spelling, only with `generative_fallback`.
    Generative,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOutcome {
    pub original: String,
    pub text: String,
    pub resolution: Resolution,
}

impl WordOutcome {
    pub fn changed(&self) -> bool {
        self.text != self.original
    }
}

enum Proposal {
    Form(String),
    Pattern(String),
}

/// The correction cascade. Tables are fixed at construction; requests only
/// create per-word state.
pub struct Pipeline {
    config: CorrectionConfig,
    dictionary: Arc<CorrectionDictionary>,
    normalizer: PatternNormalizer,
    forms: WordFormTable,
    fuzzy: FuzzyMatcher,
    verifier: ContextVerifier,
    gloss: GlossMap,
}

impl Pipeline {
    /// Loads (or seeds) the dictionary at `config.dictionary_path`.
    pub fn new(config: CorrectionConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let dictionary = CorrectionDictionary::load(&config.dictionary_path);
        Self::with_dictionary(config, dictionary, generator)
    }

    pub fn with_dictionary(
        config: CorrectionConfig,
        dictionary: CorrectionDictionary,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let config = config.normalized();
        let dictionary = Arc::new(dictionary);
        Self {
            normalizer: PatternNormalizer::builtin(),
            forms: WordFormTable::builtin(),
            fuzzy: FuzzyMatcher::new(dictionary.clone()),
            verifier: ContextVerifier::new(generator, config.verify_timeout_ms),
            gloss: GlossMap::builtin(),
            dictionary,
            config,
        }
    }

    pub fn dictionary(&self) -> &CorrectionDictionary {
        &self.dictionary
    }

    /// Runs the full cascade. Returns `text` verbatim when no word changed.
    pub async fn correct(&self, text: &str) -> String {
        let sentences = segment::split_sentences(text);
        if sentences.is_empty() {
            return text.to_string();
        }

        let corrected = join_all(
            sentences
                .iter()
                .map(|sentence| self.correct_sentence(sentence)),
        )
        .await;
        if !corrected.iter().any(|(_, changed)| *changed) {
            debug!("no corrections applied");
            return text.to_string();
        }

        let mut joined = corrected
            .into_iter()
            .map(|(sentence, _)| sentence)
            .collect::<Vec<_>>()
            .join(". ");
        if segment::ends_with_terminator(text) {
            joined.push('.');
        }
        joined
    }

    async fn correct_sentence(&self, sentence: &str) -> (String, bool) {
        let tokens = segment::tokenize(sentence);
        let words: Vec<&str> = tokens
            .iter()
            .filter_map(|token| match token {
                Token::Word(word) => Some(*word),
                Token::Punct(_) => None,
            })
            .collect();

        // Fan out per word; join_all yields results in input order.
        let outcomes = join_all(words.iter().enumerate().map(|(position, word)| {
            let left = position
                .checked_sub(1)
                .and_then(|previous| words.get(previous))
                .copied();
            let right = words.get(position + 1).copied();
            self.correct_word(word, left, right)
        }))
        .await;

        let changed = outcomes.iter().any(WordOutcome::changed);
        let mut outcomes = outcomes.into_iter();
        let rendered: Vec<String> = tokens
            .iter()
            .map(|token| match token {
                Token::Word(word) => outcomes
                    .next()
                    .map(|outcome| outcome.text)
                    .unwrap_or_else(|| word.to_string()),
                Token::Punct(ch) => ch.to_string(),
            })
            .collect();
        (segment::join_tokens(&rendered), changed)
    }

    /// Cascade for one word: dictionary, then word form or pattern guess
    /// (verified), then fuzzy match, then the optional generative fallback.
    pub async fn correct_word(
        &self,
        word: &str,
        left: Option<&str>,
        right: Option<&str>,
    ) -> WordOutcome {
        let outcome = |text: String, resolution: Resolution| WordOutcome {
            original: word.to_string(),
            text,
            resolution,
        };

        if script::contains_bengali(word) {
            return outcome(word.to_string(), Resolution::NativeScript);
        }

        let lower = word.to_lowercase();
        if let Some(canonical) = self.dictionary.lookup(&lower) {
            let text = if canonical == lower {
                word.to_string()
            } else {
                canonical.to_string()
            };
            debug!(word, %text, "dictionary hit");
            return outcome(text, Resolution::DictionaryHit);
        }

        let proposal = match self.forms.recognize(&lower) {
            Some(canonical) if canonical == lower => {
                return outcome(word.to_string(), Resolution::Unchanged);
            }
            Some(canonical) => Some(Proposal::Form(canonical.to_string())),
            None => {
                let normalized = self.normalizer.normalize(&lower);
                (normalized != lower).then_some(Proposal::Pattern(normalized))
            }
        };
        if let Some(proposal) = proposal {
            let candidate = match &proposal {
                Proposal::Form(candidate) | Proposal::Pattern(candidate) => candidate.as_str(),
            };
            let verified = self.verifier.verify(word, candidate, left, right).await;
            let accepted = verified == candidate;
            let resolution = match proposal {
                Proposal::Form(_) => Resolution::FormCandidate { accepted },
                Proposal::Pattern(_) => Resolution::PatternCandidate { accepted },
            };
            return outcome(verified, resolution);
        }

        if let Some(found) = self.fuzzy.best_match(&lower, self.config.fuzzy_threshold) {
            debug!(word, candidate = %found.candidate, confidence = found.confidence, "fuzzy match");
            return outcome(
                found.candidate,
                Resolution::Fuzzy {
                    confidence: found.confidence,
                },
            );
        }

        if self.config.generative_fallback {
            if let Some(generated) = self.verifier.propose(word, left, right).await {
                return outcome(generated, Resolution::Generative);
            }
        }

        outcome(word.to_string(), Resolution::Unchanged)
    }

    /// Full-text alternatives, each differing from `text` in one word. At most
    /// `max_suggestions`, no duplicates.
    pub fn suggest(&self, text: &str) -> Vec<String> {
        let limit = self.config.max_suggestions;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let original = tokens.join(" ");
        let mut seen = HashSet::new();
        let mut suggestions = Vec::new();

        for (position, token) in tokens.iter().enumerate() {
            if suggestions.len() >= limit {
                break;
            }
            let core = token.trim_matches(|ch: char| !ch.is_alphanumeric());
            if core.is_empty() || script::contains_bengali(core) {
                continue;
            }
            let lower = core.to_lowercase();

            let mapped = self.dictionary.lookup(&lower).map(str::to_string);
            let nearby = self
                .fuzzy
                .suggest(
                    &lower,
                    self.config.suggestions_per_word,
                    self.config.suggest_threshold,
                )
                .into_iter()
                .map(|found| found.candidate);

            for candidate in mapped.into_iter().chain(nearby) {
                if candidate == lower {
                    continue;
                }
                let replaced = token.replacen(core, &candidate, 1);
                let sentence = tokens
                    .iter()
                    .enumerate()
                    .map(|(index, other)| {
                        if index == position {
                            replaced.as_str()
                        } else {
                            *other
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                if sentence != original && seen.insert(sentence.clone()) {
                    suggestions.push(sentence);
                    if suggestions.len() >= limit {
                        break;
                    }
                }
            }
        }
        suggestions
    }

    /// Display-only rendering of canonical words in Bengali script.
    pub fn gloss(&self, text: &str) -> String {
        self.gloss.render(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::GenerationError;
    use crate::verify::testing::{
        AcceptingGenerator, ScriptedGenerator, StalledGenerator,
    };

    fn pipeline_with(generator: Arc<dyn TextGenerator>) -> Pipeline {
        let config = CorrectionConfig {
            verify_timeout_ms: 200,
            ..CorrectionConfig::default()
        };
        Pipeline::with_dictionary(config, CorrectionDictionary::builtin(), generator)
    }

    fn rejecting() -> Pipeline {
        pipeline_with(Arc::new(ScriptedGenerator::failing("backend offline")))
    }

    #[tokio::test]
    async fn corrects_greeting() {
        assert_eq!(rejecting().correct("ame kmn acho").await, "ami kemon acho");
    }

    #[tokio::test]
    async fn dictionary_hit_single_word() {
        assert_eq!(rejecting().correct("valo").await, "bhalo");
    }

    #[tokio::test]
    async fn unknown_token_is_left_alone() {
        let pipeline = pipeline_with(Arc::new(ScriptedGenerator::replying("xyzzy")));
        assert_eq!(pipeline.correct("xyzzy").await, "xyzzy");
    }

    #[tokio::test]
    async fn backend_failure_never_escapes() {
        let generator = Arc::new(ScriptedGenerator::failing("503 service unavailable"));
        let pipeline = pipeline_with(generator.clone());
        assert_eq!(pipeline.correct("kri acho").await, "kri acho");
        assert!(generator.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn dictionary_takes_precedence_over_later_stages() {
        let pipeline = pipeline_with(Arc::new(AcceptingGenerator));
        for entry in pipeline.dictionary().entries().to_vec() {
            assert_eq!(pipeline.correct(&entry.misspelling).await, entry.canonical);
        }
    }

    #[tokio::test]
    async fn canonical_text_is_a_fixed_point() {
        let pipeline = pipeline_with(Arc::new(AcceptingGenerator));
        let vocabulary = pipeline.dictionary().vocabulary().to_vec();
        for chunk in vocabulary.chunks(4) {
            let sentence = chunk.join(" ");
            assert_eq!(pipeline.correct(&sentence).await, sentence);
        }
    }

    #[tokio::test]
    async fn verified_form_is_accepted() {
        let pipeline = pipeline_with(Arc::new(AcceptingGenerator));
        let outcome = pipeline.correct_word("kri", Some("ami"), None).await;
        assert_eq!(outcome.text, "kori");
        assert_eq!(outcome.resolution, Resolution::FormCandidate { accepted: true });
        assert_eq!(pipeline.correct("ami kri").await, "ami kori");
    }

    #[tokio::test]
    async fn rejected_pattern_keeps_word() {
        let outcome = rejecting().correct_word("acho", Some("kemon"), None).await;
        assert_eq!(outcome.text, "acho");
        assert_eq!(outcome.resolution, Resolution::PatternCandidate { accepted: false });
    }

    #[tokio::test]
    async fn fuzzy_match_skips_verification() {
        let generator = Arc::new(ScriptedGenerator::failing("unused"));
        let pipeline = pipeline_with(generator.clone());
        let outcome = pipeline.correct_word("ammi", None, None).await;
        assert_eq!(outcome.text, "ami");
        assert!(matches!(outcome.resolution, Resolution::Fuzzy { confidence } if confidence >= 80));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generative_fallback_is_opt_in() {
        let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::replying("mon"));
        let disabled = pipeline_with(generator.clone());
        assert_eq!(disabled.correct("mone").await, "mone");

        let config = CorrectionConfig {
            generative_fallback: true,
            ..CorrectionConfig::default()
        };
        let enabled = Pipeline::with_dictionary(config, CorrectionDictionary::builtin(), generator);
        let outcome = enabled.correct_word("mone", None, None).await;
        assert_eq!(outcome.text, "mon");
        assert_eq!(outcome.resolution, Resolution::Generative);
    }

    #[tokio::test]
    async fn punctuation_and_sentences_survive() {
        let pipeline = rejecting();
        assert_eq!(pipeline.correct("kmn acho?").await, "kemon acho?");
        assert_eq!(pipeline.correct("ame , tmi!").await, "ami, tumi!");
        assert_eq!(pipeline.correct("ame bhalo. tmi kmn").await, "ami bhalo. tumi kemon");
        assert_eq!(pipeline.correct("valo.").await, "bhalo.");
        assert_eq!(pipeline.correct("ame bhalo। tmi").await, "ami bhalo. tumi");
    }

    #[tokio::test]
    async fn blank_and_native_input_pass_through() {
        let pipeline = rejecting();
        assert_eq!(pipeline.correct("").await, "");
        assert_eq!(pipeline.correct("   \n").await, "   \n");
        assert_eq!(pipeline.correct("আমি ভালো").await, "আমি ভালো");
        assert_eq!(pipeline.correct("আমি valo").await, "আমি bhalo");
    }

    #[tokio::test]
    async fn stalled_backend_is_bounded() {
        let config = CorrectionConfig {
            verify_timeout_ms: 20,
            ..CorrectionConfig::default()
        };
        let pipeline =
            Pipeline::with_dictionary(config, CorrectionDictionary::builtin(), Arc::new(StalledGenerator));
        let corrected = tokio::time::timeout(Duration::from_secs(2), pipeline.correct("ame acho"))
            .await
            .expect("verification must time out on its own");
        assert_eq!(corrected, "ami acho");
    }

    struct SlowAccepting;

    #[async_trait]
    impl TextGenerator for SlowAccepting {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            let delay = if prompt.contains("Original word: kri\n") {
                60
            } else if prompt.contains("Original word: krlo\n") {
                30
            } else {
                0
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            AcceptingGenerator.generate(prompt).await
        }
    }

    #[tokio::test]
    async fn results_keep_word_order() {
        let pipeline = pipeline_with(Arc::new(SlowAccepting));
        assert_eq!(pipeline.correct("kri krlo krche").await, "kori korlo korche");
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    struct AbandonTracking {
        abandoned: Arc<AtomicBool>,
    }

    #[async_trait]
    impl TextGenerator for AbandonTracking {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let _flag = DropFlag(self.abandoned.clone());
            std::future::pending::<()>().await;
            Err(GenerationError::EmptyReply)
        }
    }

    #[tokio::test]
    async fn dropping_request_abandons_verification() {
        let abandoned = Arc::new(AtomicBool::new(false));
        let config = CorrectionConfig {
            verify_timeout_ms: 60_000,
            ..CorrectionConfig::default()
        };
        let pipeline = Pipeline::with_dictionary(
            config,
            CorrectionDictionary::builtin(),
            Arc::new(AbandonTracking {
                abandoned: abandoned.clone(),
            }),
        );
        let result = tokio::time::timeout(Duration::from_millis(30), pipeline.correct("acho")).await;
        assert!(result.is_err());
        assert!(abandoned.load(Ordering::SeqCst));
    }

    #[test]
    fn suggestions_include_dictionary_mapping() {
        let suggestions = rejecting().suggest("kmn bhalo");
        assert!(suggestions.contains(&"kemon bhalo".to_string()));
        assert!(suggestions.len() <= 5);
        let unique: HashSet<_> = suggestions.iter().collect();
        assert_eq!(unique.len(), suggestions.len());
    }

    #[test]
    fn suggestions_are_capped_and_distinct() {
        let suggestions = rejecting().suggest("kmn tmi ame amr valo kno acha");
        assert_eq!(suggestions.len(), 5);
        let unique: HashSet<_> = suggestions.iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(!suggestions.contains(&"kmn tmi ame amr valo kno acha".to_string()));
    }

    #[test]
    fn suggestions_keep_attached_punctuation() {
        let suggestions = rejecting().suggest("kmn?");
        assert_eq!(suggestions.first().map(String::as_str), Some("kemon?"));
        assert!(rejecting().suggest("").is_empty());
    }

    #[test]
    fn gloss_renders_native_script() {
        assert_eq!(rejecting().gloss("ami bhalo, tumi?"), "আমি ভালো, তুমি?");
    }
}
