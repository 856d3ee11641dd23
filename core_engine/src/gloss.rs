use std::collections::HashMap;

use crate::defaults;

/// Canonical Banglish word -> Bengali script. Display only.
#[derive(Debug, Clone, Default)]
pub struct GlossMap {
    entries: HashMap<String, String>,
}

impl GlossMap {
    pub fn builtin() -> Self {
        Self::from_pairs(defaults::GLOSS.iter().copied())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(word, native)| (word.as_ref().to_lowercase(), native.into()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(&word.to_lowercase()).map(String::as_str)
    }

    /// Replaces every known word, keeping attached punctuation. Unknown words
    /// pass through; whitespace collapses to single spaces.
    pub fn render(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| {
                let core = token.trim_matches(|ch: char| !ch.is_alphanumeric());
                match (core.is_empty(), self.get(core)) {
                    (false, Some(native)) => token.replacen(core, native, 1),
                    _ => token.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
