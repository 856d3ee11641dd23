//! Phonetic spelling normalisation: consonant clusters, then vowels, then the
//! word ending.

use std::collections::HashSet;

use tracing::warn;

use crate::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternCategory {
    Consonant,
    Vowel,
    Ending,
}

/// `variants` are substrings (consonant, vowel) or suffixes (ending) that get
/// rewritten to `canonical`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub category: PatternCategory,
    pub canonical: String,
    pub variants: Vec<String>,
}

impl PatternRule {
    /// Returns `None` when no non-empty variant remains.
    pub fn new<I, S>(category: PatternCategory, canonical: &str, variants: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variants: Vec<String> = variants
            .into_iter()
            .map(|variant| variant.as_ref().to_lowercase())
            .filter(|variant| !variant.is_empty())
            .collect();
        if variants.is_empty() {
            return None;
        }
        Some(Self {
            category,
            canonical: canonical.to_lowercase(),
            variants,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatternNormalizer {
    consonants: Vec<PatternRule>,
    vowels: Vec<PatternRule>,
    endings: Vec<PatternRule>,
    /// Vowel variants that also occur inside a consonant variant.
    shadowed_vowels: HashSet<String>,
}

impl PatternNormalizer {
    pub fn new(rules: impl IntoIterator<Item = PatternRule>) -> Self {
        let mut normalizer = Self::default();
        for rule in rules {
            match rule.category {
                PatternCategory::Consonant => normalizer.consonants.push(rule),
                PatternCategory::Vowel => normalizer.vowels.push(rule),
                PatternCategory::Ending => normalizer.endings.push(rule),
            }
        }
        normalizer.shadowed_vowels = normalizer
            .vowels
            .iter()
            .flat_map(|rule| rule.variants.iter())
            .filter(|variant| {
                normalizer
                    .consonants
                    .iter()
                    .flat_map(|rule| rule.variants.iter())
                    .any(|consonant| consonant.contains(variant.as_str()))
            })
            .cloned()
            .collect();
        normalizer
    }

    pub fn builtin() -> Self {
        let tables = [
            (PatternCategory::Consonant, defaults::CONSONANT_RULES),
            (PatternCategory::Vowel, defaults::VOWEL_RULES),
            (PatternCategory::Ending, defaults::ENDING_RULES),
        ];
        let rules = tables.into_iter().flat_map(|(category, table)| {
            table.iter().filter_map(move |(canonical, variants)| {
                let rule = PatternRule::new(category, canonical, variants.iter());
                if rule.is_none() {
                    warn!(canonical, ?category, "dropping pattern rule without variants");
                }
                rule
            })
        });
        Self::new(rules)
    }

    /// Total: the worst case is the lowercased input.
    pub fn normalize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        let (consonants_done, protected) = self.consonant_pass(&lower);
        let vowels_done = self.vowel_pass(&consonants_done, &protected);
        self.ending_pass(vowels_done)
    }

    /// One left-to-right scan; at each position the longest consonant variant
    /// wins and its replacement is never rescanned. Returns the rewritten word
    /// and, per byte, whether it was produced by a consonant rule.
    fn consonant_pass(&self, word: &str) -> (String, Vec<bool>) {
        let mut out = String::with_capacity(word.len() * 2);
        let mut protected = Vec::with_capacity(word.len() * 2);
        let mut position = 0;
        while let Some(ch) = word[position..].chars().next() {
            match longest_variant(&self.consonants, &word[position..], |_| true) {
                Some((canonical, matched)) => {
                    out.push_str(canonical);
                    protected.resize(out.len(), true);
                    position += matched;
                }
                None => {
                    out.push(ch);
                    protected.resize(out.len(), false);
                    position += ch.len_utf8();
                }
            }
        }
        (out, protected)
    }

    fn vowel_pass(&self, word: &str, protected: &[bool]) -> String {
        let mut out = String::with_capacity(word.len());
        let mut position = 0;
        while let Some(ch) = word[position..].chars().next() {
            let rest = &word[position..];
            let start = position;
            let candidate = longest_variant(&self.vowels, rest, |variant| {
                !self.shadowed_vowels.contains(variant)
                    && !protected
                        .get(start..start + variant.len())
                        .map_or(true, |span| span.iter().any(|&flag| flag))
            });
            match candidate {
                Some((canonical, matched)) => {
                    out.push_str(canonical);
                    position += matched;
                }
                None => {
                    out.push(ch);
                    position += ch.len_utf8();
                }
            }
        }
        out
    }

    /// Longest matching suffix across all ending rules; the first rule wins a
    /// tie. A suffix must leave a non-empty stem.
    fn ending_pass(&self, word: String) -> String {
        let mut best: Option<(&str, usize)> = None;
        for rule in &self.endings {
            for variant in &rule.variants {
                if variant.len() < word.len()
                    && word.ends_with(variant.as_str())
                    && best.map_or(true, |(_, length)| variant.len() > length)
                {
                    best = Some((rule.canonical.as_str(), variant.len()));
                }
            }
        }
        match best {
            Some((canonical, length)) => {
                let mut rewritten = word[..word.len() - length].to_string();
                rewritten.push_str(canonical);
                rewritten
            }
            None => word,
        }
    }
}

fn longest_variant<'r>(
    rules: &'r [PatternRule],
    rest: &str,
    allowed: impl Fn(&str) -> bool,
) -> Option<(&'r str, usize)> {
    let mut best: Option<(&'r str, usize)> = None;
    for rule in rules {
        for variant in &rule.variants {
            if rest.starts_with(variant.as_str())
                && best.map_or(true, |(_, length)| variant.len() > length)
                && allowed(variant)
            {
                best = Some((rule.canonical.as_str(), variant.len()));
            }
        }
    }
    best
}
