mod scoring;

use std::sync::Arc;

pub use scoring::{gate_match, similarity};

use crate::dictionary::CorrectionDictionary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub candidate: String,
    /// `0..=100`
    pub confidence: u8,
}

/// Nearest-match search over the dictionary vocabulary.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    dictionary: Arc<CorrectionDictionary>,
}

impl FuzzyMatcher {
    pub fn new(dictionary: Arc<CorrectionDictionary>) -> Self {
        Self { dictionary }
    }

    /// Best vocabulary candidate at or above `threshold`. An exact dictionary
    /// hit short-circuits with confidence 100.
    pub fn best_match(&self, word: &str, threshold: u8) -> Option<MatchResult> {
        let lower = word.to_lowercase();
        if let Some(canonical) = self.dictionary.lookup(&lower) {
            return Some(MatchResult {
                candidate: canonical.to_string(),
                confidence: 100,
            });
        }

        let mut best: Option<MatchResult> = None;
        for candidate in self.dictionary.vocabulary() {
            let confidence = similarity(&lower, candidate);
            if best
                .as_ref()
                .map_or(true, |current| confidence > current.confidence)
            {
                best = Some(MatchResult {
                    candidate: candidate.clone(),
                    confidence,
                });
            }
        }
        best.filter(|result| gate_match(result.confidence, threshold))
    }

    /// Up to `limit` candidates at or above `threshold`, highest confidence
    /// first; equal scores keep vocabulary order.
    pub fn suggest(&self, word: &str, limit: usize, threshold: u8) -> Vec<MatchResult> {
        let lower = word.to_lowercase();
        let mut ranked: Vec<MatchResult> = self
            .dictionary
            .vocabulary()
            .iter()
            .map(|candidate| MatchResult {
                candidate: candidate.clone(),
                confidence: similarity(&lower, candidate),
            })
            .filter(|result| gate_match(result.confidence, threshold))
            .collect();
        ranked.sort_by_key(|result| std::cmp::Reverse(result.confidence));
        ranked.truncate(limit);
        ranked
    }
}
