use strsim::{jaro_winkler, normalized_damerau_levenshtein};

// Jaro-Winkler favours a shared prefix.
const EDIT_WEIGHT: f64 = 0.6;
const PREFIX_WEIGHT: f64 = 0.4;

/// Weighted similarity of two lowercase words, `0..=100`.
pub fn similarity(word: &str, candidate: &str) -> u8 {
    if word == candidate {
        return 100;
    }
    if word.is_empty() || candidate.is_empty() {
        return 0;
    }
    let edit = normalized_damerau_levenshtein(word, candidate);
    let prefix = jaro_winkler(word, candidate);
    let score = (EDIT_WEIGHT * edit + PREFIX_WEIGHT * prefix) * 100.0;
    // Truncated, so a blend just under a gate never rounds up to it.
    score.floor().clamp(0.0, 100.0) as u8
}

pub fn gate_match(confidence: u8, threshold: u8) -> bool {
    confidence >= threshold
}
