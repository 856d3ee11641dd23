//! Spelling normalisation for Banglish (Bengali written in Latin script).
//!
//! [`Pipeline`] runs each word through a dictionary lookup, word-form and
//! phonetic-pattern guesses checked by a [`TextGenerator`], and a fuzzy match
//! against the dictionary vocabulary.

pub mod config;
pub mod defaults;
pub mod dictionary;
pub mod error;
pub mod forms;
pub mod fuzzy;
pub mod gloss;
pub mod pattern;
pub mod pipeline;
pub mod verify;

pub use config::CorrectionConfig;
pub use dictionary::CorrectionDictionary;
pub use error::{DictionaryError, GenerationError};
pub use pipeline::{Pipeline, Resolution, WordOutcome};
pub use verify::{ContextVerifier, TextGenerator};
