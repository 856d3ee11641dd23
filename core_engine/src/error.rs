use std::path::PathBuf;

use thiserror::Error;

/// Why the persisted correction table could not be used.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary file {path} is not a JSON object of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("dictionary file {path} maps {key:?} to a non-string value")]
    InvalidEntry { path: PathBuf, key: String },
    #[error("failed to persist dictionary to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by a text-generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation exceeded {0}ms")]
    Timeout(u64),
    #[error("text generation returned an empty reply")]
    EmptyReply,
    #[error("text generation unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
