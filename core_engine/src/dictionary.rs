//! Exact-match correction table (misspelling -> canonical) and the vocabulary
//! derived from it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::defaults;
use crate::error::DictionaryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionEntry {
    pub misspelling: String,
    pub canonical: String,
}

/// Read-only after construction. Keys and values are lowercase.
#[derive(Debug, Clone, Default)]
pub struct CorrectionDictionary {
    entries: Vec<CorrectionEntry>,
    index: HashMap<String, usize>,
    vocabulary: Vec<String>,
    vocabulary_set: HashSet<String>,
}

impl CorrectionDictionary {
    pub fn builtin() -> Self {
        Self::from_pairs(defaults::CORRECTIONS.iter().copied())
    }

    /// Builds a dictionary from `(misspelling, canonical)` pairs. Both sides
    /// are trimmed and lowercased; pairs with an empty side are dropped and
    /// the first occurrence of a key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut dictionary = Self::default();
        for (misspelling, canonical) in pairs {
            let misspelling = misspelling.as_ref().trim().to_lowercase();
            let canonical = canonical.as_ref().trim().to_lowercase();
            if misspelling.is_empty() || canonical.is_empty() {
                continue;
            }
            if dictionary.index.contains_key(&misspelling) {
                debug!(%misspelling, "duplicate dictionary key ignored");
                continue;
            }
            if dictionary.vocabulary_set.insert(canonical.clone()) {
                dictionary.vocabulary.push(canonical.clone());
            }
            dictionary
                .index
                .insert(misspelling.clone(), dictionary.entries.len());
            dictionary.entries.push(CorrectionEntry {
                misspelling,
                canonical,
            });
        }
        dictionary
    }

    /// Loads the persisted table at `path`. A missing file is seeded with the
    /// built-in table; an unreadable or malformed one is left alone and the
    /// built-in table is used instead. Never fails.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(dictionary)) => {
                info!(
                    path = %path.display(),
                    entries = dictionary.len(),
                    vocabulary = dictionary.vocabulary.len(),
                    "loaded correction dictionary"
                );
                dictionary
            }
            Ok(None) => {
                let dictionary = Self::builtin();
                match dictionary.persist(path) {
                    Ok(()) => info!(path = %path.display(), "seeded correction dictionary"),
                    Err(error) => warn!("{error}; continuing with built-in corrections"),
                }
                dictionary
            }
            Err(error) => {
                warn!("{error}; falling back to built-in corrections");
                Self::builtin()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, DictionaryError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DictionaryError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let object: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|source| DictionaryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut pairs = Vec::with_capacity(object.len());
        for (key, value) in object {
            match value {
                Value::String(canonical) => pairs.push((key, canonical)),
                _ => {
                    return Err(DictionaryError::InvalidEntry {
                        path: path.to_path_buf(),
                        key,
                    })
                }
            }
        }
        Ok(Some(Self::from_pairs(pairs)))
    }

    /// Writes the table as a JSON object through a temp file in the target
    /// directory, so readers only ever see a complete file.
    pub fn persist(&self, path: &Path) -> Result<(), DictionaryError> {
        let failed = |source: io::Error| DictionaryError::Persist {
            path: path.to_path_buf(),
            source,
        };
        let parent = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(failed)?;

        let mut object = Map::new();
        for entry in &self.entries {
            object.insert(
                entry.misspelling.clone(),
                Value::String(entry.canonical.clone()),
            );
        }

        let mut temp = NamedTempFile::new_in(parent).map_err(failed)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &object)
                .map_err(|error| failed(error.into()))?;
            writer.flush().map_err(failed)?;
        }
        temp.persist(path).map_err(|error| failed(error.error))?;
        Ok(())
    }

    /// Strict key lookup. `misspelling` must already be lowercase.
    pub fn canonical(&self, misspelling: &str) -> Option<&str> {
        self.index
            .get(misspelling)
            .and_then(|&position| self.entries.get(position))
            .map(|entry| entry.canonical.as_str())
    }

    /// Key lookup, then vocabulary membership: a canonical word maps to itself.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.canonical(word).or_else(|| {
            self.vocabulary_set
                .get(word)
                .map(String::as_str)
        })
    }

    /// Canonical values in first-seen order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn entries(&self) -> &[CorrectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
