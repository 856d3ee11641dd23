use std::collections::{BTreeMap, HashSet};

use crate::defaults;

/// Closed grammatical classes. Declaration order is the lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormCategory {
    VerbPresent,
    VerbPast,
    VerbContinuous,
    Pronoun,
}

#[derive(Debug, Clone)]
pub struct WordForm {
    pub canonical: String,
    pub variants: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WordFormTable {
    categories: BTreeMap<FormCategory, Vec<WordForm>>,
}

impl WordFormTable {
    pub fn builtin() -> Self {
        let mut table = Self::default();
        let tables = [
            (FormCategory::VerbPresent, defaults::VERB_PRESENT),
            (FormCategory::VerbPast, defaults::VERB_PAST),
            (FormCategory::VerbContinuous, defaults::VERB_CONTINUOUS),
            (FormCategory::Pronoun, defaults::PRONOUNS),
        ];
        for (category, forms) in tables {
            for (canonical, variants) in forms {
                table.insert(category, canonical, variants.iter());
            }
        }
        table
    }

    pub fn insert<I, S>(&mut self, category: FormCategory, canonical: &str, variants: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variants = variants
            .into_iter()
            .map(|variant| variant.as_ref().to_lowercase())
            .collect();
        self.categories.entry(category).or_default().push(WordForm {
            canonical: canonical.to_lowercase(),
            variants,
        });
    }

    /// Canonical form of `word`, or `None` when no category lists it. A word
    /// that is its own canonical form comes back unchanged.
    pub fn recognize(&self, word: &str) -> Option<&str> {
        self.recognize_with_category(word)
            .map(|(_, canonical)| canonical)
    }

    pub fn recognize_with_category(&self, word: &str) -> Option<(FormCategory, &str)> {
        let lower = word.to_lowercase();
        self.categories.iter().find_map(|(category, forms)| {
            forms
                .iter()
                .find(|form| form.variants.contains(&lower))
                .map(|form| (*category, form.canonical.as_str()))
        })
    }
}
