use std::fmt::{Display, Formatter};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// A transcribed word, tagged with its language and concept.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordForm {
    pub language: String,
    pub concept: String,
    pub symbols: Vec<Symbol>,
}

impl WordForm {
    pub fn new(
        language: impl Into<String>,
        concept: impl Into<String>,
        symbols: Vec<Symbol>,
    ) -> Self {
        Self {
            language: language.into(),
            concept: concept.into(),
            symbols,
        }
    }

    /// Build a form with one symbol per character of `transcription`.
    pub fn from_chars(
        language: impl Into<String>,
        concept: impl Into<String>,
        transcription: &str,
    ) -> Self {
        Self::new(language, concept, Symbol::from_chars(transcription))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbols concatenated back into a single string.
    pub fn transcription(&self) -> String {
        self.symbols.iter().map(Symbol::as_str).collect()
    }
}

impl Display for WordForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.language, self.concept, self.transcription())
    }
}

/// Two forms under comparison. Both forms express the same concept.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WordPair {
    pub first: WordForm,
    pub second: WordForm,
}

impl WordPair {
    pub fn new(first: WordForm, second: WordForm) -> Self {
        Self { first, second }
    }
}

/// Forms believed to descend from a common ancestor. Insertion order is kept
/// so that every downstream traversal is reproducible.
pub type CognateGroup = IndexSet<WordForm>;
