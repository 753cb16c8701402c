/// Lexical resolution — mapping filler identifiers to words and hypernyms.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("unknown sense key: {0}")]
    UnknownSense(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// The lexical collaborator consumed by the caption generator.
pub trait LexicalResolver {
    /// Canonical lemma for a filler identifier. Normalization (case,
    /// underscores) is applied by the caller.
    fn resolve(&self, identifier: &str) -> Result<String, LexiconError>;

    /// Direct hypernyms of a surface form, most common sense first.
    /// Empty when the word is unknown or has no hypernyms.
    fn hypernyms_of(&self, surface: &str) -> Vec<String>;
}

/// Returns true for dictionary sense keys: a part-of-speech letter followed
/// by a decimal offset, e.g. `n02084071`.
pub fn is_sense_key(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some('n' | 'v' | 'a' | 's' | 'r') => {}
        _ => return false,
    }
    let rest = chars.as_str();
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// A table-backed lexicon: sense keys to lemmas, lemmas to hypernyms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub senses: FxHashMap<String, String>,
    #[serde(default)]
    pub hypernyms: FxHashMap<String, Vec<String>>,
}

impl Lexicon {
    /// Load a lexicon from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Lexicon, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a lexicon from a RON string.
    pub fn parse_ron(input: &str) -> Result<Lexicon, LexiconError> {
        Ok(ron::from_str(input)?)
    }

    /// Merge another lexicon into this one. Entries from `other` win.
    pub fn merge(&mut self, other: Lexicon) {
        self.senses.extend(other.senses);
        self.hypernyms.extend(other.hypernyms);
    }
}

impl LexicalResolver for Lexicon {
    fn resolve(&self, identifier: &str) -> Result<String, LexiconError> {
        if is_sense_key(identifier) {
            self.senses
                .get(identifier)
                .cloned()
                .ok_or_else(|| LexiconError::UnknownSense(identifier.to_string()))
        } else {
            Ok(identifier.to_string())
        }
    }

    fn hypernyms_of(&self, surface: &str) -> Vec<String> {
        let key = surface.replace(' ', "_");
        self.hypernyms
            .get(surface)
            .or_else(|| self.hypernyms.get(&key))
            .cloned()
            .unwrap_or_default()
    }
}
