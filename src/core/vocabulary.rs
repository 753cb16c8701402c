/// Vocabulary normalizer — batch-scoped memo of identifier → surface form.

use rustc_hash::FxHashMap;

use crate::core::lexicon::{LexicalResolver, LexiconError};

/// Lowercase a lemma and turn underscores into spaces.
pub fn normalize_lemma(lemma: &str) -> String {
    lemma.replace('_', " ").to_lowercase()
}

/// Canonical surface forms for every filler identifier seen in a batch.
///
/// Insertion order is kept so that derived tables are built in the order
/// the batch was scanned.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an identifier, asking the resolver only on first encounter.
    pub fn resolve(
        &mut self,
        resolver: &dyn LexicalResolver,
        identifier: &str,
    ) -> Result<&str, LexiconError> {
        let i = match self.index.get(identifier) {
            Some(&i) => i,
            None => {
                let surface = normalize_lemma(&resolver.resolve(identifier)?);
                let i = self.entries.len();
                self.entries.push((identifier.to_string(), surface));
                self.index.insert(identifier.to_string(), i);
                i
            }
        };
        Ok(&self.entries[i].1)
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.index
            .get(identifier)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// (identifier, surface form) pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, s)| (id.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl LexicalResolver for CountingResolver {
        fn resolve(&self, identifier: &str) -> Result<String, LexiconError> {
            self.calls.set(self.calls.get() + 1);
            match identifier {
                "n1" => Ok("Ice_Cream".to_string()),
                "n2" => Ok("dog".to_string()),
                other => Err(LexiconError::UnknownSense(other.to_string())),
            }
        }

        fn hypernyms_of(&self, _surface: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn normalizes_case_and_underscores() {
        assert_eq!(normalize_lemma("Ice_Cream"), "ice cream");
    }

    #[test]
    fn resolves_once_per_identifier() {
        let resolver = CountingResolver { calls: Cell::new(0) };
        let mut vocab = Vocabulary::new();
        assert_eq!(vocab.resolve(&resolver, "n1").unwrap(), "ice cream");
        assert_eq!(vocab.resolve(&resolver, "n1").unwrap(), "ice cream");
        assert_eq!(vocab.resolve(&resolver, "n2").unwrap(), "dog");
        assert_eq!(resolver.calls.get(), 2);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn keeps_first_seen_order() {
        let resolver = CountingResolver { calls: Cell::new(0) };
        let mut vocab = Vocabulary::new();
        vocab.resolve(&resolver, "n2").unwrap();
        vocab.resolve(&resolver, "n1").unwrap();
        let ids: Vec<&str> = vocab.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["n2", "n1"]);
    }

    #[test]
    fn resolver_errors_propagate_and_are_not_cached() {
        let resolver = CountingResolver { calls: Cell::new(0) };
        let mut vocab = Vocabulary::new();
        assert!(vocab.resolve(&resolver, "n404").is_err());
        assert!(vocab.get("n404").is_none());
        assert!(vocab.is_empty());
    }
}
