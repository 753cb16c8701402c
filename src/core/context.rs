/// Batch context — the immutable per-batch snapshot of vocabulary,
/// determiner and preposition tables, and agent/place occurrence lists.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::core::corpus::TaggedCorpus;
use crate::core::lexicon::{LexicalResolver, LexiconError};
use crate::core::roles::PLACE_ROLE;
use crate::core::vocabulary::Vocabulary;
use crate::schema::annotation::Batch;
use crate::schema::rolemap::RoleMaps;

/// Determiner used for words the corpus has no preference for.
pub const DEFAULT_DETERMINER: &str = "the";

/// Tables shared by every frame of one batch. Built once, then read-only.
#[derive(Debug, Clone, Default)]
pub struct BatchContext {
    vocabulary: Vocabulary,
    determiners: FxHashMap<String, String>,
    prepositions: FxHashMap<String, String>,
    agents: FxHashMap<String, Vec<String>>,
    places: FxHashMap<String, Vec<String>>,
}

impl BatchContext {
    pub fn builder<'a>(
        resolver: &'a dyn LexicalResolver,
        role_maps: &'a RoleMaps,
    ) -> BatchContextBuilder<'a> {
        BatchContextBuilder {
            resolver,
            role_maps,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Surface form of a filler identifier seen in the batch.
    pub fn surface(&self, identifier: &str) -> Option<&str> {
        self.vocabulary.get(identifier)
    }

    /// Corpus-preferred determiner for a surface form, "the" by default.
    pub fn determiner(&self, surface: &str) -> &str {
        self.determiners
            .get(surface)
            .map(String::as_str)
            .unwrap_or(DEFAULT_DETERMINER)
    }

    pub fn preposition(&self, surface: &str) -> Option<&str> {
        self.prepositions.get(surface).map(String::as_str)
    }

    /// Fillers seen under agent roles anywhere in the image's frames.
    pub fn agents(&self, image: &str) -> &[String] {
        self.agents.get(image).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fillers seen under the place role anywhere in the image's frames.
    pub fn places(&self, image: &str) -> &[String] {
        self.places.get(image).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Runs the preprocessing sweep over a batch. One builder per batch.
pub struct BatchContextBuilder<'a> {
    resolver: &'a dyn LexicalResolver,
    role_maps: &'a RoleMaps,
}

impl<'a> BatchContextBuilder<'a> {
    pub fn build(self, batch: &Batch, corpus: &TaggedCorpus) -> Result<BatchContext, LexiconError> {
        let mut vocabulary = Vocabulary::new();
        let mut agents = FxHashMap::default();
        let mut places = FxHashMap::default();
        let mut all_agents: FxHashSet<String> = FxHashSet::default();
        let mut all_places: FxHashSet<String> = FxHashSet::default();

        for (key, annotation) in batch.iter() {
            let mut image_agents = Vec::new();
            let mut image_places = Vec::new();
            for frame in &annotation.frames {
                for (role, filler) in frame.filled() {
                    vocabulary.resolve(self.resolver, filler)?;
                    if self.role_maps.is_agent_role(role) {
                        image_agents.push(filler.to_string());
                        all_agents.insert(filler.to_string());
                    }
                    if role == PLACE_ROLE {
                        image_places.push(filler.to_string());
                        all_places.insert(filler.to_string());
                    }
                }
            }
            agents.insert(key.to_string(), image_agents);
            places.insert(key.to_string(), image_places);
        }

        let single_words: FxHashSet<String> = vocabulary
            .iter()
            .map(|(_, surface)| surface)
            .filter(|surface| surface.split_whitespace().count() == 1)
            .map(str::to_string)
            .collect();
        let determiners = corpus.determiners_for(&single_words, &self.role_maps.determiners);

        let place_words: FxHashSet<String> = vocabulary
            .iter()
            .filter(|(id, _)| all_places.contains(*id))
            .map(|(_, surface)| surface.to_string())
            .collect();
        let mut prepositions =
            corpus.prepositions_for(&place_words, Some(&self.role_maps.place_prepositions));

        let other_words: FxHashSet<String> = vocabulary
            .iter()
            .filter(|(id, _)| !all_places.contains(*id) && !all_agents.contains(*id))
            .filter_map(|(_, surface)| surface.split_whitespace().next())
            .map(str::to_string)
            .collect();
        for (word, prep) in corpus.prepositions_for(&other_words, None) {
            prepositions.entry(word).or_insert(prep);
        }

        debug!(
            images = batch.len(),
            vocabulary = vocabulary.len(),
            determiners = determiners.len(),
            prepositions = prepositions.len(),
            "built batch context"
        );

        Ok(BatchContext {
            vocabulary,
            determiners,
            prepositions,
            agents,
            places,
        })
    }
}
