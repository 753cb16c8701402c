/// The caption pipeline: Frame → Sentence orchestration.
///
/// Wires together the batch context, role classification, phrase building
/// and sentence assembly for one batch of annotations.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

use crate::core::context::BatchContext;
use crate::core::corpus::TaggedCorpus;
use crate::core::lexicon::{LexicalResolver, LexiconError};
use crate::core::phrase::{PhraseBuilder, PhraseError};
use crate::core::roles::{RoleClassifier, Slot};
use crate::core::sentence::{Clause, SentenceParts, FALLBACK_SUBJECT};
use crate::core::variety::Variation;
use crate::schema::annotation::{Batch, Frame};
use crate::schema::rolemap::{RoleMapError, RoleMaps};

/// Seed used when the builder is not given one.
pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("phrase error: {0}")]
    Phrase(#[from] PhraseError),
    #[error("role map error: {0}")]
    RoleMap(#[from] RoleMapError),
    #[error("image key not in batch: {0}")]
    UnknownImage(String),
}

/// Generates one caption per frame for the images of a single batch.
///
/// All tables are built by `CaptionGeneratorBuilder::build`; afterwards only
/// the RNG changes. Captions depend on the seed and on the order in which
/// images are requested.
pub struct CaptionGenerator<'a> {
    batch: &'a Batch,
    resolver: &'a dyn LexicalResolver,
    role_maps: RoleMaps,
    classifier: RoleClassifier,
    context: BatchContext,
    variation: Variation,
    rng: StdRng,
    seed: u64,
}

/// Builder for constructing a `CaptionGenerator`.
pub struct CaptionGeneratorBuilder {
    role_maps_path: Option<String>,
    seed: u64,
    variation: Variation,
    /// Directly provided role maps (for testing without files).
    role_maps: Option<RoleMaps>,
}

impl<'a> CaptionGenerator<'a> {
    pub fn builder() -> CaptionGeneratorBuilder {
        CaptionGeneratorBuilder {
            role_maps_path: None,
            seed: DEFAULT_SEED,
            variation: Variation::default(),
            role_maps: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn context(&self) -> &BatchContext {
        &self.context
    }

    pub fn role_maps(&self) -> &RoleMaps {
        &self.role_maps
    }

    /// Captions for every frame of one image, in frame order.
    pub fn generate_sentences(&mut self, image: &str) -> Result<Vec<String>, GeneratorError> {
        let batch = self.batch;
        let annotation = batch
            .get(image)
            .ok_or_else(|| GeneratorError::UnknownImage(image.to_string()))?;

        let mut sentences = Vec::with_capacity(annotation.frames.len());
        for frame in &annotation.frames {
            let sentence = self.caption_frame(image, &annotation.verb, frame)?;
            trace!(image, sentence = %sentence, "generated caption");
            sentences.push(sentence);
        }
        debug!(image, frames = sentences.len(), "captioned image");
        Ok(sentences)
    }

    /// Captions for every image of the batch, in batch order.
    pub fn generate_all(&mut self) -> Result<Vec<(String, Vec<String>)>, GeneratorError> {
        let batch = self.batch;
        batch
            .keys()
            .map(|image| -> Result<_, GeneratorError> {
                Ok((image.to_string(), self.generate_sentences(image)?))
            })
            .collect()
    }

    fn caption_frame(
        &mut self,
        image: &str,
        verb: &str,
        frame: &Frame,
    ) -> Result<String, GeneratorError> {
        let filled: Vec<Slot<'_>> = frame
            .filled()
            .into_iter()
            .map(|(role, filler)| Slot::new(role, filler))
            .collect();
        let roles = self.classifier.classify(
            &filled,
            self.context.agents(image),
            self.context.places(image),
        );

        let mut phrases = PhraseBuilder::new(
            &self.context,
            &self.role_maps,
            self.resolver,
            self.variation,
            &mut self.rng,
        );

        // Draw order: subject, verb, object, then the passive gate.
        let subject = match roles.subject {
            Some(slot) => phrases.noun_phrase(slot)?,
            None => FALLBACK_SUBJECT.to_string(),
        };
        let verb_phrase = phrases.verb_phrase(verb, roles.subject)?;
        let object = roles
            .object
            .map(|slot| phrases.noun_phrase(slot))
            .transpose()?;
        let complements = roles
            .complements
            .iter()
            .map(|&slot| phrases.complement_phrase(slot))
            .collect::<Result<Vec<_>, _>>()?;
        let place = roles
            .place
            .map(|slot| phrases.place_phrase(slot))
            .transpose()?;

        let clause = match object {
            Some(object) if phrases.wants_passive(verb) => {
                Clause::Passive(phrases.passive_clause(verb, &object, &subject)?)
            }
            object => Clause::Active {
                subject,
                verb: verb_phrase,
                object,
            },
        };

        Ok(SentenceParts {
            clause,
            complements,
            place,
        }
        .assemble())
    }
}

impl CaptionGeneratorBuilder {
    pub fn role_maps(mut self, path: &str) -> Self {
        self.role_maps_path = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn variation(mut self, variation: Variation) -> Self {
        self.variation = variation;
        self
    }

    /// Provide role maps directly (for testing without files).
    pub fn with_role_maps(mut self, role_maps: RoleMaps) -> Self {
        self.role_maps = Some(role_maps);
        self
    }

    /// Resolve the batch vocabulary, derive the corpus tables and seed the RNG.
    pub fn build<'a>(
        self,
        batch: &'a Batch,
        resolver: &'a dyn LexicalResolver,
        corpus: &TaggedCorpus,
    ) -> Result<CaptionGenerator<'a>, GeneratorError> {
        let role_maps = match (self.role_maps, self.role_maps_path) {
            (Some(maps), _) => maps,
            (None, Some(path)) => RoleMaps::load_from_ron(Path::new(&path))?,
            (None, None) => RoleMaps::default(),
        };

        let context = BatchContext::builder(resolver, &role_maps).build(batch, corpus)?;
        let classifier = RoleClassifier::from_role_maps(&role_maps);

        Ok(CaptionGenerator {
            batch,
            resolver,
            role_maps,
            classifier,
            context,
            variation: self.variation,
            rng: StdRng::seed_from_u64(self.seed),
            seed: self.seed,
        })
    }
}
