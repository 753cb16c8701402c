/// Phrase construction — decorated noun phrases, verb agreement and the
/// passive restructuring.

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

use crate::core::context::{BatchContext, DEFAULT_DETERMINER};
use crate::core::lexicon::LexicalResolver;
use crate::core::roles::Slot;
use crate::core::variety::{chance, Variation};
use crate::core::vocabulary::normalize_lemma;
use crate::schema::rolemap::RoleMaps;

#[derive(Debug, Error)]
pub enum PhraseError {
    #[error("filler '{0}' was not resolved for this batch")]
    UnresolvedFiller(String),
    #[error("verb '{0}' has no conjugation entry")]
    MissingConjugation(String),
}

/// Preposition for place phrases the corpus has no preference for.
pub const DEFAULT_PLACE_PREPOSITION: &str = "at";

/// Builds the phrases of one frame.
///
/// Only `noun_phrase`, `verb_phrase` and `wants_passive` draw from the RNG,
/// once per call (plus one more when a hypernym is picked).
pub struct PhraseBuilder<'a> {
    context: &'a BatchContext,
    role_maps: &'a RoleMaps,
    resolver: &'a dyn LexicalResolver,
    variation: Variation,
    rng: &'a mut StdRng,
}

impl<'a> PhraseBuilder<'a> {
    pub fn new(
        context: &'a BatchContext,
        role_maps: &'a RoleMaps,
        resolver: &'a dyn LexicalResolver,
        variation: Variation,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            context,
            role_maps,
            resolver,
            variation,
            rng,
        }
    }

    fn surface(&self, slot: Slot<'_>) -> Result<&'a str, PhraseError> {
        self.context
            .surface(slot.filler)
            .ok_or_else(|| PhraseError::UnresolvedFiller(slot.filler.to_string()))
    }

    /// Subject/object phrase: "<determiner> <word>", where the word is
    /// sometimes swapped for one of its hypernyms.
    pub fn noun_phrase(&mut self, slot: Slot<'_>) -> Result<String, PhraseError> {
        let surface = self.surface(slot)?;
        let determiner = self.context.determiner(surface);

        let mut word = surface.to_string();
        if chance(&mut *self.rng, self.variation.synonym) {
            let hypernyms = self.resolver.hypernyms_of(surface);
            if !hypernyms.is_empty() {
                let pick = self.rng.gen_range(0..hypernyms.len());
                word = normalize_lemma(&hypernyms[pick]);
            }
        }
        Ok(format!("{determiner} {word}"))
    }

    /// "<preposition> <determiner> <word>", "at" by default.
    pub fn place_phrase(&self, slot: Slot<'_>) -> Result<String, PhraseError> {
        let surface = self.surface(slot)?;
        let determiner = self.context.determiner(surface);
        let preposition = self
            .context
            .preposition(surface)
            .unwrap_or(DEFAULT_PLACE_PREPOSITION);
        Ok(format!("{preposition} {determiner} {surface}"))
    }

    /// Complement phrase. A "the" determiner is dropped; the preposition
    /// comes from the role map (empty = none), else the corpus, else none.
    pub fn complement_phrase(&self, slot: Slot<'_>) -> Result<String, PhraseError> {
        let surface = self.surface(slot)?;
        let determiner = self.context.determiner(surface);
        let base = if determiner == DEFAULT_DETERMINER {
            surface.to_string()
        } else {
            format!("{determiner} {surface}")
        };

        let preposition = match self.role_maps.role_prepositions.get(slot.role) {
            Some(fixed) => Some(fixed.as_str()).filter(|p| !p.is_empty()),
            None => self.context.preposition(surface),
        };
        Ok(match preposition {
            Some(p) => format!("{p} {base}"),
            None => base,
        })
    }

    /// Plural when the role name ends in "s" or the head noun is a known plural.
    pub fn is_plural(&self, slot: Slot<'_>) -> Result<bool, PhraseError> {
        if slot.role.ends_with('s') {
            return Ok(true);
        }
        let surface = self.surface(slot)?;
        Ok(surface
            .split_whitespace()
            .last()
            .is_some_and(|noun| self.role_maps.plural_nouns.contains(noun)))
    }

    /// Verb agreeing with the subject: a table form when the verb has one and
    /// the draw allows it, otherwise "is/are <verb>".
    pub fn verb_phrase(&mut self, verb: &str, subject: Option<Slot<'_>>) -> Result<String, PhraseError> {
        let plural = match subject {
            Some(slot) => self.is_plural(slot)?,
            None => false,
        };

        let use_table = chance(&mut *self.rng, self.variation.conjugation);
        if let Some(forms) = self.role_maps.conjugation(verb) {
            if use_table {
                return Ok(forms.agreeing(plural).to_string());
            }
        }

        let auxiliary = if plural { "are" } else { "is" };
        Ok(format!("{auxiliary} {verb}"))
    }

    /// Draw the passive gate. Only verbs with a conjugation entry qualify.
    pub fn wants_passive(&mut self, verb: &str) -> bool {
        let fire = chance(&mut *self.rng, self.variation.passive);
        fire && self.role_maps.conjugation(verb).is_some()
    }

    /// "<object> is getting <participle> by <subject>".
    pub fn passive_clause(
        &self,
        verb: &str,
        object_phrase: &str,
        subject_phrase: &str,
    ) -> Result<String, PhraseError> {
        let forms = self
            .role_maps
            .conjugation(verb)
            .ok_or_else(|| PhraseError::MissingConjugation(verb.to_string()))?;
        Ok(format!(
            "{object_phrase} is getting {} by {subject_phrase}",
            forms.past_participle()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::corpus::TaggedCorpus;
    use crate::core::lexicon::Lexicon;
    use crate::schema::annotation::{Annotation, Batch, Frame};
    use crate::schema::rolemap::VerbForms;
    use rand::SeedableRng;

    struct Fixture {
        context: BatchContext,
        maps: RoleMaps,
        lexicon: Lexicon,
    }

    fn fixture() -> Fixture {
        let lexicon = Lexicon::parse_ron(
            r#"(
                senses: {
                    "n1": "dog", "n2": "park", "n3": "knife", "n4": "people",
                    "n5": "apple", "n6": "friend", "n7": "wooden_table",
                },
                hypernyms: {"dog": ["canine"]},
            )"#,
        )
        .unwrap();
        let mut maps = RoleMaps::default();
        maps.plural_nouns.insert("people".to_string());
        maps.role_prepositions.insert("coagent".to_string(), "with".to_string());
        maps.role_prepositions.insert("food".to_string(), String::new());
        maps.verb_forms
            .insert("jumping".to_string(), VerbForms::new("jump", "jumps"));

        let frame: Frame = [
            ("agent", "n1"),
            ("place", "n2"),
            ("tool", "n3"),
            ("audience", "n4"),
            ("food", "n5"),
            ("coagent", "n6"),
            ("surface", "n7"),
        ]
        .into_iter()
        .collect();
        let batch: Batch = [(
            "img.jpg",
            Annotation {
                verb: "jumping".to_string(),
                frames: vec![frame],
            },
        )]
        .into_iter()
        .collect();
        let corpus = TaggedCorpus::parse(
            "a/DET dog/NOUN an/DET apple/NOUN a/DET friend/NOUN with/ADP a/DET knife/NOUN \
             in/ADP the/DET park/NOUN",
        )
        .unwrap();
        let context = BatchContext::builder(&lexicon, &maps)
            .build(&batch, &corpus)
            .unwrap();
        Fixture {
            context,
            maps,
            lexicon,
        }
    }

    fn builder<'a>(f: &'a Fixture, variation: Variation, rng: &'a mut StdRng) -> PhraseBuilder<'a> {
        PhraseBuilder::new(&f.context, &f.maps, &f.lexicon, variation, rng)
    }

    fn always() -> Variation {
        Variation {
            synonym: 1.0,
            conjugation: 1.0,
            passive: 1.0,
        }
    }

    #[test]
    fn noun_phrase_uses_corpus_determiner() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.noun_phrase(Slot::new("agent", "n1")).unwrap(), "a dog");
    }

    #[test]
    fn noun_phrase_defaults_to_the() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.noun_phrase(Slot::new("surface", "n7")).unwrap(), "the wooden table");
    }

    #[test]
    fn synonym_substitution_keeps_determiner() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, always(), &mut rng);
        assert_eq!(pb.noun_phrase(Slot::new("agent", "n1")).unwrap(), "a canine");
        // no hypernyms known: the word stays
        assert_eq!(pb.noun_phrase(Slot::new("food", "n5")).unwrap(), "an apple");
    }

    #[test]
    fn unresolved_filler_is_an_error() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, Variation::none(), &mut rng);
        assert!(matches!(
            pb.noun_phrase(Slot::new("agent", "n404")),
            Err(PhraseError::UnresolvedFiller(_))
        ));
    }

    #[test]
    fn place_phrase_uses_corpus_preposition() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.place_phrase(Slot::new("place", "n2")).unwrap(), "in the park");
    }

    #[test]
    fn place_phrase_falls_back_to_at() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.place_phrase(Slot::new("place", "n1")).unwrap(), "at a dog");
    }

    #[test]
    fn complement_fixed_preposition_wins() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.complement_phrase(Slot::new("coagent", "n6")).unwrap(), "with a friend");
    }

    #[test]
    fn complement_explicit_no_preposition() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.complement_phrase(Slot::new("food", "n5")).unwrap(), "an apple");
    }

    #[test]
    fn complement_corpus_preposition() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.complement_phrase(Slot::new("tool", "n3")).unwrap(), "with a knife");
    }

    #[test]
    fn complement_without_preposition_drops_the() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.complement_phrase(Slot::new("surface", "n7")).unwrap(), "wooden table");
    }

    #[test]
    fn plural_by_role_suffix_or_noun_set() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert!(pb.is_plural(Slot::new("agents", "n1")).unwrap());
        assert!(pb.is_plural(Slot::new("audience", "n4")).unwrap());
        assert!(!pb.is_plural(Slot::new("agent", "n1")).unwrap());
    }

    #[test]
    fn verb_phrase_without_table_entry() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, always(), &mut rng);
        assert_eq!(pb.verb_phrase("riding", Some(Slot::new("agent", "n1"))).unwrap(), "is riding");
        assert_eq!(pb.verb_phrase("riding", Some(Slot::new("audience", "n4"))).unwrap(), "are riding");
        assert_eq!(pb.verb_phrase("riding", None).unwrap(), "is riding");
    }

    #[test]
    fn verb_phrase_with_table_entry() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, always(), &mut rng);
        assert_eq!(pb.verb_phrase("jumping", Some(Slot::new("agent", "n1"))).unwrap(), "jumps");
        assert_eq!(pb.verb_phrase("jumping", Some(Slot::new("audience", "n4"))).unwrap(), "jump");
    }

    #[test]
    fn verb_phrase_table_skipped_when_draw_fails() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(pb.verb_phrase("jumping", Some(Slot::new("agent", "n1"))).unwrap(), "is jumping");
    }

    #[test]
    fn passive_gate_requires_conjugation() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, always(), &mut rng);
        assert!(!pb.wants_passive("riding"));
        let mut rng = StdRng::seed_from_u64(1);
        let mut pb = builder(&f, Variation::none(), &mut rng);
        assert!(!pb.wants_passive("jumping"));
    }

    #[test]
    fn passive_clause_text() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert_eq!(
            pb.passive_clause("jumping", "the fence", "a dog").unwrap(),
            "the fence is getting jumped by a dog"
        );
    }

    #[test]
    fn passive_clause_for_unknown_verb_is_an_error() {
        let f = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let pb = builder(&f, Variation::none(), &mut rng);
        assert!(matches!(
            pb.passive_clause("riding", "a horse", "a man"),
            Err(PhraseError::MissingConjugation(ref v)) if v == "riding"
        ));
    }
}
