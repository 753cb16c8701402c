/// Sentence assembly — fixed slot order, no punctuation or capitalization.

/// Subject used when a frame has no subject and the image no agent.
pub const FALLBACK_SUBJECT: &str = "it";

/// The core clause of a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// "<subject> <verb> [<object>]"
    Active {
        subject: String,
        verb: String,
        object: Option<String>,
    },
    /// A fully built passive clause, replacing subject, verb and object.
    Passive(String),
}

/// All phrases of one frame, ready to be joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceParts {
    pub clause: Clause,
    pub complements: Vec<String>,
    pub place: Option<String>,
}

impl SentenceParts {
    pub fn assemble(&self) -> String {
        let mut sentence = match &self.clause {
            Clause::Active {
                subject,
                verb,
                object,
            } => {
                let mut s = format!("{subject} {verb}");
                if let Some(object) = object.as_deref().filter(|o| !o.is_empty()) {
                    s.push(' ');
                    s.push_str(object);
                }
                s
            }
            Clause::Passive(text) => text.clone(),
        };

        for complement in self.complements.iter().filter(|c| !c.is_empty()) {
            sentence.push(' ');
            sentence.push_str(complement);
        }

        if let Some(place) = self.place.as_deref().filter(|p| !p.is_empty()) {
            sentence.push(' ');
            sentence.push_str(place);
        }

        sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(subject: &str, verb: &str, object: Option<&str>) -> Clause {
        Clause::Active {
            subject: subject.to_string(),
            verb: verb.to_string(),
            object: object.map(str::to_string),
        }
    }

    #[test]
    fn subject_and_verb_only() {
        let parts = SentenceParts {
            clause: active("a dog", "is jumping", None),
            complements: vec![],
            place: None,
        };
        assert_eq!(parts.assemble(), "a dog is jumping");
    }

    #[test]
    fn slot_order_is_object_complements_place() {
        let parts = SentenceParts {
            clause: active("a man", "is cutting", Some("a tomato")),
            complements: vec!["with a knife".to_string(), "on board".to_string()],
            place: Some("in the kitchen".to_string()),
        };
        assert_eq!(
            parts.assemble(),
            "a man is cutting a tomato with a knife on board in the kitchen"
        );
    }

    #[test]
    fn passive_replaces_subject_verb_object() {
        let parts = SentenceParts {
            clause: Clause::Passive("a ball is getting kicked by a boy".to_string()),
            complements: vec![],
            place: Some("at the field".to_string()),
        };
        assert_eq!(parts.assemble(), "a ball is getting kicked by a boy at the field");
    }

    #[test]
    fn empty_segments_contribute_nothing() {
        let parts = SentenceParts {
            clause: active(FALLBACK_SUBJECT, "is raining", Some("")),
            complements: vec![String::new()],
            place: Some(String::new()),
        };
        assert_eq!(parts.assemble(), "it is raining");
    }
}
