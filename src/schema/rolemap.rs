/// Static role configuration — role classes, fixed prepositions, plural
/// nouns and verb conjugations.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoleMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Conjugated forms of a verb: `(plural, singular)`, e.g. `("jump", "jumps")`.
///
/// The plural form doubles as the stem of the passive participle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbForms(pub String, pub String);

impl VerbForms {
    pub fn new(plural: impl Into<String>, singular: impl Into<String>) -> Self {
        Self(plural.into(), singular.into())
    }

    pub fn plural(&self) -> &str {
        &self.0
    }

    pub fn singular(&self) -> &str {
        &self.1
    }

    /// Form agreeing with a subject of the given number.
    pub fn agreeing(&self, plural: bool) -> &str {
        if plural {
            self.plural()
        } else {
            self.singular()
        }
    }

    /// "-ed" participle, or "-d" when the stem already ends in "e".
    pub fn past_participle(&self) -> String {
        let stem = self.plural();
        if stem.ends_with('e') {
            format!("{stem}d")
        } else {
            format!("{stem}ed")
        }
    }
}

/// Read-only grammatical configuration shared by every generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMaps {
    #[serde(default)]
    pub agent_roles: FxHashSet<String>,
    #[serde(default)]
    pub subject_roles: FxHashSet<String>,
    #[serde(default)]
    pub object_roles: FxHashSet<String>,
    /// Fixed preposition per role; an empty string means "no preposition".
    #[serde(default)]
    pub role_prepositions: FxHashMap<String, String>,
    #[serde(default)]
    pub plural_nouns: FxHashSet<String>,
    /// Keyed by the verb exactly as it appears in annotations.
    #[serde(default)]
    pub verb_forms: FxHashMap<String, VerbForms>,
    #[serde(default = "default_determiners")]
    pub determiners: Vec<String>,
    #[serde(default = "default_place_prepositions")]
    pub place_prepositions: Vec<String>,
}

fn default_determiners() -> Vec<String> {
    ["a", "an", "the"].iter().map(|s| s.to_string()).collect()
}

fn default_place_prepositions() -> Vec<String> {
    ["at", "in", "on"].iter().map(|s| s.to_string()).collect()
}

fn set(items: &[&str]) -> FxHashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RoleMaps {
    fn default() -> Self {
        Self {
            agent_roles: set(&["agent", "agents", "agenttype", "individuals"]),
            subject_roles: set(&[
                "boaters", "buyer", "carrier", "eater", "experiencer", "farmer",
                "gatherers", "giver", "listener", "mourner", "perceiver", "performer",
                "seller", "source", "sprouter", "substance", "victim",
            ]),
            object_roles: set(&[
                "admired", "blocked", "bodypart", "boringthing", "caughtitem",
                "coagent", "coagentpart", "victim",
            ]),
            role_prepositions: FxHashMap::default(),
            plural_nouns: FxHashSet::default(),
            verb_forms: FxHashMap::default(),
            determiners: default_determiners(),
            place_prepositions: default_place_prepositions(),
        }
    }
}

impl RoleMaps {
    /// Load role maps from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<RoleMaps, RoleMapError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse role maps from a RON string. Missing fields take empty
    /// values, except the closed determiner and place-preposition lists.
    pub fn parse_ron(input: &str) -> Result<RoleMaps, RoleMapError> {
        Ok(ron::from_str(input)?)
    }

    pub fn is_agent_role(&self, role: &str) -> bool {
        self.agent_roles.contains(role)
    }

    pub fn conjugation(&self, verb: &str) -> Option<&VerbForms> {
        self.verb_forms.get(verb)
    }
}
