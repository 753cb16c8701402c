/// Role classification — picking subject, place and object out of a frame's
/// open-vocabulary role names with ordered, first-match rule chains.

use rustc_hash::FxHashSet;

use crate::schema::rolemap::RoleMaps;

/// The role name reserved for locations.
pub const PLACE_ROLE: &str = "place";
/// Role name given to a subject borrowed from the image's agent list.
pub const FALLBACK_AGENT_ROLE: &str = "agent";

/// A role paired with its filler identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'f> {
    pub role: &'f str,
    pub filler: &'f str,
}

impl<'f> Slot<'f> {
    pub fn new(role: &'f str, filler: &'f str) -> Self {
        Self { role, filler }
    }
}

/// A single selection rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRule {
    /// The frame has exactly one remaining role.
    Sole,
    /// A role with exactly this name.
    Named(String),
    /// A role whose name is in the set.
    Listed(FxHashSet<String>),
    /// A role whose name ends with one of the suffixes.
    Suffix(Vec<String>),
}

impl RoleRule {
    pub fn suffix(suffixes: &[&str]) -> Self {
        Self::Suffix(suffixes.iter().map(|s| s.to_string()).collect())
    }

    fn matches(&self, role: &str) -> bool {
        match self {
            Self::Sole => true,
            Self::Named(name) => role == name,
            Self::Listed(names) => names.contains(role),
            Self::Suffix(suffixes) => suffixes.iter().any(|s| role.ends_with(s.as_str())),
        }
    }

    /// First remaining slot this rule accepts, in frame order.
    pub fn select<'f>(
        &self,
        remaining: &[Slot<'f>],
        allowed: impl Fn(&str) -> bool,
    ) -> Option<Slot<'f>> {
        if let Self::Sole = self {
            return match remaining {
                [only] if allowed(only.role) => Some(*only),
                _ => None,
            };
        }
        remaining
            .iter()
            .find(|slot| allowed(slot.role) && self.matches(slot.role))
            .copied()
    }
}

/// Rules evaluated in order; the first rule that selects a slot wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChain {
    pub rules: Vec<RoleRule>,
    /// Role names this chain may never pick.
    pub excluded: FxHashSet<String>,
}

impl RoleChain {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self {
            rules,
            excluded: FxHashSet::default(),
        }
    }

    pub fn excluding(mut self, role: &str) -> Self {
        self.excluded.insert(role.to_string());
        self
    }

    pub fn pick<'f>(&self, remaining: &[Slot<'f>]) -> Option<Slot<'f>> {
        let allowed = |role: &str| !self.excluded.contains(role);
        self.rules
            .iter()
            .find_map(|rule| rule.select(remaining, allowed))
    }
}

/// The grammatical slots of one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification<'f> {
    pub subject: Option<Slot<'f>>,
    pub place: Option<Slot<'f>>,
    pub object: Option<Slot<'f>>,
    /// Remaining filled roles, in frame order.
    pub complements: Vec<Slot<'f>>,
}

/// Subject → place → object selection with image-level fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleClassifier {
    subject: RoleChain,
    place: RoleChain,
    object: RoleChain,
}

impl RoleClassifier {
    pub fn from_role_maps(maps: &RoleMaps) -> Self {
        Self {
            subject: RoleChain::new(vec![
                RoleRule::Sole,
                RoleRule::Listed(maps.agent_roles.clone()),
                RoleRule::Listed(maps.subject_roles.clone()),
                RoleRule::suffix(&["er", "ers"]),
            ])
            .excluding(PLACE_ROLE),
            place: RoleChain::new(vec![RoleRule::Named(PLACE_ROLE.to_string())]),
            object: RoleChain::new(vec![
                RoleRule::Listed(maps.object_roles.clone()),
                RoleRule::suffix(&["item", "items"]),
            ]),
        }
    }

    /// Classify a frame's filled roles.
    ///
    /// `agents` and `places` are the image's occurrence lists; their first
    /// entries stand in when the frame has no subject or place of its own.
    /// A frame with no filled roles never borrows an agent.
    pub fn classify<'f>(
        &self,
        filled: &[Slot<'f>],
        agents: &'f [String],
        places: &'f [String],
    ) -> Classification<'f> {
        let mut remaining: Vec<Slot<'f>> = filled.to_vec();

        let subject = self.subject.pick(&remaining).or_else(|| {
            agents
                .first()
                .filter(|_| !filled.is_empty())
                .map(|filler| Slot::new(FALLBACK_AGENT_ROLE, filler))
        });
        if let Some(s) = subject {
            remaining.retain(|slot| slot.role != s.role);
        }

        let place = self
            .place
            .pick(&remaining)
            .or_else(|| places.first().map(|filler| Slot::new(PLACE_ROLE, filler)));
        if let Some(p) = place {
            remaining.retain(|slot| slot.role != p.role);
        }

        let object = self.object.pick(&remaining);
        if let Some(o) = object {
            remaining.retain(|slot| slot.role != o.role);
        }

        Classification {
            subject,
            place,
            object,
            complements: remaining,
        }
    }
}
