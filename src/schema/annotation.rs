use rustc_hash::FxHashMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// One interpretation of an annotated image: role name → filler identifier.
///
/// Role order follows the source document and is significant: rule chains
/// pick the first matching role and complements are emitted in this order.
/// An empty filler means the role is present but unfilled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    roles: Vec<(String, String)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a role, replacing the filler if the role already exists.
    pub fn insert(&mut self, role: impl Into<String>, filler: impl Into<String>) {
        let role = role.into();
        let filler = filler.into();
        if let Some(entry) = self.roles.iter_mut().find(|(r, _)| *r == role) {
            entry.1 = filler;
        } else {
            self.roles.push((role, filler));
        }
    }

    pub fn get(&self, role: &str) -> Option<&str> {
        self.roles
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, f)| f.as_str())
    }

    /// All roles, filled or not, in source order.
    pub fn roles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.roles.iter().map(|(r, f)| (r.as_str(), f.as_str()))
    }

    /// Roles carrying a non-empty filler, in source order.
    pub fn filled(&self) -> Vec<(&str, &str)> {
        self.roles().filter(|(_, f)| !f.is_empty()).collect()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<R: Into<String>, F: Into<String>> FromIterator<(R, F)> for Frame {
    fn from_iter<I: IntoIterator<Item = (R, F)>>(iter: I) -> Self {
        let mut frame = Frame::new();
        for (role, filler) in iter {
            frame.insert(role, filler);
        }
        frame
    }
}

/// The annotation of one image: a verb and its frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub verb: String,
    pub frames: Vec<Frame>,
}

impl Annotation {
    /// Union of role names across all frames, in first-seen order.
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for frame in &self.frames {
            for (role, _) in frame.roles() {
                if !names.contains(&role) {
                    names.push(role);
                }
            }
        }
        names
    }
}

/// An ordered set of annotations keyed by image name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    entries: Vec<(String, Annotation)>,
    index: FxHashMap<String, usize>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, annotation: Annotation) {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1 = annotation;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, annotation));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Annotation> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Annotation)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Annotation)> for Batch {
    fn from_iter<I: IntoIterator<Item = (K, Annotation)>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for (key, annotation) in iter {
            batch.insert(key, annotation);
        }
        batch
    }
}

// JSON objects are read as ordered pair lists so that role and image order
// survive deserialization.

struct OrderedVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            pairs.push((key, value));
        }
        Ok(pairs)
    }
}

fn serialize_pairs<S: Serializer, V: Serialize>(
    pairs: &[(String, V)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (k, v) in pairs {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

impl<'de> Deserialize<'de> for Frame {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = deserializer.deserialize_map(OrderedVisitor::<String>(PhantomData))?;
        Ok(pairs.into_iter().collect())
    }
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_pairs(&self.roles, serializer)
    }
}

impl<'de> Deserialize<'de> for Batch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = deserializer.deserialize_map(OrderedVisitor::<Annotation>(PhantomData))?;
        Ok(pairs.into_iter().collect())
    }
}

impl Serialize for Batch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_pairs(&self.entries, serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_preserves_source_order() {
        let json = r#"{"tool": "n1", "agent": "n2", "place": ""}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        let roles: Vec<&str> = frame.roles().map(|(r, _)| r).collect();
        assert_eq!(roles, vec!["tool", "agent", "place"]);
    }

    #[test]
    fn filled_skips_empty_fillers() {
        let frame: Frame = [("agent", "n1001"), ("place", "")].into_iter().collect();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.filled(), vec![("agent", "n1001")]);
    }

    #[test]
    fn insert_replaces_existing_role() {
        let mut frame = Frame::new();
        frame.insert("agent", "n1");
        frame.insert("agent", "n2");
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get("agent"), Some("n2"));
    }

    #[test]
    fn batch_parses_swig_shape_and_ignores_extra_fields() {
        let json = r#"{
            "jumping_1.jpg": {
                "verb": "jumping",
                "bb": {"agent": [1, 2, 3, 4]},
                "height": 512,
                "frames": [{"agent": "n1001", "place": ""}]
            },
            "selling_2.jpg": {
                "verb": "selling",
                "frames": [{"seller": "n1002", "item": "n1003"}]
            }
        }"#;
        let batch: Batch = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = batch.keys().collect();
        assert_eq!(keys, vec!["jumping_1.jpg", "selling_2.jpg"]);
        assert_eq!(batch.get("jumping_1.jpg").unwrap().verb, "jumping");
        assert!(!batch.contains_key("missing.jpg"));
    }

    #[test]
    fn batch_round_trips_through_json_in_order() {
        let json = r#"{"b.jpg":{"verb":"eating","frames":[{"eater":"n1"}]},"a.jpg":{"verb":"riding","frames":[]}}"#;
        let batch: Batch = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&batch).unwrap(), json);
    }

    #[test]
    fn role_names_union_in_first_seen_order() {
        let annotation = Annotation {
            verb: "carrying".to_string(),
            frames: vec![
                [("agent", "n1"), ("item", "n2")].into_iter().collect(),
                [("item", "n2"), ("place", "n3")].into_iter().collect(),
            ],
        };
        assert_eq!(annotation.role_names(), vec!["agent", "item", "place"]);
    }
}
