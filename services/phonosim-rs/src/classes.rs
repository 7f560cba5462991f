//! Insertion-ordered mapping from feature vector to member segments.
//!
//! Serialized as a JSON object whose keys are printed feature vectors
//! (`"[+, -, 0]"`) and whose values are member lists. Key order is preserved
//! in both directions so a stored map reloads identically.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{FeatureVector, NaturalClass};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
    entries: Vec<NaturalClass>,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, class: NaturalClass) {
        self.entries.push(class);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NaturalClass> {
        self.entries.iter()
    }

    pub fn classes(&self) -> &[NaturalClass] {
        &self.entries
    }

    /// Look up the members recorded for a feature vector
    pub fn members(&self, vector: &FeatureVector) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|c| &c.vector == vector)
            .map(|c| c.members.as_slice())
    }

    /// Classes that include `segment`, in map order
    pub fn containing<'a>(&'a self, segment: &'a str) -> impl Iterator<Item = &'a NaturalClass> {
        self.entries.iter().filter(move |c| c.contains(segment))
    }
}

impl FromIterator<NaturalClass> for ClassMap {
    fn from_iter<I: IntoIterator<Item = NaturalClass>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ClassMap {
    type Item = NaturalClass;
    type IntoIter = std::vec::IntoIter<NaturalClass>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClassMap {
    type Item = &'a NaturalClass;
    type IntoIter = std::slice::Iter<'a, NaturalClass>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for ClassMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for class in &self.entries {
            map.serialize_entry(&class.vector.to_string(), &class.members)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClassMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ClassMapVisitor)
    }
}

struct ClassMapVisitor;

impl<'de> Visitor<'de> for ClassMapVisitor {
    type Value = ClassMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from feature-vector keys to segment lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = ClassMap::new();
        let mut seen = FxHashSet::default();
        while let Some((key, members)) = access.next_entry::<String, Vec<String>>()? {
            let vector: FeatureVector = key.parse().map_err(de::Error::custom)?;
            if !seen.insert(vector.clone()) {
                return Err(de::Error::custom(format!("duplicate key {key:?}")));
            }
            map.push(NaturalClass::new(vector, members));
        }
        Ok(map)
    }
}
