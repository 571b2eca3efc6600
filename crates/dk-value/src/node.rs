//! External-facing generic tree.
//!
//! A `GenericNode` owns all of its data; nothing in it points back into
//! the value graph it was built from.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

/// Scalar payload of a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Integer(_) | Scalar::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenericNode {
    Leaf(Scalar),
    Sequence(Vec<GenericNode>),
    Mapping(Mapping),
}

impl GenericNode {
    pub fn null() -> Self {
        GenericNode::Leaf(Scalar::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GenericNode::Leaf(Scalar::Null))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            GenericNode::Leaf(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[GenericNode]> {
        match self {
            GenericNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            GenericNode::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Follow a chain of mapping keys.
    pub fn pointer(&self, keys: &[&str]) -> Option<&GenericNode> {
        keys.iter()
            .try_fold(self, |node, key| node.as_mapping()?.get(key))
    }
}

impl From<Mapping> for GenericNode {
    fn from(m: Mapping) -> Self {
        GenericNode::Mapping(m)
    }
}

/// Ordered list of uniquely named children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: Vec<(String, GenericNode)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&GenericNode> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut GenericNode> {
        self.position(key).map(|i| &mut self.entries[i].1)
    }

    /// Insert or overwrite. An overwritten entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, node: GenericNode) -> Option<GenericNode> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, node)),
            None => {
                self.entries.push((key, node));
                None
            }
        }
    }

    /// Child under `key`, inserting `default()` first when absent.
    pub fn get_or_insert_with(
        &mut self,
        key: &str,
        default: impl FnOnce() -> GenericNode,
    ) -> &mut GenericNode {
        let index = match self.position(key) {
            Some(i) => i,
            None => {
                self.entries.push((key.to_string(), default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn remove(&mut self, key: &str) -> Option<GenericNode> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenericNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, GenericNode)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, GenericNode)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(v) => serializer.serialize_bool(*v),
            Scalar::Integer(v) => serializer.serialize_i64(*v),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

impl Serialize for GenericNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GenericNode::Leaf(scalar) => scalar.serialize(serializer),
            GenericNode::Sequence(items) => serializer.collect_seq(items),
            GenericNode::Mapping(mapping) => mapping.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for GenericNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = GenericNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, a sequence or a mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<GenericNode, E> {
        Ok(GenericNode::Leaf(Scalar::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<GenericNode, E> {
        Ok(GenericNode::Leaf(Scalar::Integer(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<GenericNode, E> {
        Ok(GenericNode::Leaf(match i64::try_from(v) {
            Ok(v) => Scalar::Integer(v),
            Err(_) => Scalar::Float(v as f64),
        }))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<GenericNode, E> {
        Ok(GenericNode::Leaf(Scalar::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<GenericNode, E> {
        Ok(GenericNode::Leaf(Scalar::Text(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<GenericNode, E> {
        Ok(GenericNode::Leaf(Scalar::Text(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<GenericNode, E> {
        Ok(GenericNode::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<GenericNode, E> {
        Ok(GenericNode::null())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<GenericNode, D::Error> {
        GenericNode::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<GenericNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(GenericNode::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<GenericNode, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((key, value)) = map.next_entry::<String, GenericNode>()? {
            mapping.insert(key, value);
        }
        Ok(GenericNode::Mapping(mapping))
    }
}
