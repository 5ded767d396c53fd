//! Closed, tagged data model for dynamically shaped application state.
//!
//! `Value` is the state type to reach for when the shape of the state is not
//! known at compile time. Every variant is either a leaf or one of three
//! composites, so copying and freezing are exhaustive matches.

use super::error::StoreError;
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Nesting level past which `deep_copy` stops copying and shares the node.
pub const MAX_COPY_DEPTH: usize = 20;

/// A node in a state graph.
///
/// Composite nodes keep their children behind `Arc`. A committed value is
/// only reachable through shared references, so it cannot be mutated; a draft
/// mutates through the `*_mut` accessors, which copy any node that is still
/// shared before writing to it.
///
/// # Example
///
/// ```rust
/// use frostbox::core::{State, Value};
///
/// let state = Value::map([("count", Value::from(0))]);
/// let mut draft = state.deep_copy();
/// *draft.get_mut("count").unwrap() = Value::from(1);
///
/// assert_eq!(state.get("count").and_then(Value::as_i64), Some(0));
/// assert_eq!(draft.get("count").and_then(Value::as_i64), Some(1));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Binary buffer
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    List(Arc<Vec<Value>>),
    Map(Arc<BTreeMap<String, Value>>),
    Set(Arc<BTreeSet<Value>>),
}

impl Value {
    /// Build a map from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build an ordered list.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::List(Arc::new(items.into_iter().collect()))
    }

    /// Build a set; duplicates collapse.
    pub fn set<I: IntoIterator<Item = Value>>(members: I) -> Self {
        Self::Set(Arc::new(members.into_iter().collect()))
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<Value>> {
        match self {
            Self::Set(members) => Some(members),
            _ => None,
        }
    }

    /// Mutable list access. Copies the list first if it is shared.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(items) => Some(Arc::make_mut(items)),
            _ => None,
        }
    }

    /// Mutable map access. Copies the map first if it is shared.
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(Arc::make_mut(entries)),
            _ => None,
        }
    }

    /// Mutable set access. Copies the set first if it is shared.
    pub fn as_set_mut(&mut self) -> Option<&mut BTreeSet<Value>> {
        match self {
            Self::Set(members) => Some(Arc::make_mut(members)),
            _ => None,
        }
    }

    /// Look up a key in a map node.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|entries| entries.get(key))
    }

    /// Mutable lookup of a key in a map node.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.as_map_mut().and_then(|entries| entries.get_mut(key))
    }

    /// Insert into a map node, returning the value it replaced.
    ///
    /// Returns `None` without inserting when this is not a map.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.as_map_mut()?.insert(key.into(), value.into())
    }

    /// Append to a list node. Returns `false` when this is not a list.
    pub fn push(&mut self, value: impl Into<Value>) -> bool {
        match self.as_list_mut() {
            Some(items) => {
                items.push(value.into());
                true
            }
            None => false,
        }
    }

    /// Number of children of a composite node; leaves have none.
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Map(entries) => entries.len(),
            Self::Set(members) => members.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nesting depth of the graph; leaves are depth 0.
    pub fn depth(&self) -> usize {
        let children = match self {
            Self::List(items) => items.iter().map(Value::depth).max(),
            Self::Map(entries) => entries.values().map(Value::depth).max(),
            Self::Set(members) => members.iter().map(Value::depth).max(),
            _ => return 0,
        };
        children.map_or(1, |d| d + 1)
    }

    fn copy_at(&self, level: usize) -> Self {
        if level > MAX_COPY_DEPTH {
            return self.clone();
        }

        match self {
            Self::List(items) => Self::List(Arc::new(
                items.iter().map(|v| v.copy_at(level + 1)).collect(),
            )),
            Self::Map(entries) => Self::Map(Arc::new(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.copy_at(level + 1)))
                    .collect(),
            )),
            Self::Set(members) => Self::Set(Arc::new(
                members.iter().map(|v| v.copy_at(level + 1)).collect(),
            )),
            leaf => leaf.clone(),
        }
    }

    /// Convert from a JSON document. Integers that fit `i64` stay integers.
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::Text(s),
            Json::Array(items) => Self::list(items.into_iter().map(Self::from_json)),
            Json::Object(entries) => {
                Self::map(entries.into_iter().map(|(k, v)| (k, Self::from_json(v))))
            }
        }
    }

    /// Render as JSON. Bytes become arrays of numbers, timestamps RFC 3339
    /// strings, sets arrays, and non-finite floats `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(n) => Json::from(*n),
            Self::Float(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Self::Text(s) => Json::String(s.clone()),
            Self::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Self::Timestamp(t) => Json::String(t.to_rfc3339()),
            Self::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Set(members) => Json::Array(members.iter().map(Value::to_json).collect()),
        }
    }

    /// Convert any serializable value into the closed model.
    ///
    /// Fails with [`StoreError::UnsupportedType`] when the input has no
    /// representation here, e.g. a map keyed by something other than strings.
    pub fn from_serialize<S: Serialize + ?Sized>(value: &S) -> Result<Self, StoreError> {
        serde_json::to_value(value)
            .map(Self::from_json)
            .map_err(|e| StoreError::UnsupportedType(e.to_string()))
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Float(_) => 3,
            Self::Text(_) => 4,
            Self::Bytes(_) => 5,
            Self::Timestamp(_) => 6,
            Self::List(_) => 7,
            Self::Map(_) => 8,
            Self::Set(_) => 9,
        }
    }
}

impl State for Value {
    fn deep_copy(&self) -> Self {
        self.copy_at(0)
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => a.cmp(b),
            (Self::Map(a), Self::Map(b)) => a.cmp(b),
            (Self::Set(a), Self::Set(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(Arc::new(items))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self::Map(Arc::new(entries))
    }
}
