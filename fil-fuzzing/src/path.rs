// fil-fuzzing/src/path.rs
//! Field path addressing for dynamic JSON messages
//!
//! Every mutation in the catalog goes through these helpers. Paths are
//! written in dotted form (`Header.BeaconEntries.0.Data`); purely numeric
//! segments address array elements, or the decimal key when the container
//! turns out to be an object.

use serde_json::{Map, Value};
use std::fmt;

use crate::errors::MutationError;

/// Most `null` slots [`set`] will pad an array with to reach an index
pub const MAX_ARRAY_PADDING: usize = 4096;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        match s.parse::<usize>() {
            Ok(i) => PathSegment::Index(i),
            Err(_) => PathSegment::Key(s.to_string()),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Ordered location inside a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path, addressing the whole message
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted path; the empty string is the root
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        s.split('.').map(PathSegment::from).collect()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of the enclosing container; `None` for the root
    pub fn parent(&self) -> Option<FieldPath> {
        self.segments.split_last().map(|(_, parents)| FieldPath {
            segments: parents.to_vec(),
        })
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

fn step<'a>(value: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Key(k)) => map.get(k),
        (Value::Object(map), PathSegment::Index(i)) => map.get(&i.to_string()),
        (Value::Array(items), PathSegment::Index(i)) => items.get(*i),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Key(k)) => map.get_mut(k),
        (Value::Object(map), PathSegment::Index(i)) => map.get_mut(&i.to_string()),
        (Value::Array(items), PathSegment::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

/// Descend into `value`, creating or replacing containers so that `segment`
/// always resolves to a slot. `None` when reaching an index would take more
/// than [`MAX_ARRAY_PADDING`] nulls.
fn step_or_insert<'a>(value: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match segment {
        PathSegment::Key(k) => match value {
            Value::Object(map) => Some(map.entry(k.clone()).or_insert(Value::Null)),
            _ => {
                *value = Value::Object(Map::new());
                step_or_insert(value, segment)
            }
        },
        PathSegment::Index(i) => match value {
            Value::Array(items) => {
                if *i >= items.len() {
                    if *i - items.len() > MAX_ARRAY_PADDING {
                        return None;
                    }
                    items.resize(*i + 1, Value::Null);
                }
                items.get_mut(*i)
            }
            Value::Object(map) => Some(map.entry(i.to_string()).or_insert(Value::Null)),
            _ if *i > MAX_ARRAY_PADDING => None,
            _ => {
                *value = Value::Array(Vec::new());
                step_or_insert(value, segment)
            }
        },
    }
}

/// Look up the value at `path`; `None` if any step is missing
pub fn get<'a>(message: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments().iter().try_fold(message, step)
}

/// Mutable variant of [`get`]
pub fn get_mut<'a>(message: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    path.segments().iter().try_fold(message, step_mut)
}

pub fn exists(message: &Value, path: &FieldPath) -> bool {
    get(message, path).is_some()
}

/// Assign `value` at `path`, creating intermediate containers on demand
///
/// Intermediates that are scalars (or the wrong kind of container) are
/// replaced by an empty object for key segments and an empty array for index
/// segments. Arrays shorter than the target index are padded with `null`,
/// up to [`MAX_ARRAY_PADDING`] slots; an index further out fails with
/// [`MutationError::IndexOutOfRange`], possibly after intermediates were
/// created. Returns the root for chaining.
pub fn set<'a>(message: &'a mut Value, path: &FieldPath, value: Value) -> Result<&'a mut Value, MutationError> {
    let mut slot = &mut *message;
    for segment in path.segments() {
        slot = step_or_insert(slot, segment).ok_or_else(|| MutationError::IndexOutOfRange(path.clone()))?;
    }
    *slot = value;
    Ok(message)
}

/// Delete the value at `path`, returning it if it existed
///
/// Missing paths are a no-op. Removing the root leaves `null` behind.
pub fn remove(message: &mut Value, path: &FieldPath) -> Option<Value> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Some(message.take());
    };

    let parent = parents.iter().try_fold(message, step_mut)?;
    match (parent, last) {
        (Value::Object(map), PathSegment::Key(k)) => map.remove(k),
        (Value::Object(map), PathSegment::Index(i)) => map.remove(&i.to_string()),
        (Value::Array(items), PathSegment::Index(i)) if *i < items.len() => Some(items.remove(*i)),
        _ => None,
    }
}
