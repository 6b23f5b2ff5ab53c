// fil-fuzzing/src/mutators/mod.rs
//! Mutation catalogs for block and message fuzzing
//!
//! A catalog is an ordered list of named cases. Each case owns a plain
//! function pointer that rewrites one fresh baseline; cases share no state,
//! so the catalog can be walked any number of times in any order. Adding a
//! new structural risk means adding one row to a registration table.

pub mod block;
pub mod message;

use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use crate::constants::{self, DEFAULT_RANDOM_BLOCKS};
use crate::errors::MutationError;
use crate::path::{self, FieldPath};

/// Trait for mutating fuzzable inputs
pub trait Mutator<T> {
    /// Mutate the given input in place
    fn mutate(&self, input: &mut T) -> Result<(), MutationError>;
}

/// Pure rewrite of a baseline message
pub type Transform = fn(Value) -> Result<Value, MutationError>;

/// One row of a registration table
pub type CaseSpec = (&'static str, MutationCategory, Transform);

/// What kind of structural expectation a case violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MutationCategory {
    /// A field holds a value of an incompatible JSON type
    TypeConfusion,
    /// A CID or address reference is malformed, bare or null
    MalformedReference,
    /// A tag is outside its accepted set or a payload is not decodable
    MalformedEncoding,
    /// A required field is absent
    MissingField,
    /// Negative or empty values where they make no sense
    Boundary,
    /// Numeric extremes of the wire types
    Overflow,
    /// Well-typed values a node should still refuse
    Plausible,
    /// Very long lists and megabyte-scale payloads
    Oversized,
    /// The whole message replaced by an empty or non-object value
    Degenerate,
    /// Fully randomized message
    Randomized,
}

impl MutationCategory {
    /// Categories every full catalog must cover
    pub const REQUIRED: [MutationCategory; 6] = [
        MutationCategory::TypeConfusion,
        MutationCategory::MalformedReference,
        MutationCategory::MalformedEncoding,
        MutationCategory::MissingField,
        MutationCategory::Boundary,
        MutationCategory::Degenerate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MutationCategory::TypeConfusion => "type-confusion",
            MutationCategory::MalformedReference => "malformed-reference",
            MutationCategory::MalformedEncoding => "malformed-encoding",
            MutationCategory::MissingField => "missing-field",
            MutationCategory::Boundary => "boundary",
            MutationCategory::Overflow => "overflow",
            MutationCategory::Plausible => "plausible",
            MutationCategory::Oversized => "oversized",
            MutationCategory::Degenerate => "degenerate",
            MutationCategory::Randomized => "randomized",
        }
    }
}

impl fmt::Display for MutationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named mutation
#[derive(Debug, Clone)]
pub struct MutationCase {
    name: Cow<'static, str>,
    category: MutationCategory,
    transform: Transform,
}

impl MutationCase {
    pub fn new(name: impl Into<Cow<'static, str>>, category: MutationCategory, transform: Transform) -> Self {
        Self {
            name: name.into(),
            category,
            transform,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> MutationCategory {
        self.category
    }

    /// Apply the transform to an owned baseline
    pub fn apply(&self, baseline: Value) -> Result<Value, MutationError> {
        (self.transform)(baseline)
    }
}

impl From<&CaseSpec> for MutationCase {
    fn from(spec: &CaseSpec) -> Self {
        let (name, category, transform) = *spec;
        MutationCase::new(name, category, transform)
    }
}

impl Mutator<Value> for MutationCase {
    fn mutate(&self, input: &mut Value) -> Result<(), MutationError> {
        let mutated = self.apply(input.clone())?;
        *input = mutated;
        Ok(())
    }
}

/// Which optional groups a catalog registers
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogOptions {
    /// Register numeric-extreme cases
    pub enable_overflow: bool,
    /// Register very long lists and megabyte payloads
    pub enable_large_data: bool,
    /// Number of fully random blocks appended to the block catalog
    pub random_blocks: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            enable_overflow: true,
            enable_large_data: true,
            random_blocks: DEFAULT_RANDOM_BLOCKS,
        }
    }
}

impl CatalogOptions {
    /// Presets for a fuzzing mode
    pub fn for_mode(mode: &str) -> Self {
        match mode {
            constants::modes::QUICK | constants::modes::CI => Self {
                enable_overflow: true,
                enable_large_data: false,
                random_blocks: 0,
            },
            constants::modes::THOROUGH => Self {
                random_blocks: 20,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    fn registers(&self, category: MutationCategory) -> bool {
        match category {
            MutationCategory::Overflow => self.enable_overflow,
            MutationCategory::Oversized => self.enable_large_data,
            _ => true,
        }
    }
}

/// Ordered, restartable collection of mutation cases
#[derive(Debug, Clone)]
pub struct Catalog {
    target: &'static str,
    cases: Vec<MutationCase>,
}

impl Catalog {
    /// Build a catalog from a registration table, skipping disabled groups
    pub fn from_table(target: &'static str, table: &[CaseSpec], options: &CatalogOptions) -> Self {
        let cases = table
            .iter()
            .filter(|(_, category, _)| options.registers(*category))
            .map(MutationCase::from)
            .collect();
        Self { target, cases }
    }

    /// Catalog for `SyncSubmitBlock`
    pub fn blocks(options: &CatalogOptions) -> Self {
        block::catalog(options)
    }

    /// Catalog for `MpoolPush`
    pub fn messages(options: &CatalogOptions) -> Self {
        message::catalog(options)
    }

    pub fn push(&mut self, case: MutationCase) {
        self.cases.push(case);
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MutationCase> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(MutationCase::name)
    }

    pub fn find(&self, name: &str) -> Option<&MutationCase> {
        self.cases.iter().find(|c| c.name() == name)
    }

    pub fn by_category(&self, category: MutationCategory) -> impl Iterator<Item = &MutationCase> {
        self.cases.iter().filter(move |c| c.category() == category)
    }

    pub fn categories(&self) -> BTreeSet<MutationCategory> {
        self.cases.iter().map(MutationCase::category).collect()
    }

    /// Keep only the cases that pass `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&MutationCase) -> bool) {
        self.cases.retain(|c| keep(c));
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a MutationCase;
    type IntoIter = std::slice::Iter<'a, MutationCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Overwrite the value at `path`
///
/// The enclosing container must already exist in the baseline; catalog rows
/// only target known fields, so a missing parent means the baseline and the
/// table disagree.
pub fn replace(mut message: Value, path: &str, value: Value) -> Result<Value, MutationError> {
    let path = FieldPath::parse(path);
    if let Some(parent) = path.parent() {
        if !path::get(&message, &parent).map_or(false, is_container) {
            return Err(MutationError::MissingParent(path));
        }
    }
    path::set(&mut message, &path, value)?;
    Ok(message)
}

/// Overwrite several fields at once
pub fn replace_all(message: Value, fields: &[(&str, Value)]) -> Result<Value, MutationError> {
    fields
        .iter()
        .try_fold(message, |msg, (path, value)| replace(msg, path, value.clone()))
}

/// Delete the value at `path`, which must exist
pub fn strip(mut message: Value, path: &str) -> Result<Value, MutationError> {
    let path = FieldPath::parse(path);
    match path::remove(&mut message, &path) {
        Some(_) => Ok(message),
        None => Err(MutationError::MissingTarget(path)),
    }
}

/// Rewrite the existing value at `path` in place
pub fn update(mut message: Value, path: &str, edit: impl FnOnce(&mut Value)) -> Result<Value, MutationError> {
    let path = FieldPath::parse(path);
    match path::get_mut(&mut message, &path) {
        Some(slot) => edit(slot),
        None => return Err(MutationError::MissingTarget(path)),
    }
    Ok(message)
}

/// Read a field of the baseline that a case needs to copy elsewhere
pub fn read(message: &Value, path: &str) -> Result<Value, MutationError> {
    let path = FieldPath::parse(path);
    path::get(message, &path)
        .cloned()
        .ok_or(MutationError::MissingTarget(path))
}
