// fil-fuzzing/src/generators/mod.rs
//! Baseline message generators

pub mod block;
pub mod common;
pub mod message;

use serde::Serialize;
use serde_json::Value;

pub use block::{BlockGenerator, BlockMsg, RandomBlockGenerator};
pub use message::{SignedMessage, SignedMessageGenerator};

/// Generator trait for creating fuzzable inputs
pub trait Generator<T> {
    /// Generate a new random instance of T
    fn generate(&self) -> T;

    /// Generate a set of new random instances of T
    fn generate_set(&self, count: usize) -> Vec<T> {
        (0..count).map(|_| self.generate()).collect()
    }
}

/// Builds a fresh, structurally valid message in its dynamic JSON form
///
/// Every call returns an independently owned tree, so mutating one baseline
/// never leaks into the next.
pub trait BaselineBuilder: Send + Sync {
    fn build_baseline(&self) -> Value;

    /// Short label of the wire object, for reports
    fn kind(&self) -> &'static str;
}

/// Serialize a wire struct into its dynamic form
///
/// The wire types only contain string-keyed structs, so serialization does
/// not fail; `null` is returned if it ever did.
pub fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
