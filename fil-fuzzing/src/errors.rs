// fil-fuzzing/src/errors.rs
//! Error types for the fuzzing harness

use thiserror::Error;

use crate::path::FieldPath;

/// A mutation could not be applied to the baseline it was given
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    /// The container that should hold the target does not exist
    #[error("Parent of {0} not present in baseline")]
    MissingParent(FieldPath),

    /// The field to remove or rewrite does not exist
    #[error("Field {0} not present in baseline")]
    MissingTarget(FieldPath),

    /// An array index lies too far past the end of its array to pad
    #[error("Index in {0} is too far past the end of its array")]
    IndexOutOfRange(FieldPath),
}

/// Errors that stop a whole run
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Nothing to submit
    #[error("Mutation catalog for {0} is empty")]
    EmptyCatalog(String),

    /// Every case failed before reaching the node
    #[error("Node at {endpoint} unreachable for all {cases} cases")]
    TargetUnreachable { endpoint: String, cases: usize },

    /// The RPC client could not be set up
    #[error("RPC setup failed: {0}")]
    Rpc(#[from] fil_rpc::RpcError),

    /// Configuration could not be resolved
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown node {0}")]
    UnknownNode(String),
}
