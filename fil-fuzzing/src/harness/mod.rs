// fil-fuzzing/src/harness/mod.rs
//! Submission harness: drives a catalog against a node and classifies replies

pub mod driver;
pub mod runner;

pub use driver::*;
pub use runner::*;

use fil_rpc::{RpcResponse, TransportError};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{methods, DEFAULT_DELAY_MS, DEFAULT_TIMEOUT_SECS};
use crate::generators::block::BlockGenerator;
use crate::generators::message::SignedMessageGenerator;
use crate::generators::BaselineBuilder;
use crate::mutators::{Catalog, CatalogOptions};

/// Harness configuration options
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Pause between two submitted cases
    pub delay: Duration,
    /// Maximum time allowed for each RPC call
    pub timeout: Duration,
    /// Directory for storing the run summary
    pub artifact_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            artifact_dir: None,
        }
    }
}

/// The RPC surface being fuzzed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzTarget {
    /// Candidate blocks through `SyncSubmitBlock`
    Block,
    /// Signed messages through `MpoolPush`
    Message,
}

impl FuzzTarget {
    pub fn method(&self) -> &'static str {
        match self {
            FuzzTarget::Block => methods::SYNC_SUBMIT_BLOCK,
            FuzzTarget::Message => methods::MPOOL_PUSH,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FuzzTarget::Block => "block",
            FuzzTarget::Message => "message",
        }
    }

    pub fn builder(&self) -> Box<dyn BaselineBuilder> {
        match self {
            FuzzTarget::Block => Box::new(BlockGenerator::new()),
            FuzzTarget::Message => Box::new(SignedMessageGenerator::new()),
        }
    }

    pub fn catalog(&self, options: &CatalogOptions) -> Catalog {
        match self {
            FuzzTarget::Block => Catalog::blocks(options),
            FuzzTarget::Message => Catalog::messages(options),
        }
    }
}

impl fmt::Display for FuzzTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pass/fail reading of a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The node refused the mutated message
    ExpectedRejection,
    /// The node took the mutated message; this is a finding
    UnexpectedAcceptance,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::ExpectedRejection => write!(f, "EXPECTED REJECTION"),
            Verdict::UnexpectedAcceptance => write!(f, "UNEXPECTED ACCEPTANCE"),
        }
    }
}

/// How the node answered one submission
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// No decodable reply: connection refused, timeout, non-JSON body
    TransportRejected { reason: String },
    /// A reply carrying an `error` member or a non-2xx status
    ProtocolRejected { status: u16, error: Value },
    /// A successful reply
    Accepted { status: u16, response: Value },
}

impl Classification {
    pub fn verdict(&self) -> Verdict {
        match self {
            Classification::TransportRejected { .. } | Classification::ProtocolRejected { .. } => {
                Verdict::ExpectedRejection
            }
            Classification::Accepted { .. } => Verdict::UnexpectedAcceptance,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Classification::TransportRejected { .. })
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::TransportRejected { reason } => write!(f, "transport failure: {}", reason),
            Classification::ProtocolRejected { status, error } => {
                write!(f, "HTTP {}, error: {}", status, error)
            }
            Classification::Accepted { status, response } => {
                write!(f, "HTTP {}, response: {}", status, response)
            }
        }
    }
}

/// Classify the outcome of one RPC submission
///
/// A declared `error` wins over everything else. Without one, any non-2xx
/// status is still a rejection. A 2xx reply without an error is an
/// acceptance, even when `result` is null or absent: `SyncSubmitBlock`
/// answers a successful submission with a null result.
pub fn classify(outcome: &Result<RpcResponse, TransportError>) -> Classification {
    match outcome {
        Err(e) => Classification::TransportRejected { reason: e.to_string() },
        Ok(response) => {
            if let Some(error) = response.error() {
                Classification::ProtocolRejected {
                    status: response.status,
                    error: error.clone(),
                }
            } else if !response.is_http_success() {
                Classification::ProtocolRejected {
                    status: response.status,
                    error: response.body.clone(),
                }
            } else {
                Classification::Accepted {
                    status: response.status,
                    response: response.result().cloned().unwrap_or(Value::Null),
                }
            }
        }
    }
}
