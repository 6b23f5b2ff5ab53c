// fil-rpc/src/errors.rs
use thiserror::Error;

/// Failures at the transport boundary of a single RPC call
#[derive(Error, Debug)]
pub enum TransportError {
    /// The node could not be reached at all
    #[error("Failed to connect to node: {0}")]
    Connect(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// The node answered but the body was not valid JSON
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Any other HTTP level failure
    #[error("HTTP request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether trying the same call again could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout(_))
    }

    /// Whether the call never got a connection to the node
    ///
    /// Timeouts, bad bodies and other HTTP failures happen after the node
    /// was reached.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Connect(_))
    }
}

/// Errors raised while setting up a client, before any call is made
#[derive(Error, Debug)]
pub enum RpcError {
    /// The endpoint URL could not be parsed
    #[error("Invalid RPC endpoint {0}")]
    InvalidEndpoint(String),

    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::Connect("refused".into()).is_retryable());
        assert!(TransportError::Timeout(5000).is_retryable());
        assert!(!TransportError::Decode("eof".into()).is_retryable());
        assert!(!TransportError::Request("bad".into()).is_retryable());
    }

    #[test]
    fn test_only_connect_failures_are_unreachable() {
        assert!(TransportError::Connect("refused".into()).is_unreachable());
        assert!(!TransportError::Timeout(5000).is_unreachable());
        assert!(!TransportError::Decode("<html>".into()).is_unreachable());
        assert!(!TransportError::Request("reset".into()).is_unreachable());
    }
}
