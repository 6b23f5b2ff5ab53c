// fil-rpc/src/client.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{RpcError, TransportError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a [Value],
    pub id: u64,
}

/// A decoded reply from the node, whatever its HTTP status
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    /// HTTP status code of the reply
    pub status: u16,
    /// Decoded JSON body
    pub body: Value,
}

impl RpcResponse {
    /// The declared `error` member, if present and not null
    pub fn error(&self) -> Option<&Value> {
        self.body.get("error").filter(|e| !e.is_null())
    }

    /// The `result` member, if present
    pub fn result(&self) -> Option<&Value> {
        self.body.get("result")
    }

    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON-RPC call and hands back the decoded reply
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: &[Value]) -> Result<RpcResponse, TransportError>;

    /// The endpoint this transport talks to, for logging
    fn endpoint(&self) -> &str;
}

/// HTTP POST transport for Lotus/Forest `/rpc/v0` endpoints
#[derive(Clone)]
pub struct HttpRpcClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpRpcClient {
    /// Creates a client with the default timeout and no authentication
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_config(endpoint, None, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an optional bearer token and a fixed timeout
    pub fn with_config(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint).map_err(|e| RpcError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: token.filter(|t| !t.is_empty()),
            timeout,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn map_send_error(&self, e: reqwest::Error) -> TransportError {
        // a connect that times out never reached the node
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_timeout() {
            TransportError::Timeout(self.timeout.as_millis() as u64)
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn call(&self, method: &str, params: &[Value]) -> Result<RpcResponse, TransportError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let mut builder = self.client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&request);

        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;

        let body = serde_json::from_slice::<Value>(&bytes)
            .map_err(|e| TransportError::Decode(format!("status {status}: {e}")))?;

        Ok(RpcResponse { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
