// fil-rpc/src/lib.rs
pub mod client;
pub mod errors;
pub mod retry;
pub mod token;

// Re-export key types
pub use client::{HttpRpcClient, JsonRpcRequest, RpcResponse, RpcTransport};
pub use errors::{RpcError, TransportError};
pub use retry::{with_retry, RetryConfig};
pub use token::load_token;
