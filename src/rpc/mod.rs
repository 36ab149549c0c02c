pub mod client;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{HttpConfigClient, RpcClientOptions};
pub use types::{
    AuditLogRequest, AuditLogResponse, Change, ChangeLog, ChangeSet, ReadRequest, ReadResponse,
    SearchRequest, SearchResponse,
};

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to build RPC client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid RPC address: {address}")]
    InvalidAddress { address: String },

    #[error("{endpoint} transport failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {detail}")]
    Remote {
        endpoint: &'static str,
        status: u16,
        detail: String,
    },

    #[error("{endpoint} response could not be decoded: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The remote configuration service. Every call is a single attempt; the
/// implementation owns timeouts.
#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn audit_log(&self, request: AuditLogRequest) -> Result<AuditLogResponse, RpcError>;

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, RpcError>;

    async fn read(&self, request: ReadRequest) -> Result<ReadResponse, RpcError>;
}
