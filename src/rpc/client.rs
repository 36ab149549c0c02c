use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use async_trait::async_trait;

use super::types::{
    AuditLogRequest, AuditLogResponse, ReadRequest, ReadResponse, RemoteError, SearchRequest,
    SearchResponse,
};
use super::{ConfigService, RpcError};

const USER_AGENT: &str = concat!("configweb/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct RpcClientOptions {
    pub address: String,
    pub service: String,
    pub timeout_seconds: u64,
}

impl Default for RpcClientOptions {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8080".to_string(),
            service: "go.micro.srv.config".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Serialize)]
struct RpcEnvelope<'a, T: Serialize> {
    service: &'a str,
    endpoint: &'a str,
    request: &'a T,
}

/// Calls the config service through the micro API gateway's `/rpc` handler.
#[derive(Clone, Debug)]
pub struct HttpConfigClient {
    client: reqwest::Client,
    rpc_url: reqwest::Url,
    service: String,
}

impl HttpConfigClient {
    pub fn new(options: &RpcClientOptions) -> Result<Self, RpcError> {
        let rpc_url = rpc_url(&options.address)?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_seconds.max(1)))
            .build()
            .map_err(|e| RpcError::ClientBuild { source: e })?;

        Ok(Self {
            client,
            rpc_url,
            service: options.service.clone(),
        })
    }

    pub fn rpc_url(&self) -> &reqwest::Url {
        &self.rpc_url
    }

    async fn call<Req, Rsp>(&self, endpoint: &'static str, request: &Req) -> Result<Rsp, RpcError>
    where
        Req: Serialize + Sync,
        Rsp: DeserializeOwned,
    {
        let envelope = RpcEnvelope {
            service: &self.service,
            endpoint,
            request,
        };
        tracing::debug!(endpoint, service = %self.service, "calling config service");

        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| RpcError::Transport {
                endpoint,
                source: e,
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| RpcError::Transport {
            endpoint,
            source: e,
        })?;

        if !status.is_success() {
            return Err(RpcError::Remote {
                endpoint,
                status: status.as_u16(),
                detail: remote_detail(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| RpcError::Decode {
            endpoint,
            source: e,
        })
    }
}

#[async_trait]
impl ConfigService for HttpConfigClient {
    async fn audit_log(&self, request: AuditLogRequest) -> Result<AuditLogResponse, RpcError> {
        self.call("Config.AuditLog", &request).await
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, RpcError> {
        self.call("Config.Search", &request).await
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResponse, RpcError> {
        self.call("Config.Read", &request).await
    }
}

fn rpc_url(address: &str) -> Result<reqwest::Url, RpcError> {
    let invalid = || RpcError::InvalidAddress {
        address: address.to_string(),
    };
    let mut base = reqwest::Url::parse(address.trim()).map_err(|_| invalid())?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("rpc").map_err(|_| invalid())
}

fn remote_detail(body: &[u8]) -> String {
    match serde_json::from_slice::<RemoteError>(body) {
        Ok(err) if !err.detail.is_empty() => err.detail,
        Ok(err) if !err.status.is_empty() => err.status,
        _ => String::from_utf8_lossy(body).trim().to_string(),
    }
}
