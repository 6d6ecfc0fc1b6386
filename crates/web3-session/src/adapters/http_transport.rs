//! HTTP Transport Adapter
//!
//! Implements the callback-style `Web3Transport` port over JSON-RPC 2.0.
//! Every call is spawned onto the caller's tokio runtime; the callback runs
//! on that task once the response is decoded.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::{Endpoint, SessionError, TransportError};
use crate::ports::{Callback, TransportFactory, Web3Transport};

/// Client API version reported by [`HttpTransport`].
pub const CLIENT_API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcErrorObject>,
}

impl<T> JsonRpcResponse<T> {
    fn into_result(self) -> Result<T, TransportError> {
        if let Some(error) = self.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| TransportError::Decode("response has no result".to_string()))
    }
}

/// JSON-RPC over HTTP.
pub struct HttpTransport {
    endpoint: Endpoint,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for `endpoint`.
    pub fn new(endpoint: Endpoint) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, None)
    }

    /// Create with a per-request HTTP timeout.
    pub fn with_timeout(
        endpoint: Endpoint,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// The endpoint requests are posted to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn call<T>(&self, method: &'static str, done: Callback<T>) -> Result<(), TransportError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::Rejected(format!("no async runtime: {}", e)))?;

        let client = self.client.clone();
        let url = self.endpoint.url().to_string();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        runtime.spawn(async move {
            let result = post::<T>(&client, &url, id, method).await;
            if let Err(e) = &result {
                debug!("[web3] {} #{} via {} failed: {}", method, id, url, e);
            }
            done(result);
        });

        Ok(())
    }
}

async fn post<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    id: u64,
    method: &str,
) -> Result<T, TransportError> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        id,
        method,
        params: Vec::new(),
    };

    let response = client
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|e| TransportError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Http(format!("HTTP status {}", status)));
    }

    let envelope: JsonRpcResponse<T> = response
        .json()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))?;
    envelope.into_result()
}

impl Web3Transport for HttpTransport {
    fn api_version(&self) -> &str {
        CLIENT_API_VERSION
    }

    fn node_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.call("web3_clientVersion", done)
    }

    fn network_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.call("net_version", done)
    }

    fn protocol_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.call("eth_protocolVersion", done)
    }

    fn whisper_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.call("shh_version", done)
    }

    fn accounts(&self, done: Callback<Vec<String>>) -> Result<(), TransportError> {
        self.call("eth_accounts", done)
    }

    fn describe(&self) -> String {
        format!("http:{}", self.endpoint)
    }
}

/// Default factory: one [`HttpTransport`] per endpoint.
#[derive(Clone, Debug, Default)]
pub struct HttpTransportFactory {
    timeout: Option<Duration>,
}

impl HttpTransportFactory {
    /// Factory whose transports apply `timeout` to every HTTP request.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn build(&self, endpoint: &Endpoint) -> Result<Arc<dyn Web3Transport>, SessionError> {
        let transport = HttpTransport::with_timeout(endpoint.clone(), self.timeout)?;
        Ok(Arc::new(transport))
    }
}
