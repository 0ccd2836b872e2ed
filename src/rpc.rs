//! Condenser JSON-RPC client.
//!
//! One reusable call path for every condenser method: build the 2.0
//! envelope, POST it, unwrap `result` or `error`. A call is exactly one
//! network round trip: no retries, no caching.

use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Method namespace used by Hive read nodes for content queries.
const API_NAMESPACE: &str = "condenser_api";

#[derive(Debug, Error)]
pub enum RpcError {
    /// DNS/connect/timeout trouble, or a non-2xx status: the endpoint never
    /// produced a JSON-RPC response.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The endpoint answered, but not with a JSON-RPC response.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The node returned a JSON-RPC `error` object.
    #[error("node error: {0}")]
    Remote(Value),
}

/// Build the JSON-RPC 2.0 envelope for a condenser call. Calls are
/// synchronous and unbatched, so the id is always the literal 1.
pub fn build_request(method: &str, params: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": format!("{API_NAMESPACE}.{method}"),
        "params": params,
        "id": 1,
    })
}

pub struct HiveClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HiveClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_millis(timeout_ms),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST one condenser call and unwrap the response. Failures are logged
    /// here with their payloads; callers only see the typed variant.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = build_request(method, &params);
        log::debug!("→ {API_NAMESPACE}.{method} @ {}", self.base_url);

        let res = self
            .http
            .post(&self.base_url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                log::error!("hive api unreachable for {method}: {e}");
                RpcError::Transport(e.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            log::error!("hive api answered http {status} for {method}");
            return Err(RpcError::Transport(format!("http {status}")));
        }

        let text = res.text().await.map_err(|e| {
            log::error!("hive api response body unreadable for {method}: {e}");
            RpcError::Transport(e.to_string())
        })?;
        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            log::error!("hive api sent invalid json for {method}: {e}");
            RpcError::Malformed(e.to_string())
        })?;

        if let Some(err) = parsed.get("error") {
            log::error!("hive api error for {method}: {err}");
            return Err(RpcError::Remote(err.clone()));
        }
        match parsed.get("result") {
            Some(result) => Ok(result.clone()),
            None => {
                log::error!("hive api response for {method} has neither result nor error");
                Err(RpcError::Malformed("neither result nor error in response".into()))
            }
        }
    }

    /// `condenser_api.get_discussions_by_blog`: the latest posts on an
    /// account's blog, in the order the node returns them (newest first).
    pub async fn get_discussions_by_blog(&self, tag: &str, limit: u32) -> Result<Value, RpcError> {
        self.call("get_discussions_by_blog", json!([{ "tag": tag, "limit": limit }]))
            .await
    }

    /// `condenser_api.get_content`: one post by (author, permlink).
    pub async fn get_content(&self, author: &str, permlink: &str) -> Result<Value, RpcError> {
        self.call("get_content", json!([author, permlink])).await
    }
}
