//! # The Ledger Collaborator
//!
//! The one place this crate touches a network. Two operations, both JSON-RPC
//! 2.0 over HTTP:
//!
//! | Method                | Purpose                                        |
//! |-----------------------|------------------------------------------------|
//! | `query`               | Fetch an access key's nonce and a recent block |
//! | `broadcast_tx_commit` | Submit a base64 signed-transaction envelope    |
//!
//! The core pipeline only depends on the [`AccessKeyProvider`] trait, so
//! tests swap in an in-memory provider and never open a socket. The concrete
//! [`JsonRpcClient`] is the thin reqwest-backed implementation a real wallet
//! uses.
//!
//! A missing access key is a first-class outcome
//! ([`RpcError::UnknownAccessKey`]), distinct from every transport or server
//! failure. It is never, under any circumstances, collapsed into "nonce 0".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

use crate::config::BLOCK_HASH_LENGTH;
use crate::crypto::LumenPublicKey;

/// JSON-RPC error code the ledger uses for "account or access key does not
/// exist". Anything else is a generic server error.
const CODE_UNKNOWN_ACCESS_KEY: i64 = -32002;

/// Errors from talking to the ledger.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The queried (account, public key) pair does not exist on the ledger.
    /// The caller must surface this — fabricating a nonce for a key the
    /// ledger has never seen produces a transaction it will silently drop.
    #[error("no access key {public_key} on account {account_id}")]
    UnknownAccessKey {
        account_id: String,
        public_key: String,
    },

    /// HTTP-level failure: connection refused, timeout, TLS, bad JSON body.
    #[error("rpc transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a JSON-RPC error other than "not found".
    #[error("rpc server error {code}: {message}")]
    Server { code: i64, message: String },

    /// The server answered 200 with something that isn't a valid response
    /// for the method we called.
    #[error("malformed rpc response: {0}")]
    InvalidResponse(String),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Supported JSON-RPC methods. The wire name is the serde rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum RpcMethod {
    /// State queries, path-style: `["access_key/<account>/<public_key>", ""]`.
    #[serde(rename = "query")]
    Query,
    /// Submit a signed transaction and wait for execution.
    /// Parameters: `[<base64 envelope>]`.
    #[serde(rename = "broadcast_tx_commit")]
    BroadcastTxCommit,
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: RpcMethod,
    params: serde_json::Value,
}

/// A JSON-RPC 2.0 response. Exactly one of `result` or `error` is set by a
/// conforming server.
#[derive(Debug, Clone, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// The access-key view as the ledger serves it.
#[derive(Debug, Clone, Deserialize)]
struct AccessKeyView {
    nonce: u64,
    block_hash: String,
}

// ---------------------------------------------------------------------------
// AccessKeyState
// ---------------------------------------------------------------------------

/// Replay-protection state for one (account, public key) pair.
///
/// `nonce` is the last nonce the ledger has *consumed* for this key — the
/// next transaction must use exactly `nonce + 1`. Fetched fresh for every
/// signing attempt, never cached: a stale nonce is a rejected transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessKeyState {
    /// Last consumed nonce.
    pub nonce: u64,
    /// A recently observed block hash, already base58-decoded. Anchors the
    /// transaction's validity window.
    pub block_hash: [u8; BLOCK_HASH_LENGTH],
}

/// The query half of the ledger collaborator.
///
/// This is the pipeline's only seam to the outside world; everything after
/// the query is pure, synchronous computation.
#[async_trait]
pub trait AccessKeyProvider {
    /// Fetches the current access-key state for `(account_id, public_key)`.
    ///
    /// Absence of the account or key is [`RpcError::UnknownAccessKey`],
    /// a distinct outcome from a zero nonce on an existing key.
    async fn view_access_key(
        &self,
        account_id: &str,
        public_key: &LumenPublicKey,
    ) -> Result<AccessKeyState, RpcError>;
}

// ---------------------------------------------------------------------------
// JsonRpcClient
// ---------------------------------------------------------------------------

/// Concrete JSON-RPC client over reqwest.
pub struct JsonRpcClient {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Creates a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one JSON-RPC call and unwraps the JSON-RPC layer.
    async fn call(
        &self,
        method: RpcMethod,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(?method, id = request.id, "rpc call");

        let response: RpcResponse = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(RpcError::Server {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("neither result nor error set".into()))
    }

    /// Submits a base64 signed-transaction envelope via `broadcast_tx_commit`
    /// and returns the ledger's execution outcome as raw JSON.
    pub async fn broadcast_tx_commit(
        &self,
        transport_payload: &str,
    ) -> Result<serde_json::Value, RpcError> {
        self.call(
            RpcMethod::BroadcastTxCommit,
            serde_json::json!([transport_payload]),
        )
        .await
    }
}

#[async_trait]
impl AccessKeyProvider for JsonRpcClient {
    async fn view_access_key(
        &self,
        account_id: &str,
        public_key: &LumenPublicKey,
    ) -> Result<AccessKeyState, RpcError> {
        let path = format!("access_key/{}/{}", account_id, public_key);
        let result = self
            .call(RpcMethod::Query, serde_json::json!([path, ""]))
            .await
            .map_err(|e| match e {
                RpcError::Server { code, .. } if code == CODE_UNKNOWN_ACCESS_KEY => {
                    RpcError::UnknownAccessKey {
                        account_id: account_id.to_string(),
                        public_key: public_key.to_string(),
                    }
                }
                other => other,
            })?;

        let view: AccessKeyView = serde_json::from_value(result)
            .map_err(|e| RpcError::InvalidResponse(format!("access key view: {}", e)))?;

        let decoded = bs58::decode(&view.block_hash)
            .into_vec()
            .map_err(|e| RpcError::InvalidResponse(format!("block hash base58: {}", e)))?;
        let block_hash: [u8; BLOCK_HASH_LENGTH] = decoded.as_slice().try_into().map_err(|_| {
            RpcError::InvalidResponse(format!(
                "block hash is {} bytes, expected {}",
                decoded.len(),
                BLOCK_HASH_LENGTH
            ))
        })?;

        debug!(account_id, nonce = view.nonce, "access key fetched");
        Ok(AccessKeyState {
            nonce: view.nonce,
            block_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::LumenKeypair;

    fn key() -> LumenPublicKey {
        LumenKeypair::from_seed(&[7u8; 32]).public_key()
    }

    async fn mock_query_response(body: serde_json::Value) -> (mockito::ServerGuard, JsonRpcClient) {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;
        let client = JsonRpcClient::new(server.url());
        (server, client)
    }

    #[tokio::test]
    async fn view_access_key_parses_nonce_and_block_hash() {
        let (_server, client) = mock_query_response(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "nonce": 41,
                "block_hash": "11111111111111111111111111111111",
                "permission": "FullAccess"
            }
        }))
        .await;

        let state = client.view_access_key("a.testnet", &key()).await.unwrap();
        assert_eq!(state.nonce, 41);
        // All-ones base58 decodes to 32 zero bytes.
        assert_eq!(state.block_hash, [0u8; 32]);
    }

    #[tokio::test]
    async fn missing_access_key_is_a_distinct_error() {
        let (_server, client) = mock_query_response(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32002, "message": "access key not found" }
        }))
        .await;

        let err = client.view_access_key("ghost.testnet", &key()).await;
        assert!(matches!(err, Err(RpcError::UnknownAccessKey { .. })));
    }

    #[tokio::test]
    async fn other_server_errors_pass_through() {
        let (_server, client) = mock_query_response(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32603, "message": "internal error" }
        }))
        .await;

        let err = client.view_access_key("a.testnet", &key()).await;
        assert!(matches!(err, Err(RpcError::Server { code: -32603, .. })));
    }

    #[tokio::test]
    async fn short_block_hash_is_invalid_response() {
        let (_server, client) = mock_query_response(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "nonce": 1, "block_hash": "abc" }
        }))
        .await;

        let err = client.view_access_key("a.testnet", &key()).await;
        assert!(matches!(err, Err(RpcError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn empty_response_is_invalid() {
        let (_server, client) = mock_query_response(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1
        }))
        .await;

        let err = client.view_access_key("a.testnet", &key()).await;
        assert!(matches!(err, Err(RpcError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn broadcast_sends_payload_and_returns_outcome() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "method": "broadcast_tx_commit",
                "params": ["CQAAAGEudGVzdG5ldA=="]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "status": { "SuccessValue": "" } }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = JsonRpcClient::new(server.url());
        let outcome = client
            .broadcast_tx_commit("CQAAAGEudGVzdG5ldA==")
            .await
            .unwrap();
        assert!(outcome.get("status").is_some());
        mock.assert_async().await;
    }

    #[test]
    fn query_path_matches_wire_convention() {
        let pk = key();
        let path = format!("access_key/{}/{}", "a.testnet", pk);
        assert!(path.starts_with("access_key/a.testnet/ed25519:"));
    }
}
