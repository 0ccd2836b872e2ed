//! Condenser client tests against a loopback JSON-RPC stand-in.
//!
//! The stand-in records every request body and counts hits, so these tests
//! can pin down the exact wire envelope and the single-attempt behavior
//! without touching a real Hive node.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use hivex::rpc::{HiveClient, RpcError};

#[derive(Default)]
struct Recorded {
    hits: AtomicUsize,
    last_request: Mutex<Option<Value>>,
}

type NodeState = (Arc<Recorded>, Arc<Value>);

async fn rpc_handler(State((node, reply)): State<NodeState>, Json(body): Json<Value>) -> Json<Value> {
    node.hits.fetch_add(1, Ordering::SeqCst);
    *node.last_request.lock().unwrap() = Some(body);
    Json((*reply).clone())
}

/// Loopback node answering every POST with a fixed JSON-RPC reply.
async fn spawn_node(reply: Value) -> (Arc<Recorded>, String) {
    let node = Arc::new(Recorded::default());
    let app = Router::new()
        .route("/", post(rpc_handler))
        .with_state((node.clone(), Arc::new(reply)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (node, format!("http://{addr}/"))
}

/// Loopback node answering with a fixed status and raw body.
async fn spawn_raw_node(status: StatusCode, body: &'static str) -> (Arc<AtomicUsize>, String) {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_handler = hits.clone();
    let app = Router::new().route(
        "/",
        post(move || {
            let hits = hits_handler.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (status, body)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (hits, format!("http://{addr}/"))
}

#[tokio::test]
async fn request_envelope_is_exact_and_result_comes_back_unchanged() {
    let result = json!([{"deep": {"x": [1, 2, 3]}}]);
    let (node, url) = spawn_node(json!({"jsonrpc": "2.0", "result": result, "id": 1})).await;
    let client = HiveClient::new(url, 2000);

    let got = client
        .call("get_discussions_by_blog", json!([{"tag": "alice", "limit": 10}]))
        .await
        .unwrap();
    assert_eq!(got, result, "result value must pass through untouched");

    let sent = node.last_request.lock().unwrap().clone().unwrap();
    let mut keys: Vec<&str> = sent.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["id", "jsonrpc", "method", "params"]);
    assert_eq!(sent["jsonrpc"], "2.0");
    assert_eq!(sent["id"], 1);
    assert_eq!(sent["method"], "condenser_api.get_discussions_by_blog");
    assert_eq!(sent["params"], json!([{"tag": "alice", "limit": 10}]));
    assert_eq!(node.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn node_error_surfaces_as_remote() {
    let (node, url) = spawn_node(json!({
        "jsonrpc": "2.0",
        "error": {"code": -32000, "message": "account does not exist"},
        "id": 1
    }))
    .await;
    let client = HiveClient::new(url, 2000);

    let err = client.call("get_content", json!(["alice", "p1"])).await.unwrap_err();
    match err {
        RpcError::Remote(v) => assert_eq!(v["message"], "account does not exist"),
        other => panic!("expected Remote, got {other:?}"),
    }
    assert_eq!(node.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reply_without_result_or_error_is_malformed() {
    let (_node, url) = spawn_node(json!({"jsonrpc": "2.0", "id": 1})).await;
    let client = HiveClient::new(url, 2000);

    let err = client.call("get_content", json!(["a", "p"])).await.unwrap_err();
    assert!(matches!(err, RpcError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn unparsable_body_is_malformed() {
    let (hits, url) = spawn_raw_node(StatusCode::OK, "this is not json").await;
    let client = HiveClient::new(url, 2000);

    let err = client.call("get_content", json!(["a", "p"])).await.unwrap_err();
    assert!(matches!(err, RpcError::Malformed(_)), "got {err:?}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn http_error_status_is_transport_with_exactly_one_attempt() {
    let (hits, url) = spawn_raw_node(StatusCode::INTERNAL_SERVER_ERROR, "gateway on fire").await;
    let client = HiveClient::new(url, 2000);

    let err = client.call("get_content", json!(["a", "p"])).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)), "got {err:?}");
    assert_eq!(hits.load(Ordering::SeqCst), 1, "a failed call must not be retried");
}

#[tokio::test]
async fn connection_refused_is_transport() {
    // Bind then drop so nothing listens on the port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HiveClient::new(format!("http://{addr}/"), 2000);
    let err = client.call("get_content", json!(["a", "p"])).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_node_times_out_as_transport_without_retry() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_handler = hits.clone();
    let app = Router::new().route(
        "/",
        post(move || {
            let hits = hits_handler.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"jsonrpc": "2.0", "result": null, "id": 1}))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HiveClient::new(format!("http://{addr}/"), 100);
    let err = client.call("get_content", json!(["a", "p"])).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)), "got {err:?}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
