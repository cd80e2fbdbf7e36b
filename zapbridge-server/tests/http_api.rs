//! HTTP surface tests over a mock wallet bridge.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use zapbridge_lib::test_utils::MockConnector;
use zapbridge_lib::{PaymentBridge, ToolResponse};
use zapbridge_server::routes::{router, AppState};

const REMOTE: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";

fn app(connector: MockConnector) -> Router {
    let state = AppState {
        bridge: Arc::new(PaymentBridge::new(connector)),
        public_url: "http://localhost:3000".to_string(),
    };
    router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn test_pay_request_shape() {
    let uri = format!("/.well-known/lnurlp/{REMOTE}");
    let (status, body) = get_json(app(MockConnector::new()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag"], "payRequest");
    assert_eq!(body["minSendable"], 1_000);
    assert_eq!(body["maxSendable"], 100_000_000);
    assert_eq!(
        body["callback"],
        format!("http://localhost:3000/lnurlp/{REMOTE}/callback")
    );

    let metadata: Value = serde_json::from_str(body["metadata"].as_str().unwrap()).unwrap();
    assert_eq!(metadata[0][0], "text/plain");
    assert_eq!(metadata[0][1], "Mock wallet");
}

#[tokio::test]
async fn test_callback_returns_invoice() {
    let uri = format!("/lnurlp/{REMOTE}/callback?amount=10000");
    let (status, body) = get_json(app(MockConnector::new()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"], "lnbc-mock-10");
    assert_eq!(body["routes"], Value::Array(Vec::new()));
    let verify = body["verify"].as_str().unwrap();
    assert!(verify.starts_with(&format!("http://localhost:3000/lnurlp/{REMOTE}/verify/")));
}

#[tokio::test]
async fn test_callback_rejects_bad_amounts() {
    let app = app(MockConnector::new());

    for query in ["?amount=invalid", "?amount=0", ""] {
        let uri = format!("/lnurlp/{REMOTE}/callback{query}");
        let (status, body) = get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "for query {query:?}");
        assert_eq!(body["status"], "ERROR");
        assert!(!body["reason"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_invalid_identifier_maps_to_400() {
    let (status, body) = get_json(
        app(MockConnector::new()),
        "/.well-known/lnurlp/npub1garbage",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn test_unreachable_wallet_maps_to_502() {
    let connector = MockConnector::new().with_connect_failures(1);
    let uri = format!("/.well-known/lnurlp/{REMOTE}");
    let (status, body) = get_json(app(connector), &uri).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "ERROR");
    assert!(!body["reason"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_wallet_reply_maps_to_502() {
    let connector =
        MockConnector::new().with_handler(|_, _| Ok(ToolResponse::from_text("not json")));
    let uri = format!("/.well-known/lnurlp/{REMOTE}");
    let (status, body) = get_json(app(connector), &uri).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn test_verify_endpoint_reports_status() {
    let uri = format!("/lnurlp/{REMOTE}/verify/ff00");
    let (status, body) = get_json(app(MockConnector::new()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settled"], false);
    assert_eq!(body["payment_hash"], "ff00");
}
