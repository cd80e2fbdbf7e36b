//! End-to-end façade flows against the mock wallet.

use serde_json::json;
use zapbridge_lib::test_utils::MockConnector;
use zapbridge_lib::{BridgeConfig, BridgeError, PaymentBridge, ToolResponse};

const REMOTE: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";
const NPUB: &str = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";

#[tokio::test]
async fn test_resolve_pay_info_applies_defaults() {
    let connector =
        MockConnector::new().with_handler(|_, _| Ok(ToolResponse::from_json(&json!({}))));
    let bridge = PaymentBridge::new(connector);

    let info = bridge.resolve_pay_info(REMOTE).await.unwrap();
    assert_eq!(info.min_sendable_msats(), 1_000);
    assert_eq!(info.max_sendable_msats(), 100_000_000);
    assert!(info.description.is_none());
}

#[tokio::test]
async fn test_npub_and_hex_share_one_connection() {
    let connector = MockConnector::new();
    let probe = connector.clone();
    let bridge = PaymentBridge::new(connector);

    bridge.resolve_pay_info(NPUB).await.unwrap();
    bridge.resolve_pay_info(REMOTE).await.unwrap();

    // Both encodings normalize to the same identity and reuse the pool entry.
    assert_eq!(probe.handshakes(), 1);
}

#[tokio::test]
async fn test_create_invoice_forwards_floored_sats() {
    let connector = MockConnector::new();
    let probe = connector.clone();
    let bridge = PaymentBridge::new(connector);

    let invoice = bridge.create_invoice(REMOTE, Some("10000")).await.unwrap();
    assert_eq!(invoice.invoice, "lnbc-mock-10");

    let calls = probe.calls();
    let (tool, arguments) = calls.last().unwrap();
    assert_eq!(tool, "make_invoice");
    assert_eq!(arguments["amount"], 10);
}

#[tokio::test]
async fn test_create_invoice_rejects_bad_amounts() {
    let connector = MockConnector::new();
    let probe = connector.clone();
    let bridge = PaymentBridge::new(connector);

    for amount in [Some("invalid"), Some("0"), None] {
        let err = bridge.create_invoice(REMOTE, amount).await.unwrap_err();
        assert!(
            matches!(err, BridgeError::InvalidAmount { .. }),
            "expected InvalidAmount for {amount:?}"
        );
    }
    // Validation failed before any remote work happened.
    assert!(probe.calls().is_empty());
    assert_eq!(probe.handshakes(), 0);
}

#[tokio::test]
async fn test_create_invoice_enforces_declared_bounds() {
    let connector = MockConnector::new().with_handler(|tool, _| match tool {
        "get_info" => Ok(ToolResponse::from_json(
            &json!({"minSendable": 5_000, "maxSendable": 50_000}),
        )),
        other => panic!("unexpected tool call: {other}"),
    });
    let bridge = PaymentBridge::new(connector);

    for amount in ["1000", "60000"] {
        let err = bridge.create_invoice(REMOTE, Some(amount)).await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidAmount { .. }));
    }
}

#[tokio::test]
async fn test_sub_satoshi_amount_rejected_after_conversion() {
    let connector = MockConnector::new();
    let config = BridgeConfig {
        enforce_sendable_bounds: false,
        ..BridgeConfig::default()
    };
    let bridge = PaymentBridge::with_config(connector, config);

    let err = bridge.create_invoice(REMOTE, Some("999")).await.unwrap_err();
    assert!(matches!(err, BridgeError::InvalidAmount { .. }));
}

#[tokio::test]
async fn test_malformed_envelope_is_classified() {
    // Tool replies with plain text instead of a JSON payload.
    let connector =
        MockConnector::new().with_handler(|_, _| Ok(ToolResponse::from_text("not json")));
    let bridge = PaymentBridge::new(connector);

    let err = bridge.resolve_pay_info(REMOTE).await.unwrap_err();
    assert!(matches!(err, BridgeError::MalformedResponse { .. }));

    // Invoice payload without the result wrapper is just as malformed.
    let connector = MockConnector::new().with_handler(|tool, _| match tool {
        "get_info" => Ok(ToolResponse::from_json(&json!({}))),
        _ => Ok(ToolResponse::from_json(
            &json!({"invoice": "lnbc1...", "payment_hash": "ff00"}),
        )),
    });
    let bridge = PaymentBridge::new(connector);
    let err = bridge.create_invoice(REMOTE, Some("10000")).await.unwrap_err();
    assert!(matches!(err, BridgeError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_invalid_identifier_is_rejected() {
    let bridge = PaymentBridge::new(MockConnector::new());
    let err = bridge.resolve_pay_info("npub1garbage").await.unwrap_err();
    assert!(matches!(err, BridgeError::InvalidIdentity { .. }));
}

#[tokio::test]
async fn test_lookup_payment_round_trip() {
    let connector = MockConnector::new();
    let probe = connector.clone();
    let bridge = PaymentBridge::new(connector);

    let status = bridge.lookup_payment(REMOTE, "ff00").await.unwrap();
    assert_eq!(status["settled"], false);
    assert_eq!(status["payment_hash"], "ff00");

    let calls = probe.calls();
    let (tool, arguments) = calls.last().unwrap();
    assert_eq!(tool, "lookup_invoice");
    assert_eq!(arguments["payment_hash"], "ff00");
}

#[tokio::test]
async fn test_shutdown_drains_connections() {
    let connector = MockConnector::new();
    let probe = connector.clone();
    let bridge = PaymentBridge::new(connector);

    bridge.create_invoice(REMOTE, Some("10000")).await.unwrap();
    assert_eq!(bridge.registry().len().await, 1);

    bridge.shutdown().await.unwrap();
    assert_eq!(probe.closes(), 1);
    assert!(bridge.registry().is_empty().await);

    // Shutdown is idempotent.
    bridge.shutdown().await.unwrap();
    assert_eq!(probe.closes(), 1);
}
