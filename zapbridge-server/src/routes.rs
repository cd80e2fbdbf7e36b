//! LNURL-pay routes and error rendering.
//!
//! Three JSON endpoints plus the demo page:
//! - `GET /.well-known/lnurlp/{identifier}`: LUD-06 payRequest
//! - `GET /lnurlp/{identifier}/callback?amount=<msats>`: invoice issuance
//! - `GET /lnurlp/{identifier}/verify/{payment_hash}`: settlement status
//!
//! Handlers stay thin: normalize-and-call the bridge, shape the reply.
//! Every failure renders as `{"status":"ERROR","reason":...}` with the
//! status code derived from the bridge error kind.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use zapbridge_lib::{BridgeError, PayeeInfo, PaymentBridge, WalletConnector};

/// Description served when the payee declares none.
const DEFAULT_DESCRIPTION: &str = "Lightning payment";

/// Shared handler state.
pub struct AppState<C: WalletConnector> {
    /// The protocol bridge.
    pub bridge: Arc<PaymentBridge<C>>,
    /// Base URL for callback/verify links.
    pub public_url: String,
}

impl<C: WalletConnector> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            bridge: Arc::clone(&self.bridge),
            public_url: self.public_url.clone(),
        }
    }
}

/// Build the LNURL router over the given state.
pub fn router<C: WalletConnector>(state: AppState<C>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/.well-known/lnurlp/{identifier}", get(pay_request::<C>))
        .route("/lnurlp/{identifier}/callback", get(callback::<C>))
        .route(
            "/lnurlp/{identifier}/verify/{payment_hash}",
            get(verify::<C>),
        )
        .with_state(state)
}

/// LUD-06 payRequest body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    /// Invoice issuance URL.
    pub callback: String,
    /// Minimum sendable amount (msat).
    pub min_sendable: u64,
    /// Maximum sendable amount (msat).
    pub max_sendable: u64,
    /// JSON-encoded metadata array string.
    pub metadata: String,
    /// Always `payRequest`.
    pub tag: &'static str,
}

impl PayRequest {
    fn new(public_url: &str, identifier: &str, info: &PayeeInfo) -> Self {
        Self {
            callback: format!("{public_url}/lnurlp/{identifier}/callback"),
            min_sendable: info.min_sendable_msats(),
            max_sendable: info.max_sendable_msats(),
            metadata: lnurl_metadata(info),
            tag: "payRequest",
        }
    }
}

/// Callback reply carrying the invoice.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    /// Serialized payment request.
    pub pr: String,
    /// Route hints; always empty here.
    pub routes: Vec<Value>,
    /// Settlement status URL for this invoice.
    pub verify: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    amount: Option<String>,
}

/// Build the LUD-06 metadata array string for a payee.
fn lnurl_metadata(info: &PayeeInfo) -> String {
    let mut entries = vec![serde_json::json!([
        "text/plain",
        info.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    ])];
    if let Some(long) = &info.long_description {
        entries.push(serde_json::json!(["text/long-desc", long]));
    }
    if let Some(image) = &info.image_data {
        entries.push(serde_json::json!(["image/png;base64", image]));
    }
    Value::Array(entries).to_string()
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

async fn pay_request<C: WalletConnector>(
    State(state): State<AppState<C>>,
    Path(identifier): Path<String>,
) -> Result<Json<PayRequest>, ApiError> {
    let info = state.bridge.resolve_pay_info(&identifier).await?;
    Ok(Json(PayRequest::new(&state.public_url, &identifier, &info)))
}

async fn callback<C: WalletConnector>(
    State(state): State<AppState<C>>,
    Path(identifier): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let invoice = state
        .bridge
        .create_invoice(&identifier, query.amount.as_deref())
        .await?;
    let verify = format!(
        "{}/lnurlp/{}/verify/{}",
        state.public_url, identifier, invoice.payment_hash
    );
    Ok(Json(CallbackResponse {
        pr: invoice.invoice,
        routes: Vec::new(),
        verify,
    }))
}

async fn verify<C: WalletConnector>(
    State(state): State<AppState<C>>,
    Path((identifier, payment_hash)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let status = state
        .bridge
        .lookup_payment(&identifier, &payment_hash)
        .await?;
    Ok(Json(status))
}

/// LNURL error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Always `ERROR`.
    pub status: &'static str,
    /// Human-readable failure reason.
    pub reason: String,
}

impl ErrorEnvelope {
    /// Wrap a reason string.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            status: "ERROR",
            reason: reason.into(),
        }
    }
}

/// Bridge failure on its way out of the HTTP layer.
#[derive(Debug)]
pub struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self.0 {
            BridgeError::InvalidIdentity { .. } | BridgeError::InvalidAmount { .. } => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            BridgeError::ConnectionFailed { .. }
            | BridgeError::RemoteUnavailable { .. }
            | BridgeError::Timeout { .. }
            | BridgeError::MalformedResponse { .. } => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            BridgeError::Internal(detail) => {
                tracing::error!(%detail, "unclassified failure reached the HTTP boundary");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unexpected internal error".to_string(),
                )
            }
        };
        (status, Json(ErrorEnvelope::new(reason))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_starts_with_plain_description() {
        let info = PayeeInfo {
            description: Some("Tip jar".to_string()),
            ..PayeeInfo::default()
        };
        let metadata: Value = serde_json::from_str(&lnurl_metadata(&info)).unwrap();
        assert_eq!(metadata[0][0], "text/plain");
        assert_eq!(metadata[0][1], "Tip jar");
    }

    #[test]
    fn test_metadata_includes_optional_entries() {
        let info = PayeeInfo {
            description: Some("Tip jar".to_string()),
            long_description: Some("Longer form".to_string()),
            image_data: Some("aWNvbg==".to_string()),
            ..PayeeInfo::default()
        };
        let metadata: Value = serde_json::from_str(&lnurl_metadata(&info)).unwrap();
        assert_eq!(metadata.as_array().unwrap().len(), 3);
        assert_eq!(metadata[1][0], "text/long-desc");
        assert_eq!(metadata[2][0], "image/png;base64");
    }

    #[test]
    fn test_metadata_defaults_description() {
        let metadata: Value =
            serde_json::from_str(&lnurl_metadata(&PayeeInfo::default())).unwrap();
        assert_eq!(metadata[0][1], DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_pay_request_serializes_camel_case() {
        let body = PayRequest::new("http://localhost:3000", "ab12", &PayeeInfo::default());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["minSendable"], 1_000);
        assert_eq!(json["maxSendable"], 100_000_000);
        assert_eq!(json["tag"], "payRequest");
        assert_eq!(
            json["callback"],
            "http://localhost:3000/lnurlp/ab12/callback"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                BridgeError::invalid_amount("missing"),
                StatusCode::BAD_REQUEST,
            ),
            (
                BridgeError::invalid_identity("bad bech32"),
                StatusCode::BAD_REQUEST,
            ),
            (
                BridgeError::ConnectionFailed {
                    target: "ab12".into(),
                    reason: "no relay".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                BridgeError::malformed("make_invoice", "no result"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                BridgeError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
