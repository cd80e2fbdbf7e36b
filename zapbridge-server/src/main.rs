//! Zapbridge HTTP entrypoint.
//!
//! Launches the LNURL-pay bridge server:
//! - `GET /.well-known/lnurlp/{identifier}`: payment parameters
//! - `GET /lnurlp/{identifier}/callback`: invoice issuance
//! - `GET /lnurlp/{identifier}/verify/{payment_hash}`: settlement status
//! - `GET /`: static demo page
//!
//! Environment (loaded from `.env` first): `ZAPBRIDGE_HOST`,
//! `ZAPBRIDGE_PORT`, `ZAPBRIDGE_PUBLIC_URL`, `ZAPBRIDGE_RELAYS`,
//! `ZAPBRIDGE_SECRET_KEY`, `ZAPBRIDGE_CONNECT_TIMEOUT_SECS`,
//! `ZAPBRIDGE_CALL_TIMEOUT_SECS`. On SIGINT/SIGTERM the server stops
//! accepting requests and drains pooled wallet connections before exit.

use std::sync::Arc;

use axum::http::Method;
use dotenvy::dotenv;
use tower_http::cors;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use zapbridge_lib::nostr::{Keys, NostrConnector};
use zapbridge_lib::{BridgeConfig, PaymentBridge};
use zapbridge_server::routes::{router, AppState};
use zapbridge_server::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let keys = match &config.secret_key {
        Some(secret) => Keys::parse(secret)?,
        None => {
            tracing::warn!("no signing key configured, generating an ephemeral identity");
            Keys::generate()
        }
    };
    tracing::info!(bridge_key = %keys.public_key(), relays = ?config.relays, "bridge identity ready");

    let connector = NostrConnector::new(keys, config.relays.clone());
    let bridge = Arc::new(PaymentBridge::with_config(
        connector,
        BridgeConfig {
            connect_timeout: config.connect_timeout,
            call_timeout: config.call_timeout,
            ..BridgeConfig::default()
        },
    ));

    let state = AppState {
        bridge: Arc::clone(&bridge),
        public_url: config.base_url(),
    };
    let app = router(state).layer(TraceLayer::new_for_http()).layer(
        cors::CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET])
            .allow_headers(cors::Any),
    );

    let addr = config.socket_addr();
    tracing::info!("serving LNURL-pay bridge at http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(err) = bridge.shutdown().await {
        tracing::warn!(error = %err, "connection drain reported failures");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
