//! Nostr transport for the wallet tool protocol.
//!
//! Tool calls ride on ephemeral events: a JSON-RPC 2.0 request is published
//! p-tagged to the remote wallet's key, and the wallet answers with an event
//! of the response kind addressed back to us. One [`NostrConnection`] owns
//! one relay pool per remote identity; the handshake is an `initialize`
//! round-trip followed by the `initialized` notification, so a connection is
//! only handed to the registry once the remote has actually answered.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use nostr_sdk::prelude::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::connector::{WalletConnection, WalletConnector};
use crate::identity::RemoteIdentity;
use crate::rpc::ToolResponse;
use crate::{BridgeError, Result};

pub use nostr_sdk::{Keys, PublicKey};

/// Ephemeral event kind carrying tool requests.
pub const RPC_REQUEST_KIND: u16 = 25910;

/// Ephemeral event kind carrying tool responses.
pub const RPC_RESPONSE_KIND: u16 = 26910;

/// Protocol version announced during the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Connector holding the bridge's signing identity and relay set.
///
/// Cheap to clone conceptually but owned once by the registry; every
/// [`connect`](WalletConnector::connect) builds a fresh relay pool for the
/// target identity.
pub struct NostrConnector {
    keys: Keys,
    relays: Vec<String>,
}

impl NostrConnector {
    /// Build a connector from an existing signing identity.
    pub fn new(keys: Keys, relays: Vec<String>) -> Self {
        Self { keys, relays }
    }

    /// Build a connector with a freshly generated signing identity.
    pub fn generate(relays: Vec<String>) -> Self {
        Self::new(Keys::generate(), relays)
    }

    /// The bridge-side public key requests are signed with.
    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }
}

#[async_trait]
impl WalletConnector for NostrConnector {
    type Connection = NostrConnection;

    async fn connect(&self, remote: &RemoteIdentity) -> Result<NostrConnection> {
        let failed = |reason: String| BridgeError::ConnectionFailed {
            target: remote.to_string(),
            reason,
        };

        let remote_key = PublicKey::from_hex(remote.as_hex())
            .map_err(|err| failed(format!("not a valid public key: {err}")))?;
        if self.relays.is_empty() {
            return Err(failed("no relays configured".to_string()));
        }

        let client = Client::new(self.keys.clone());
        for relay in &self.relays {
            client
                .add_relay(relay.clone())
                .await
                .map_err(|err| failed(format!("add relay {relay}: {err}")))?;
        }
        client.connect().await;

        // Subscribe to responses addressed to us before any request goes
        // out, otherwise the reply can race past us.
        let filter = Filter::new()
            .kind(Kind::Custom(RPC_RESPONSE_KIND))
            .author(remote_key)
            .pubkey(self.keys.public_key())
            .since(Timestamp::now());
        client
            .subscribe(vec![filter], None)
            .await
            .map_err(|err| failed(format!("subscribe failed: {err}")))?;

        let connection = NostrConnection {
            client,
            remote: remote_key,
            next_id: AtomicU64::new(1),
        };
        connection
            .initialize()
            .await
            .map_err(|err| failed(err.to_string()))?;

        tracing::debug!(remote = %remote_key, "handshake with wallet complete");
        Ok(connection)
    }
}

/// One live relay pool bound to one remote wallet.
pub struct NostrConnection {
    client: Client,
    remote: PublicKey,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl NostrConnection {
    /// Perform the initialize round-trip and announce readiness.
    async fn initialize(&self) -> Result<()> {
        self.request(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
        .await?;
        self.notify("notifications/initialized", json!({})).await
    }

    /// Publish a request event and wait for the matching response.
    ///
    /// Unbounded by itself; callers (registry handshake, façade calls) wrap
    /// this in their configured timeouts, and dropping the future cancels
    /// the wait.
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        // Grab the notification stream before publishing.
        let mut notifications = self.client.notifications();
        self.publish(request.to_string(), method).await?;

        loop {
            let notification = notifications.recv().await.map_err(|err| {
                BridgeError::RemoteUnavailable {
                    operation: method.to_string(),
                    reason: format!("notification stream closed: {err}"),
                }
            })?;
            let RelayPoolNotification::Event { event, .. } = notification else {
                continue;
            };
            if event.kind != Kind::Custom(RPC_RESPONSE_KIND) || event.pubkey != self.remote {
                continue;
            }
            let Ok(reply) = serde_json::from_str::<RpcReply>(&event.content) else {
                tracing::debug!(remote = %self.remote, "skipping non-JSON-RPC response event");
                continue;
            };
            if reply.id != Some(id) {
                continue;
            }
            if let Some(err) = reply.error {
                return Err(BridgeError::RemoteUnavailable {
                    operation: method.to_string(),
                    reason: format!("remote error {}: {}", err.code, err.message),
                });
            }
            return reply.result.ok_or_else(|| {
                BridgeError::malformed(method, "reply carries neither result nor error")
            });
        }
    }

    /// Publish a one-way notification.
    async fn notify(&self, method: &str, params: Value) -> Result<()> {
        let notification = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        self.publish(notification.to_string(), method).await
    }

    async fn publish(&self, content: String, operation: &str) -> Result<()> {
        let builder = EventBuilder::new(
            Kind::Custom(RPC_REQUEST_KIND),
            content,
            [Tag::public_key(self.remote)],
        );
        self.client
            .send_event_builder(builder)
            .await
            .map_err(|err| BridgeError::RemoteUnavailable {
                operation: operation.to_string(),
                reason: format!("publish failed: {err}"),
            })?;
        Ok(())
    }
}

#[async_trait]
impl WalletConnection for NostrConnection {
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<ToolResponse> {
        let result = self
            .request("tools/call", json!({ "name": tool, "arguments": arguments }))
            .await?;
        serde_json::from_value(result).map_err(|err| {
            BridgeError::malformed(tool, format!("tool reply is not a content envelope: {err}"))
        })
    }

    async fn close(&self) -> Result<()> {
        self.client
            .disconnect()
            .await
            .map_err(|err| BridgeError::Internal(format!("relay disconnect failed: {err}")))
    }
}
