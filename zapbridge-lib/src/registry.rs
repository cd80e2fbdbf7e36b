//! Connection registry.
//!
//! Process-lifetime map from canonical remote identity to an established
//! connection. At most one live connection exists per identity; creation is
//! lazy and single-flight: concurrent callers for the same unknown identity
//! serialize on a per-identity slot, so exactly one handshake runs and every
//! caller receives the same handle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::connector::{WalletConnection, WalletConnector};
use crate::identity::RemoteIdentity;
use crate::{BridgeError, Result};

/// Per-identity slot. The inner lock is what serializes the get-or-create
/// path: whoever holds it either sees a ready handle or performs the one
/// handshake everybody else waits for.
struct Slot<T>(Mutex<Option<Arc<T>>>);

impl<T> Slot<T> {
    fn empty() -> Self {
        Self(Mutex::new(None))
    }
}

/// Registry of pooled wallet connections keyed by remote identity.
pub struct ConnectionRegistry<C: WalletConnector> {
    connector: C,
    connect_timeout: Duration,
    slots: Mutex<HashMap<RemoteIdentity, Arc<Slot<C::Connection>>>>,
}

impl<C: WalletConnector> ConnectionRegistry<C> {
    /// Create a registry around `connector` with a bounded handshake.
    pub fn new(connector: C, connect_timeout: Duration) -> Self {
        Self {
            connector,
            connect_timeout,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the pooled connection for `remote`, connecting on first use.
    ///
    /// A failed handshake retains nothing; the next call retries from
    /// scratch. Handshake failures surface as `ConnectionFailed`, a
    /// handshake overrunning the configured bound as `Timeout`.
    pub async fn get_or_create(&self, remote: &RemoteIdentity) -> Result<Arc<C::Connection>> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots
                .entry(remote.clone())
                .or_insert_with(|| Arc::new(Slot::empty()))
                .clone()
        };

        let mut cell = slot.0.lock().await;
        if let Some(conn) = cell.as_ref() {
            return Ok(conn.clone());
        }

        tracing::debug!(%remote, "no pooled connection, performing handshake");
        let connected =
            match tokio::time::timeout(self.connect_timeout, self.connector.connect(remote)).await
            {
                Ok(Ok(conn)) => conn,
                Ok(Err(err @ BridgeError::ConnectionFailed { .. })) => return Err(err),
                Ok(Err(err)) => {
                    return Err(BridgeError::ConnectionFailed {
                        target: remote.to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(_) => {
                    return Err(BridgeError::Timeout {
                        operation: format!("handshake with {remote}"),
                        timeout_ms: self.connect_timeout.as_millis() as u64,
                    });
                }
            };

        let conn = Arc::new(connected);
        *cell = Some(conn.clone());
        tracing::info!(%remote, "wallet connection ready");
        Ok(conn)
    }

    /// Number of identities with a registered slot. Test and logging aid.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// True when no slots are registered.
    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// Close every retained connection and clear the registry.
    ///
    /// Close failures are collected, not short-circuited on: every handle
    /// gets its close attempt, and a single summarizing error is returned at
    /// the end. Idempotent; a second call sees an empty map and succeeds.
    pub async fn close_all(&self) -> Result<()> {
        let drained: Vec<(RemoteIdentity, Arc<Slot<C::Connection>>)> =
            self.slots.lock().await.drain().collect();

        let mut failures = Vec::new();
        for (remote, slot) in drained {
            let conn = slot.0.lock().await.take();
            if let Some(conn) = conn {
                if let Err(err) = conn.close().await {
                    tracing::warn!(%remote, error = %err, "failed to close wallet connection");
                    failures.push(format!("{remote}: {err}"));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BridgeError::Internal(format!(
                "{} connection(s) failed to close: {}",
                failures.len(),
                failures.join("; ")
            )))
        }
    }
}
