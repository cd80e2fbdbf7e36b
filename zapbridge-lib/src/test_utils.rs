//! Mock wallet transport for testing.
//!
//! [`MockConnector`] stands in for the Nostr transport: it hands out
//! in-memory connections backed by a scripted handler, counts completed
//! handshakes and closes, and can be told to stall or fail connects. Clone
//! the connector before moving it into a bridge to keep a probe for the
//! counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connector::{WalletConnection, WalletConnector};
use crate::identity::RemoteIdentity;
use crate::rpc::{ToolResponse, TOOL_GET_INFO, TOOL_LOOKUP_INVOICE, TOOL_MAKE_INVOICE};
use crate::{BridgeError, Result};

type Handler = dyn Fn(&str, &Value) -> Result<ToolResponse> + Send + Sync;

/// Canned wallet behavior: declares default bounds, issues deterministic
/// invoices and reports every lookup as unsettled.
pub fn default_wallet(tool: &str, arguments: &Value) -> Result<ToolResponse> {
    match tool {
        TOOL_GET_INFO => Ok(ToolResponse::from_json(&json!({
            "minSendable": 1000,
            "maxSendable": 100_000_000,
            "description": "Mock wallet",
        }))),
        TOOL_MAKE_INVOICE => Ok(ToolResponse::from_json(&json!({
            "result": {
                "invoice": format!("lnbc-mock-{}", arguments["amount"]),
                "payment_hash": "aa".repeat(32),
            }
        }))),
        TOOL_LOOKUP_INVOICE => Ok(ToolResponse::from_json(&json!({
            "result": {
                "settled": false,
                "payment_hash": arguments["payment_hash"],
            }
        }))),
        other => Err(BridgeError::RemoteUnavailable {
            operation: other.to_string(),
            reason: "unknown tool".to_string(),
        }),
    }
}

/// In-memory stand-in for the Nostr connector.
#[derive(Clone)]
pub struct MockConnector {
    handler: Arc<Handler>,
    connect_delay: Duration,
    fail_connects_remaining: Arc<AtomicUsize>,
    fail_close: bool,
    handshakes: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Connector backed by [`default_wallet`].
    pub fn new() -> Self {
        Self {
            handler: Arc::new(default_wallet),
            connect_delay: Duration::ZERO,
            fail_connects_remaining: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
            handshakes: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the scripted wallet behavior.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<ToolResponse> + Send + Sync + 'static,
    {
        self.handler = Arc::new(handler);
        self
    }

    /// Stall every handshake, widening concurrency race windows.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Fail the next `count` handshakes before succeeding.
    pub fn with_connect_failures(self, count: usize) -> Self {
        self.fail_connects_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Make every close report a failure.
    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Completed handshakes so far.
    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    /// Close attempts so far.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Every tool call recorded across all connections, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("call log lock poisoned").clone()
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, remote: &RemoteIdentity) -> Result<MockConnection> {
        if self.connect_delay > Duration::ZERO {
            tokio::time::sleep(self.connect_delay).await;
        }
        let should_fail = self
            .fail_connects_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(BridgeError::ConnectionFailed {
                target: remote.to_string(),
                reason: "mock handshake failure".to_string(),
            });
        }
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            handler: Arc::clone(&self.handler),
            fail_close: self.fail_close,
            closes: Arc::clone(&self.closes),
            calls: Arc::clone(&self.calls),
        })
    }
}

/// Connection handed out by [`MockConnector`].
pub struct MockConnection {
    handler: Arc<Handler>,
    fail_close: bool,
    closes: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl std::fmt::Debug for MockConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnection")
            .field("fail_close", &self.fail_close)
            .field("closes", &self.closes.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletConnection for MockConnection {
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<ToolResponse> {
        self.calls
            .lock()
            .expect("call log lock poisoned")
            .push((tool.to_string(), arguments.clone()));
        (self.handler)(tool, &arguments)
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(BridgeError::Internal("mock close failure".to_string()));
        }
        Ok(())
    }
}
