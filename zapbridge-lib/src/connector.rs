//! Transport seam.
//!
//! The registry and façade only need three operations from a transport:
//! connect to a peer, invoke a named tool, close the connection. Everything
//! relay- and signing-related stays behind these traits; the production
//! implementation is [`crate::nostr::NostrConnector`].

use async_trait::async_trait;
use serde_json::Value;

use crate::identity::RemoteIdentity;
use crate::rpc::ToolResponse;
use crate::Result;

/// An established connection to one remote wallet.
///
/// Handles are owned by the [`crate::ConnectionRegistry`]; callers borrow
/// them for the duration of a single tool call.
#[async_trait]
pub trait WalletConnection: Send + Sync + 'static {
    /// Invoke a named tool with JSON arguments and return the raw reply.
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<ToolResponse>;

    /// Tear the connection down. Further calls are undefined.
    async fn close(&self) -> Result<()>;
}

/// Factory performing the connection handshake for a remote identity.
#[async_trait]
pub trait WalletConnector: Send + Sync + 'static {
    /// Connection type produced by this connector.
    type Connection: WalletConnection;

    /// Establish a connection to `remote`, returning only once the
    /// handshake has completed.
    async fn connect(&self, remote: &RemoteIdentity) -> Result<Self::Connection>;
}
