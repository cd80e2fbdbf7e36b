//! Zapbridge library.
//!
//! Bridges LNURL-pay requests (LUD-06/LUD-16) to a wallet reachable over
//! Nostr relays. The wallet advertises three named tools (`get_info`,
//! `make_invoice` and `lookup_invoice`), and this crate resolves a payee
//! identifier (`npub1…` or raw hex) to a pooled connection, invokes the
//! right tool and translates the response back into LNURL terms.
//!
//! The crate stays transport-agnostic at its seams: the registry and façade
//! are generic over [`WalletConnector`], and the production Nostr
//! implementation lives in [`nostr`]. Consumers inject a connector and get
//! the full bridging pipeline:
//!
//! ```ignore
//! use zapbridge_lib::{PaymentBridge, nostr::NostrConnector};
//!
//! let connector = NostrConnector::generate(relays);
//! let bridge = PaymentBridge::new(connector);
//! let info = bridge.resolve_pay_info("npub1...").await?;
//! let invoice = bridge.create_invoice("npub1...", Some("21000")).await?;
//! bridge.shutdown().await?;
//! ```

pub mod amount;
pub mod connector;
pub mod errors;
pub mod identity;
pub mod nostr;
pub mod registry;
pub mod rpc;
pub mod service;

/// Mock connector and canned wallet responses for testing.
///
/// Only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use connector::{WalletConnection, WalletConnector};
pub use errors::BridgeError;
pub use identity::RemoteIdentity;
pub use registry::ConnectionRegistry;
pub use rpc::{Invoice, PayeeInfo, ToolResponse};
pub use service::{BridgeConfig, PaymentBridge};

/// Common result alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
