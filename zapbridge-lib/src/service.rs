//! Bridge façade.
//!
//! `PaymentBridge` composes the identity normalizer, connection registry,
//! tool invoker and amount translator into the three consumer-facing
//! operations plus shutdown. It is also the last error-classification
//! point: everything it returns is one of the `BridgeError` kinds, and HTTP
//! consumers only map kinds to status codes.

use std::time::Duration;

use serde_json::{json, Value};

use crate::amount::{msats_to_sats, parse_msats};
use crate::connector::{WalletConnection, WalletConnector};
use crate::identity::RemoteIdentity;
use crate::registry::ConnectionRegistry;
use crate::rpc::{
    Invoice, PayeeInfo, ToolResponse, TOOL_GET_INFO, TOOL_LOOKUP_INVOICE, TOOL_MAKE_INVOICE,
};
use crate::{BridgeError, Result};

/// Tunables for the bridge.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Bound on the connection handshake.
    pub connect_timeout: Duration,
    /// Bound on a single tool call round-trip.
    pub call_timeout: Duration,
    /// Reject invoice amounts outside the payee-declared sendable band.
    pub enforce_sendable_bounds: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(20),
            call_timeout: Duration::from_secs(30),
            enforce_sendable_bounds: true,
        }
    }
}

/// The protocol-bridging client service.
pub struct PaymentBridge<C: WalletConnector> {
    registry: ConnectionRegistry<C>,
    config: BridgeConfig,
}

impl<C: WalletConnector> PaymentBridge<C> {
    /// Build a bridge with default tunables.
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, BridgeConfig::default())
    }

    /// Build a bridge with explicit tunables.
    pub fn with_config(connector: C, config: BridgeConfig) -> Self {
        Self {
            registry: ConnectionRegistry::new(connector, config.connect_timeout),
            config,
        }
    }

    /// The underlying registry. Exposed for inspection in tests and metrics.
    pub fn registry(&self) -> &ConnectionRegistry<C> {
        &self.registry
    }

    /// Resolve the pooled connection and invoke one tool, attaching
    /// operation context (tool name, identity) to every failure.
    async fn call(&self, remote: &RemoteIdentity, tool: &str, arguments: Value) -> Result<ToolResponse> {
        let conn = self.registry.get_or_create(remote).await?;
        match tokio::time::timeout(self.config.call_timeout, conn.call_tool(tool, arguments)).await
        {
            Ok(Ok(response)) => Ok(response),
            // Parsing-level classifications keep their kind; transport
            // failures get wrapped with the operation context.
            Ok(Err(err @ BridgeError::MalformedResponse { .. })) => Err(err),
            Ok(Err(err)) => Err(BridgeError::RemoteUnavailable {
                operation: format!("{tool} for {remote}"),
                reason: err.to_string(),
            }),
            Err(_) => Err(BridgeError::Timeout {
                operation: format!("{tool} for {remote}"),
                timeout_ms: self.config.call_timeout.as_millis() as u64,
            }),
        }
    }

    /// Invoke `get_info` against an already-normalized identity.
    pub async fn get_info(&self, remote: &RemoteIdentity) -> Result<PayeeInfo> {
        let response = self.call(remote, TOOL_GET_INFO, json!({})).await?;
        let payload = response.text_payload(TOOL_GET_INFO)?;
        serde_json::from_value(payload).map_err(|err| {
            BridgeError::malformed(TOOL_GET_INFO, format!("unexpected payload shape: {err}"))
        })
    }

    /// Invoke `make_invoice` for `amount_sats` satoshis.
    pub async fn make_invoice(&self, remote: &RemoteIdentity, amount_sats: u64) -> Result<Invoice> {
        let response = self
            .call(remote, TOOL_MAKE_INVOICE, json!({ "amount": amount_sats }))
            .await?;
        let result = response.result_payload(TOOL_MAKE_INVOICE)?;
        serde_json::from_value(result).map_err(|err| {
            BridgeError::malformed(TOOL_MAKE_INVOICE, format!("unexpected result shape: {err}"))
        })
    }

    /// Invoke `lookup_invoice` for a settlement token.
    pub async fn lookup_invoice(
        &self,
        remote: &RemoteIdentity,
        payment_hash: &str,
    ) -> Result<Value> {
        let response = self
            .call(
                remote,
                TOOL_LOOKUP_INVOICE,
                json!({ "payment_hash": payment_hash }),
            )
            .await?;
        response.result_payload(TOOL_LOOKUP_INVOICE)
    }

    /// Resolve the payee's declared payment parameters.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_pay_info(&self, identifier: &str) -> Result<PayeeInfo> {
        let remote = RemoteIdentity::normalize(identifier)?;
        self.get_info(&remote).await
    }

    /// Create an invoice for the LNURL callback `amount` (millisatoshis).
    ///
    /// The amount is validated for presence and positivity, checked against
    /// the payee-declared sendable band, floored to satoshis and rejected if
    /// it truncates below one satoshi.
    #[tracing::instrument(skip(self))]
    pub async fn create_invoice(&self, identifier: &str, amount: Option<&str>) -> Result<Invoice> {
        let remote = RemoteIdentity::normalize(identifier)?;
        let msats = parse_msats(amount)?;

        if self.config.enforce_sendable_bounds {
            let info = self.get_info(&remote).await?;
            let (min, max) = (info.min_sendable_msats(), info.max_sendable_msats());
            if msats < min || msats > max {
                return Err(BridgeError::invalid_amount(format!(
                    "{msats} msat is outside the payee's sendable range {min}..={max}"
                )));
            }
        }

        let sats = msats_to_sats(msats);
        if sats == 0 {
            return Err(BridgeError::invalid_amount(
                "amount is below one satoshi after conversion",
            ));
        }

        self.make_invoice(&remote, sats).await
    }

    /// Query settlement status for a previously created invoice.
    #[tracing::instrument(skip(self))]
    pub async fn lookup_payment(&self, identifier: &str, payment_hash: &str) -> Result<Value> {
        let remote = RemoteIdentity::normalize(identifier)?;
        self.lookup_invoice(&remote, payment_hash).await
    }

    /// Drain all pooled connections. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("draining pooled wallet connections");
        self.registry.close_all().await
    }
}
