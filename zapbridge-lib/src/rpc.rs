//! Wallet tool wire contract.
//!
//! The remote wallet exposes three named tools. Tool replies carry their
//! payload as a single text content block containing JSON; `make_invoice`
//! and `lookup_invoice` additionally wrap the payload in a `result` field.
//! Parsing here is defensive: any shape mismatch becomes a
//! `MalformedResponse` instead of a field-access fault further up.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BridgeError, Result};

/// Info query: payee-declared payment parameters.
pub const TOOL_GET_INFO: &str = "get_info";

/// Invoice creation: `{"amount": <sats>}`.
pub const TOOL_MAKE_INVOICE: &str = "make_invoice";

/// Settlement lookup: `{"payment_hash": <token>}`.
pub const TOOL_LOOKUP_INVOICE: &str = "lookup_invoice";

/// One content block of a tool reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block type; only `"text"` blocks carry tool payloads.
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw text payload.
    #[serde(default)]
    pub text: String,
}

impl ContentBlock {
    /// Build a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// A tool reply as delivered by the transport.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Content blocks; the first text block holds the payload.
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    /// Remote-declared tool failure.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolResponse {
    /// Build a single-text-block reply. Used by tests and mock wallets.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    /// Build a reply carrying `value` JSON-encoded in a text block.
    pub fn from_json(value: &Value) -> Self {
        Self::from_text(value.to_string())
    }

    /// Parse the first text content block as JSON.
    ///
    /// A remote-declared failure (`is_error`) surfaces as `RemoteUnavailable`
    /// with the block text as the reason; a missing block or non-JSON text is
    /// a `MalformedResponse`.
    pub fn text_payload(&self, tool: &str) -> Result<Value> {
        let block = self
            .content
            .iter()
            .find(|b| b.kind == "text")
            .ok_or_else(|| BridgeError::malformed(tool, "reply carries no text content block"))?;
        if self.is_error {
            return Err(BridgeError::RemoteUnavailable {
                operation: tool.to_string(),
                reason: if block.text.is_empty() {
                    "remote reported an unspecified tool failure".to_string()
                } else {
                    block.text.clone()
                },
            });
        }
        serde_json::from_str(&block.text)
            .map_err(|err| BridgeError::malformed(tool, format!("content is not valid JSON: {err}")))
    }

    /// Parse the text payload and extract its `result` field.
    pub fn result_payload(&self, tool: &str) -> Result<Value> {
        let payload = self.text_payload(tool)?;
        payload
            .get("result")
            .cloned()
            .ok_or_else(|| BridgeError::malformed(tool, "payload has no result field"))
    }
}

/// Payee-declared payment parameters from `get_info`.
///
/// Every field is optional on the wire; numeric bounds fall back to the
/// LNURL defaults via the accessor methods.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PayeeInfo {
    /// Minimum sendable amount in millisatoshis.
    #[serde(default, rename = "minSendable", skip_serializing_if = "Option::is_none")]
    pub min_sendable: Option<u64>,
    /// Maximum sendable amount in millisatoshis.
    #[serde(default, rename = "maxSendable", skip_serializing_if = "Option::is_none")]
    pub max_sendable: Option<u64>,
    /// Short human description of the payee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Longer free-form description.
    #[serde(default, rename = "longDescription", skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Base64 image payload.
    #[serde(default, rename = "imageData", skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl PayeeInfo {
    /// Minimum sendable amount (msat), defaulted when undeclared.
    pub fn min_sendable_msats(&self) -> u64 {
        self.min_sendable
            .unwrap_or(crate::amount::DEFAULT_MIN_SENDABLE_MSATS)
    }

    /// Maximum sendable amount (msat), defaulted when undeclared.
    pub fn max_sendable_msats(&self) -> u64 {
        self.max_sendable
            .unwrap_or(crate::amount::DEFAULT_MAX_SENDABLE_MSATS)
    }
}

/// A freshly created invoice plus its settlement-lookup token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Serialized payment request (bolt11). Opaque to the bridge.
    pub invoice: String,
    /// Settlement token for later lookup. Opaque to the bridge.
    pub payment_hash: String,
}
