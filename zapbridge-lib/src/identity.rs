//! Remote identity normalization.
//!
//! A payee is addressed by a 32-byte public key. Two textual encodings are
//! accepted on the wire: the bech32 `npub1…` form and raw hex. Everything
//! downstream (registry keys, tool calls, log fields) uses the canonical raw
//! hex form produced here.

use nostr_sdk::prelude::FromBech32;
use nostr_sdk::PublicKey;
use serde::{Deserialize, Serialize};

use crate::{BridgeError, Result};

/// Bech32 human-readable prefix for public keys.
pub const NPUB_PREFIX: &str = "npub1";

/// Canonical identity of a remote wallet (raw hex public key).
///
/// Construct via [`RemoteIdentity::normalize`] for user-supplied input.
/// Normalization is pure: any accepted encoding of one key yields exactly one
/// canonical value, and malformed bech32 fails instead of passing through.
/// Raw hex input is passed through unchanged; an unparseable hex key is only
/// rejected later, when the transport attempts to connect to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteIdentity(String);

impl RemoteIdentity {
    /// Wrap an already-canonical hex key.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Normalize a user-supplied identifier into a canonical identity.
    ///
    /// `npub1…` input is bech32-decoded; anything else is treated as raw hex
    /// and passed through after trimming.
    pub fn normalize(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::invalid_identity("identifier is empty"));
        }
        if trimmed.starts_with(NPUB_PREFIX) {
            let key = PublicKey::from_bech32(trimmed).map_err(|err| {
                BridgeError::invalid_identity(format!("bad bech32 public key: {err}"))
            })?;
            return Ok(Self(key.to_hex()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Canonical hex form.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RemoteIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Key pair from the NIP-19 test vectors.
    const HEX: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";
    const NPUB: &str = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";

    #[test]
    fn test_npub_and_hex_normalize_identically() {
        let from_npub = RemoteIdentity::normalize(NPUB).unwrap();
        let from_hex = RemoteIdentity::normalize(HEX).unwrap();
        assert_eq!(from_npub, from_hex);
        assert_eq!(from_npub.as_hex(), HEX);
    }

    #[test]
    fn test_malformed_npub_is_rejected() {
        let err = RemoteIdentity::normalize("npub1notarealkey").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidIdentity { .. }));
    }

    #[test]
    fn test_raw_hex_passes_through() {
        let id = RemoteIdentity::normalize(HEX).unwrap();
        assert_eq!(id.as_hex(), HEX);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let id = RemoteIdentity::normalize(&format!("  {NPUB}\n")).unwrap();
        assert_eq!(id.as_hex(), HEX);
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert!(matches!(
            RemoteIdentity::normalize("   "),
            Err(BridgeError::InvalidIdentity { .. })
        ));
    }
}
