//! Amount translation between LNURL millisatoshis and wallet satoshis.
//!
//! LNURL quotes amounts in millisatoshis; the wallet tools take whole
//! satoshis. Conversion floors, so anything below 1000 msat truncates to
//! zero satoshis and must be rejected by the caller.

use crate::{BridgeError, Result};

/// Millisatoshis per satoshi.
pub const MSATS_PER_SAT: u64 = 1000;

/// Default minimum sendable amount (msat) when the payee declares none.
pub const DEFAULT_MIN_SENDABLE_MSATS: u64 = 1_000;

/// Default maximum sendable amount (msat) when the payee declares none.
pub const DEFAULT_MAX_SENDABLE_MSATS: u64 = 100_000_000;

/// Convert millisatoshis to whole satoshis, flooring.
pub fn msats_to_sats(msats: u64) -> u64 {
    msats / MSATS_PER_SAT
}

/// Parse the LNURL callback `amount` parameter.
///
/// Rejects a missing, non-numeric or zero value as `InvalidAmount`.
pub fn parse_msats(raw: Option<&str>) -> Result<u64> {
    let raw = raw.ok_or_else(|| BridgeError::invalid_amount("amount parameter is required"))?;
    let msats: u64 = raw.trim().parse().map_err(|_| {
        BridgeError::invalid_amount(format!("'{raw}' is not a positive integer"))
    })?;
    if msats == 0 {
        return Err(BridgeError::invalid_amount("amount must be at least 1 msat"));
    }
    Ok(msats)
}
