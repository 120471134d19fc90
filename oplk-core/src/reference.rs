//! Order reference generation.
//!
//! References are handed to the client, embedded in the upstream order, and
//! echoed back in webhook payloads, so they must be unique across concurrent
//! callers without consulting the store. A UUIDv7 gives a millisecond
//! timestamp plus 74 random bits; rendered in Crockford base32 it stays
//! alphanumeric, case-stable, and short enough for the gateway's 64-char
//! reference field.

use fast32::base32::CROCKFORD;
use uuid::Uuid;

/// Prefix distinguishing ledger references from gateway-assigned ids.
pub const REFERENCE_PREFIX: &str = "PL-";

/// Generate a new order reference, e.g. `PL-0633Y6GJ8QBS2RV5C8Q5Y25MPC`.
pub fn generate() -> String {
    let id = Uuid::now_v7();
    format!("{}{}", REFERENCE_PREFIX, CROCKFORD.encode_u128(id.as_u128()))
}
