//! Answer decoding.
//!
//! Raw answers arrive as transport-agnostic text (JSON). Decode failures
//! are absorbed per receiver: the receiver is excluded from the aggregate
//! result, and the wait as a whole never fails because of one malformed
//! payload.

use crate::receiver::ReceiverId;
use serde::de::DeserializeOwned;

/// Decode a raw answer into the caller-requested type.
///
/// Returns `None` (with a warning log) on malformed payloads.
pub(crate) fn decode_answer<A: DeserializeOwned>(id: &ReceiverId, raw: &str) -> Option<A> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(receiver = %id, %err, "discarding undecodable answer");
            None
        }
    }
}
