//! Error types for the carrier messaging core.

use crate::receiver::ReceiverId;
use thiserror::Error;

/// Errors surfaced by [`Carrier`](crate::Carrier) operations.
///
/// The core has no fatal error class: unknown receivers, decode failures,
/// and timeouts are all absorbed into normal outcomes (`false`, `None`, or
/// an absent map entry). Only the failures below ever reach a caller, and
/// none of them corrupt registry or slot state.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// Builder was missing a required field or given an invalid value.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Payload serialization failed before the transport was invoked.
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying push transport reported a send failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors reported by a [`CarrierTransport`](crate::CarrierTransport)
/// implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The targeted endpoint has no live connection.
    #[error("Receiver disconnected: {0}")]
    Disconnected(ReceiverId),

    /// Send failed for a transport-specific reason.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Network I/O error from the wire layer.
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),
}
