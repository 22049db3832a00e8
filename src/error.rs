//! Presence error taxonomy.
//!
//! None of these are fatal. The session logs the code, drops the offending
//! message or operation, and keeps the registry usable.

use crate::identity::ClientId;
use crate::protocol::DecodeError;

/// Grepable error code for structured log lines.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// The transport failed its readiness check; the outbound event is dropped.
    #[error("transport unavailable")]
    TransportUnavailable,
    /// An inbound payload could not be decoded; the message is dropped.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    /// An operation addressed a peer the registry is not tracking.
    #[error("unknown peer: {0}")]
    UnknownPeer(ClientId),
}

impl ErrorCode for PresenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TransportUnavailable => "E_TRANSPORT_UNAVAILABLE",
            Self::Decode(_) => "E_DECODE",
            Self::UnknownPeer(_) => "E_UNKNOWN_PEER",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::TransportUnavailable)
    }
}
