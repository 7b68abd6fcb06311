//! Error types for the hangouts protocol.

use thiserror::Error;

use crate::HangoutState;

/// Protocol errors.
///
/// These indicate a caller bug or a peer speaking a different protocol and
/// are never recovered locally.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Command verb outside the relationship protocol.
    #[error("unknown command verb: {0}")]
    UnknownCommand(String),

    /// State name outside the enumerated set.
    #[error("unknown hangout state: {0}")]
    UnknownState(String),

    /// Event payload could not be decoded.
    #[error("malformed event: {0}")]
    MalformedEvent(#[source] serde_json::Error),

    /// Event kind carries a state from the wrong side of the relationship.
    #[error("{kind} event cannot carry state {state}")]
    UnexpectedState {
        /// Event kind, as on the wire.
        kind: &'static str,
        /// The offending state.
        state: HangoutState,
    },
}
