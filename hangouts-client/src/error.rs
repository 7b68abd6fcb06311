//! Error types for hangouts-client.

use hangouts_core::OutboxError;
use hangouts_types::ProtocolError;
use thiserror::Error;

use crate::directory::DirectoryError;

/// Storage layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage is unavailable or refused the write (e.g. quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Protocol error (unknown command verb, malformed event).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote directory error.
    #[error("remote error: {0}")]
    Remote(#[from] DirectoryError),

    /// Outbox bookkeeping went out of step.
    #[error("outbox error: {0}")]
    Outbox(#[from] OutboxError),

    /// A command was issued for a peer that is not the focused one.
    #[error("peer not selected: {0}")]
    PeerNotSelected(String),

    /// Selected a peer that has no hangout.
    #[error("unknown peer: {0}")]
    UnknownPeer(String),
}

impl ClientError {
    /// Storage and remote failures are recovered into the view's error slot;
    /// everything else is a caller bug.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ClientError::Storage(_) | ClientError::Remote(_))
    }
}
