//! # hangouts-types
//!
//! Data model shared by every hangouts crate.
//!
//! This crate provides the foundational types:
//! - [`HangoutState`], [`Command`] - The relationship protocol vocabulary
//! - [`Hangout`], [`Message`], [`PendingCommand`] - Records persisted per local user
//! - [`OutboundRecord`] - What gets saved to the remote directory
//! - [`InboundEvent`], [`ReadyState`] - What arrives from the push channel
//! - [`ProtocolError`] - Fatal protocol errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod events;
mod records;
mod state;

pub use error::ProtocolError;
pub use events::{InboundEvent, ReadyState};
pub use records::{
    Hangout, Message, MessageKind, OutboundRecord, PendingCommand, Peer, BLOCKED_NOTICE,
    BLOCKER_NOTICE,
};
pub use state::{Command, HangoutState};
