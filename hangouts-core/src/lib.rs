//! # hangouts-core
//!
//! Pure logic for the hangouts sync engine (no I/O, instant tests).
//!
//! This crate implements the relationship state machine, the peer-keyed
//! hangout book, the outbound delivery lifecycle and the connectivity
//! transitions without any storage or network access.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. The session in `hangouts-client` performs the actual
//! storage and directory I/O by interpreting what these modules return.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book;
pub mod outbox;
pub mod readiness;
pub mod transition;
pub mod unread;

pub use book::HangoutBook;
pub use outbox::{DeliveryStatus, Outbox, OutboxError, Route};
pub use readiness::{Connectivity, ConnectivityAction};
pub use transition::{transition, transition_verb, Transition};
pub use unread::{remove_peer, should_track, tracks_unread};
