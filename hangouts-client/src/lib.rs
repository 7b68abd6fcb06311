//! # hangouts-client
//!
//! Offline-first session engine for hangouts.
//!
//! This is the library a chat UI drives. It keeps a durable per-user cache of
//! relationships and conversations, sends commands through a remote
//! directory, reconciles acknowledgements, and queues work while offline.
//!
//! ## Features
//!
//! - **Optimistic writes**: the local record reflects a command before the
//!   remote side confirms it
//! - **Offline queue**: commands issued while the channel is down are parked
//!   and re-sent on reconnect
//! - **Unread tracking**: inbound activity on unfocused conversations raises a
//!   badge until the conversation is opened
//! - **Pluggable backends**: storage and directory are traits, with in-memory,
//!   SQLite and mock implementations
//!
//! ## Example
//!
//! ```ignore
//! use hangouts_client::{MemoryStore, MockDirectory, Session, SessionConfig};
//! use hangouts_types::ReadyState;
//!
//! let config = SessionConfig::new("alice", "alice@example.com");
//! let mut session = Session::open(config, MockDirectory::new(), MemoryStore::new()).await?;
//! session.set_ready_state(ReadyState::Open).await?;
//!
//! session.on_select_user("bob", "bob@example.com").await?;
//! session.on_hangout("bob", "INVITE").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
mod inbound;
mod reconciler;
pub mod session;
pub mod store;
pub mod view;

pub use cache::LocalCache;
pub use config::SessionConfig;
pub use directory::{
    DirectoryError, DirectoryEvent, MockDirectory, Query, RemoteDirectory, Subscription,
};
pub use error::{ClientError, StorageError};
pub use session::Session;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use view::{ViewAction, ViewState};
