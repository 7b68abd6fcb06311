//! Remote directory abstraction.
//!
//! The remote directory is the backend that persists outbound records and
//! pushes events to subscribed clients. It is consumed, not implemented, by
//! the session; [`MockDirectory`] stands in for it in tests and demos.
//!
//! # Design
//!
//! The trait mirrors a request/response store plus a live query:
//! - `subscribe()` opens a push channel for a topic
//! - `save()` persists one outbound record
//! - `find()` runs an equality query against a collection

mod mock;

pub use mock::MockDirectory;

use async_trait::async_trait;
use hangouts_types::{Hangout, InboundEvent, OutboundRecord};
use thiserror::Error;
use tokio::sync::mpsc;

/// Remote directory errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory refused to persist a record.
    #[error("save rejected: {0}")]
    SaveRejected(String),

    /// A query failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Opening the push channel failed.
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    /// No live subscription.
    #[error("not subscribed")]
    NotSubscribed,
}

/// Events delivered on a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    /// A record addressed to this user was created.
    Create(InboundEvent),
    /// A record addressed to this user was updated.
    Update(InboundEvent),
    /// A record entered the live query. Carries the peer username.
    Enter(String),
    /// A record left the live query. Carries the peer username.
    Leave(String),
}

/// A live push channel for one topic.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    events: mpsc::UnboundedReceiver<DirectoryEvent>,
}

impl Subscription {
    /// Wrap the receiving half of an event channel.
    pub fn new(topic: &str, events: mpsc::UnboundedReceiver<DirectoryEvent>) -> Self {
        Self {
            topic: topic.to_string(),
            events,
        }
    }

    /// Topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next event. Returns `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<DirectoryEvent> {
        self.events.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<DirectoryEvent> {
        self.events.try_recv().ok()
    }
}

/// Equality query against a directory collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    collection: String,
    filters: Vec<(String, String)>,
}

impl Query {
    /// Query everything in a collection.
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            filters: Vec::new(),
        }
    }

    /// Restrict to records whose `field` equals `value`.
    pub fn equal_to(mut self, field: &str, value: &str) -> Self {
        self.filters.push((field.to_string(), value.to_string()));
        self
    }

    /// Collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Field/value pairs, all of which must match.
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }
}

/// Trait for the remote directory backend.
#[async_trait]
pub trait RemoteDirectory: Send + Sync {
    /// Open a push channel for `topic`.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, DirectoryError>;

    /// Persist an outbound record into `collection`.
    ///
    /// Returns the record as stored by the directory.
    async fn save(
        &self,
        collection: &str,
        record: OutboundRecord,
    ) -> Result<OutboundRecord, DirectoryError>;

    /// Run an equality query.
    async fn find(&self, query: Query) -> Result<Vec<Hangout>, DirectoryError>;
}
