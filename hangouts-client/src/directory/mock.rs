//! Mock directory for testing.
//!
//! Records saved outbound records, serves queued query results, and lets a
//! test push events into live subscriptions.

use super::{DirectoryError, DirectoryEvent, Query, RemoteDirectory, Subscription};
use async_trait::async_trait;
use hangouts_types::{Hangout, InboundEvent, OutboundRecord};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock directory for testing.
///
/// In loopback mode every accepted save is answered on all live
/// subscriptions with the matching acknowledgement, which is enough to drive
/// a session end to end without a backend.
#[derive(Debug, Default)]
pub struct MockDirectory {
    inner: Arc<Mutex<MockDirectoryInner>>,
}

#[derive(Debug, Default)]
struct MockDirectoryInner {
    loopback: bool,
    saved: Vec<(String, OutboundRecord)>,
    queries: Vec<Query>,
    query_results: VecDeque<Vec<Hangout>>,
    subscribers: Vec<mpsc::UnboundedSender<DirectoryEvent>>,
    fail_next_save: Option<String>,
    fail_next_find: Option<String>,
    fail_next_subscribe: Option<String>,
}

impl MockDirectory {
    /// Create a new mock directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock directory that acknowledges every save.
    pub fn loopback() -> Self {
        let directory = Self::default();
        directory.inner.lock().unwrap().loopback = true;
        directory
    }

    /// Get all records that were saved, in order.
    pub fn saved_records(&self) -> Vec<OutboundRecord> {
        let inner = self.inner.lock().unwrap();
        inner.saved.iter().map(|(_, r)| r.clone()).collect()
    }

    /// Get the last record that was saved, with its collection.
    pub fn last_saved(&self) -> Option<(String, OutboundRecord)> {
        let inner = self.inner.lock().unwrap();
        inner.saved.last().cloned()
    }

    /// Queue a result for the next `find()` call.
    pub fn queue_query_result(&self, hangouts: Vec<Hangout>) {
        let mut inner = self.inner.lock().unwrap();
        inner.query_results.push_back(hangouts);
    }

    /// Get all queries that were run.
    pub fn queries(&self) -> Vec<Query> {
        let inner = self.inner.lock().unwrap();
        inner.queries.clone()
    }

    /// Push an event to every live subscription.
    ///
    /// Returns how many subscriptions received it.
    pub fn emit(&self, event: DirectoryEvent) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        inner.subscribers.len()
    }

    /// Push a created-record event to every live subscription.
    pub fn emit_create(&self, event: InboundEvent) -> usize {
        self.emit(DirectoryEvent::Create(event))
    }

    /// Number of subscriptions still listening.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    /// Cause the next save() to fail with the given error.
    pub fn fail_next_save(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_save = Some(error.to_string());
    }

    /// Cause the next find() to fail with the given error.
    pub fn fail_next_find(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_find = Some(error.to_string());
    }

    /// Cause the next subscribe() to fail with the given error.
    pub fn fail_next_subscribe(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_subscribe = Some(error.to_string());
    }
}

impl Clone for MockDirectory {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RemoteDirectory for MockDirectory {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, DirectoryError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_subscribe.take() {
            return Err(DirectoryError::SubscribeFailed(error));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        inner.subscribers.push(tx);
        Ok(Subscription::new(topic, rx))
    }

    async fn save(
        &self,
        collection: &str,
        record: OutboundRecord,
    ) -> Result<OutboundRecord, DirectoryError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_save.take() {
            return Err(DirectoryError::SaveRejected(error));
        }

        inner.saved.push((collection.to_string(), record.clone()));

        if inner.loopback {
            let hangout = record.sender_hangout();
            let event = if record.offline {
                InboundEvent::OfflineAcknowledgement { hangout }
            } else {
                InboundEvent::Acknowledgement { hangout }
            };
            inner
                .subscribers
                .retain(|tx| tx.send(DirectoryEvent::Create(event.clone())).is_ok());
        }

        Ok(record)
    }

    async fn find(&self, query: Query) -> Result<Vec<Hangout>, DirectoryError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_find.take() {
            return Err(DirectoryError::QueryFailed(error));
        }

        inner.queries.push(query);
        Ok(inner.query_results.pop_front().unwrap_or_default())
    }
}
