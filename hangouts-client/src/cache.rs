//! Durable per-user cache of hangouts, conversations, unread badges and the
//! offline bucket.
//!
//! `LocalCache` is the only component that touches storage keys. Every list is
//! stored as a JSON array under a key namespaced by the local username:
//!
//! ```text
//! {user}-hangouts                 relationship list
//! {user}-{peer}-messages          conversation with one peer
//! {user}-unread-hangouts          unread badges
//! {user}-offline-hangouts         commands issued while offline
//! {user}-{peer}-offline-messages  messages issued while offline
//! ```

use hangouts_core::{remove_peer, should_track, HangoutBook};
use hangouts_types::{Hangout, Message, PendingCommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::StorageError;
use crate::store::KeyValueStore;

/// Storage key grammar.
pub mod keys {
    /// Relationship list.
    pub fn hangouts(user: &str) -> String {
        format!("{}-hangouts", user)
    }

    /// Conversation with one peer.
    pub fn messages(user: &str, peer: &str) -> String {
        format!("{}-{}-messages", user, peer)
    }

    /// Unread badges.
    pub fn unread_hangouts(user: &str) -> String {
        format!("{}-unread-hangouts", user)
    }

    /// Commands issued while offline.
    pub fn offline_hangouts(user: &str) -> String {
        format!("{}-offline-hangouts", user)
    }

    /// Messages issued while offline to one peer.
    pub fn offline_messages(user: &str, peer: &str) -> String {
        format!("{}-{}-offline-messages", user, peer)
    }
}

/// Result of marking a conversation read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    /// The peer's hangout after the update, if one is stored.
    pub hangout: Option<Hangout>,
    /// The conversation after the update.
    pub messages: Vec<Message>,
    /// The unread list after the peer was removed.
    pub unread: Vec<Hangout>,
}

/// Durable cache for one local user.
pub struct LocalCache<S: KeyValueStore> {
    store: S,
    user: String,
}

impl<S: KeyValueStore> LocalCache<S> {
    /// Create a cache for `user` over a store.
    pub fn new(store: S, user: &str) -> Self {
        Self {
            store,
            user: user.to_string(),
        }
    }

    /// The local username this cache is namespaced by.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Get a reference to the underlying store (for testing).
    pub fn store(&self) -> &S {
        &self.store
    }

    // ===========================================
    // Hangouts
    // ===========================================

    /// Load the relationship list.
    pub async fn hangouts(&self) -> Result<HangoutBook, StorageError> {
        let stored: Vec<Hangout> = self.read(&keys::hangouts(&self.user)).await?;
        Ok(HangoutBook::from_vec(stored))
    }

    /// Replace the peer's hangout if present, else append it.
    ///
    /// Returns the record that was replaced.
    pub async fn upsert_hangout(&self, hangout: Hangout) -> Result<Option<Hangout>, StorageError> {
        let mut book = self.hangouts().await?;
        debug!(
            "cache: upsert {} -> {} (delivered: {})",
            hangout.username, hangout.state, hangout.delivered
        );
        let previous = book.upsert(hangout);
        self.write(&keys::hangouts(&self.user), &book.into_vec())
            .await?;
        Ok(previous)
    }

    // ===========================================
    // Messages
    // ===========================================

    /// Load the conversation with a peer.
    pub async fn messages(&self, peer: &str) -> Result<Vec<Message>, StorageError> {
        self.read(&keys::messages(&self.user, peer)).await
    }

    /// Append a message to a conversation.
    ///
    /// When `is_blocker` is set the peer has blocked the local user, and a
    /// local blocker notice is appended right after the message.
    ///
    /// Returns the conversation after the append.
    pub async fn append_message(
        &self,
        peer: &str,
        message: Message,
        is_blocker: bool,
    ) -> Result<Vec<Message>, StorageError> {
        let key = keys::messages(&self.user, peer);
        let mut messages: Vec<Message> = self.read(&key).await?;
        let timestamp = message.timestamp;
        messages.push(message);
        if is_blocker {
            messages.push(Message::blocker_notice(&self.user, timestamp));
        }
        debug!("cache: {} now holds {} messages", key, messages.len());
        self.write(&key, &messages).await?;
        Ok(messages)
    }

    /// Mark a conversation read.
    ///
    /// Sets the hangout's `read` flag, rewrites every stored message as read,
    /// and removes the peer from the unread list.
    pub async fn mark_read(&self, peer: &str) -> Result<ReadReceipt, StorageError> {
        let mut book = self.hangouts().await?;
        let hangout = book.get_mut(peer).map(|hangout| {
            hangout.read = true;
            hangout.clone()
        });
        if hangout.is_some() {
            self.write(&keys::hangouts(&self.user), &book.into_vec())
                .await?;
        }

        let key = keys::messages(&self.user, peer);
        let mut messages: Vec<Message> = self.read(&key).await?;
        if messages.iter().any(|m| !m.read) {
            for message in messages.iter_mut() {
                message.read = true;
            }
            self.write(&key, &messages).await?;
        }

        let unread = self.remove_unread(peer).await?;
        debug!("cache: marked {} read", peer);

        Ok(ReadReceipt {
            hangout,
            messages,
            unread,
        })
    }

    // ===========================================
    // Unread
    // ===========================================

    /// Load the unread list.
    pub async fn unread_hangouts(&self) -> Result<Vec<Hangout>, StorageError> {
        self.read(&keys::unread_hangouts(&self.user)).await
    }

    /// Append to the unread list when the hangout's state raises a badge and
    /// its conversation is not the focused one.
    ///
    /// Returns the new list if an entry was appended.
    pub async fn track_unread(
        &self,
        hangout: &Hangout,
        focused: Option<&str>,
    ) -> Result<Option<Vec<Hangout>>, StorageError> {
        if !should_track(hangout, focused) {
            return Ok(None);
        }

        let key = keys::unread_hangouts(&self.user);
        let mut unread: Vec<Hangout> = self.read(&key).await?;
        unread.push(Hangout {
            read: false,
            ..hangout.clone()
        });
        debug!("cache: {} unread for {}", hangout.username, self.user);
        self.write(&key, &unread).await?;
        Ok(Some(unread))
    }

    /// Remove every unread entry for a peer.
    ///
    /// The unread key is deleted once the list is empty. Returns the list
    /// after removal.
    pub async fn remove_unread(&self, peer: &str) -> Result<Vec<Hangout>, StorageError> {
        let key = keys::unread_hangouts(&self.user);
        let mut unread: Vec<Hangout> = self.read(&key).await?;
        if remove_peer(&mut unread, peer) > 0 {
            self.write_or_remove(&key, &unread).await?;
        }
        Ok(unread)
    }

    // ===========================================
    // Offline bucket
    // ===========================================

    /// Load commands issued while offline, oldest first.
    pub async fn offline_hangouts(&self) -> Result<Vec<PendingCommand>, StorageError> {
        self.read(&keys::offline_hangouts(&self.user)).await
    }

    /// Load messages issued to a peer while offline.
    pub async fn offline_messages(&self, peer: &str) -> Result<Vec<Message>, StorageError> {
        self.read(&keys::offline_messages(&self.user, peer)).await
    }

    /// Park a command (and its message) in the offline bucket.
    pub async fn queue_offline(&self, command: &PendingCommand) -> Result<(), StorageError> {
        let key = keys::offline_hangouts(&self.user);
        let mut queued: Vec<PendingCommand> = self.read(&key).await?;
        queued.push(command.clone());
        self.write(&key, &queued).await?;

        if let Some(message) = &command.message {
            let key = keys::offline_messages(&self.user, &command.username);
            let mut messages: Vec<Message> = self.read(&key).await?;
            messages.push(message.clone());
            self.write(&key, &messages).await?;
        }

        debug!(
            "cache: queued {} for {} offline ({} waiting)",
            command.command,
            command.username,
            queued.len()
        );
        Ok(())
    }

    /// Remove a command (and its message) from the offline bucket by
    /// timestamp. Keys are deleted once their list is empty.
    ///
    /// Returns the removed command; removing an unknown timestamp is a no-op.
    pub async fn remove_offline(
        &self,
        timestamp: u64,
    ) -> Result<Option<PendingCommand>, StorageError> {
        let key = keys::offline_hangouts(&self.user);
        let mut queued: Vec<PendingCommand> = self.read(&key).await?;
        let Some(index) = queued.iter().position(|c| c.timestamp == timestamp) else {
            return Ok(None);
        };
        let removed = queued.remove(index);
        self.write_or_remove(&key, &queued).await?;

        let key = keys::offline_messages(&self.user, &removed.username);
        let mut messages: Vec<Message> = self.read(&key).await?;
        let before = messages.len();
        messages.retain(|m| m.timestamp != timestamp);
        if messages.len() != before {
            self.write_or_remove(&key, &messages).await?;
        }

        Ok(Some(removed))
    }

    // ===========================================
    // Encoding
    // ===========================================

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write<T: Serialize + Sync>(&self, key: &str, values: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(values)?;
        self.store.set(key, &raw).await
    }

    async fn write_or_remove<T: Serialize + Sync>(
        &self,
        key: &str,
        values: &[T],
    ) -> Result<(), StorageError> {
        if values.is_empty() {
            self.store.remove(key).await
        } else {
            self.write(key, values).await
        }
    }
}
