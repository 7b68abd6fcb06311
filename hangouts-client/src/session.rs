//! Session - the main interface for hangouts.
//!
//! A [`Session`] owns everything one signed-in user needs: the durable
//! [`LocalCache`], the [`ViewState`] the UI renders, the outbound
//! [`Outbox`], the connectivity tracker and the live subscription.
//!
//! # Architecture
//!
//! The pure pieces (state machine, outbox, connectivity) live in
//! `hangouts-core`; the session interprets their output and performs the
//! storage and directory I/O.
//!
//! ```text
//! UI → Session (dispatcher) → reconciler → LocalCache + RemoteDirectory
//!                                  ↑
//! RemoteDirectory events → inbound ┘
//! ```
//!
//! Every mutation writes storage first and only then updates the view.
//!
//! # Errors
//!
//! Dispatcher methods return an error only for caller bugs (unknown verb,
//! acting on a peer that is not selected). Storage and remote failures land
//! in [`ViewState::error`] instead.

use std::time::{SystemTime, UNIX_EPOCH};

use hangouts_core::{transition, Connectivity, ConnectivityAction, Outbox};
use hangouts_types::{Command, InboundEvent, Message, PendingCommand, Peer, ReadyState};
use tracing::{debug, info, warn};

use crate::cache::LocalCache;
use crate::config::SessionConfig;
use crate::directory::{Query, RemoteDirectory, Subscription};
use crate::error::ClientError;
use crate::reconciler::optimistic_hangout;
use crate::store::KeyValueStore;
use crate::view::{ViewAction, ViewState};

/// One signed-in user's hangouts session.
pub struct Session<D: RemoteDirectory, S: KeyValueStore> {
    pub(crate) config: SessionConfig,
    pub(crate) directory: D,
    pub(crate) cache: LocalCache<S>,
    pub(crate) view: ViewState,
    pub(crate) outbox: Outbox,
    pub(crate) connectivity: Connectivity,
    pub(crate) subscription: Option<Subscription>,
    last_timestamp: u64,
}

impl<D: RemoteDirectory, S: KeyValueStore> Session<D, S> {
    /// Open a session: rehydrate the view from storage and subscribe to the
    /// configured topic.
    ///
    /// The channel starts `Closed`; report connectivity with
    /// [`set_ready_state`](Self::set_ready_state).
    pub async fn open(config: SessionConfig, directory: D, store: S) -> Result<Self, ClientError> {
        let cache = LocalCache::new(store, &config.username);
        let mut session = Self {
            config,
            directory,
            cache,
            view: ViewState::new(),
            outbox: Outbox::new(),
            connectivity: Connectivity::new(ReadyState::Closed),
            subscription: None,
            last_timestamp: 0,
        };

        let result = session.rehydrate().await;
        session.settle(result)?;
        let result = session.subscribe().await;
        session.settle(result)?;

        info!(
            "session: opened for {} ({} hangouts, {} queued offline)",
            session.config.username,
            session.view.hangouts().len(),
            session.outbox.queued_count()
        );
        Ok(session)
    }

    async fn rehydrate(&mut self) -> Result<(), ClientError> {
        let mut book = self.cache.hangouts().await?;
        let offline = self.cache.offline_hangouts().await?;
        for command in &offline {
            let states = transition(command.command);
            book.upsert(optimistic_hangout(command, states.sender_state));
            self.last_timestamp = self.last_timestamp.max(command.timestamp);
        }
        self.outbox.restore(offline);
        let unread = self.cache.unread_hangouts().await?;

        self.view.apply(ViewAction::HangoutsLoaded(book.into_vec()));
        self.view.apply(ViewAction::UnreadUpdated(unread));
        Ok(())
    }

    async fn subscribe(&mut self) -> Result<(), ClientError> {
        let subscription = self.directory.subscribe(&self.config.topic).await?;
        info!("session: subscribed to {}", subscription.topic());
        self.subscription = Some(subscription);
        Ok(())
    }

    // ===========================================
    // Accessors
    // ===========================================

    /// The view-model state.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get a reference to the directory (for testing).
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Get a reference to the cache.
    pub fn cache(&self) -> &LocalCache<S> {
        &self.cache
    }

    /// The outbound delivery tracker.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Check if a live subscription is held.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    // ===========================================
    // Connectivity
    // ===========================================

    /// Report the channel's ready state.
    ///
    /// Entering `Open` re-subscribes if needed, flushes the offline bucket and
    /// runs the unread catch-up, in that order.
    pub async fn set_ready_state(&mut self, next: ReadyState) -> Result<(), ClientError> {
        let (connectivity, actions) = self.connectivity.on_change(next);
        self.connectivity = connectivity;

        if next.is_open() && !actions.is_empty() && self.subscription.is_none() {
            let result = self.subscribe().await;
            self.settle(result)?;
        }

        for action in actions {
            match action {
                ConnectivityAction::EmitReadyState(state) => {
                    info!("session: channel {}", state);
                    self.view.apply(ViewAction::ReadyStateChanged(state));
                }
                ConnectivityAction::FlushOffline => {
                    let result = self.flush_offline().await;
                    self.settle(result)?;
                }
                ConnectivityAction::FetchUnread => {
                    let result = self.fetch_unread().await;
                    self.settle(result)?;
                }
            }
        }
        Ok(())
    }

    async fn fetch_unread(&mut self) -> Result<(), ClientError> {
        let query = Query::new(&self.config.unread_collection)
            .equal_to("target", &self.config.username);
        let hangouts = self.directory.find(query).await?;
        debug!("session: catch-up returned {} hangouts", hangouts.len());
        if hangouts.is_empty() {
            return Ok(());
        }
        self.apply_event(InboundEvent::UnreadHangouts { hangouts })
            .await
    }

    // ===========================================
    // Event pump
    // ===========================================

    /// Wait for one subscription event and apply it.
    ///
    /// Returns `false` when there is no subscription or it has closed.
    pub async fn next_event(&mut self) -> Result<bool, ClientError> {
        let event = match self.subscription.as_mut() {
            Some(subscription) => subscription.next().await,
            None => return Ok(false),
        };
        match event {
            Some(event) => {
                self.handle_directory_event(event).await?;
                Ok(true)
            }
            None => {
                warn!("session: subscription closed, real-time updates paused");
                self.subscription = None;
                Ok(false)
            }
        }
    }

    /// Apply every event already waiting on the subscription.
    ///
    /// Returns how many were applied.
    pub async fn drain_events(&mut self) -> Result<usize, ClientError> {
        let mut applied = 0;
        loop {
            let event = match self.subscription.as_mut() {
                Some(subscription) => subscription.try_next(),
                None => None,
            };
            let Some(event) = event else {
                break;
            };
            self.handle_directory_event(event).await?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Sign out: drop the subscription, forget in-flight tracking and clear
    /// the view. Durable state, including the offline bucket, is kept.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.subscription = None;
        self.set_ready_state(ReadyState::Closed).await?;
        self.outbox.clear();
        self.view.apply(ViewAction::Reset);
        info!("session: closed for {}", self.config.username);
        Ok(())
    }

    // ===========================================
    // Dispatcher
    // ===========================================

    /// Issue a command verb to the focused peer.
    ///
    /// `MESSAGE` takes its text from the compose draft and clears it.
    /// Fails with [`ClientError::PeerNotSelected`] unless `peer` is the
    /// focused conversation, and with a protocol error for an unknown verb.
    pub async fn on_hangout(&mut self, peer: &str, verb: &str) -> Result<(), ClientError> {
        let target = self
            .view
            .focused()
            .filter(|focused| focused.username == peer)
            .cloned()
            .ok_or_else(|| ClientError::PeerNotSelected(peer.to_string()))?;
        let command: Command = verb.parse()?;
        let timestamp = self.next_timestamp();

        let message = match command {
            Command::Message if !self.view.message_text().is_empty() => Some(Message::new(
                self.view.message_text(),
                &self.config.username,
                timestamp,
            )),
            _ => None,
        };

        let pending = PendingCommand {
            username: target.username,
            email: target.email,
            message,
            command,
            timestamp,
        };
        let result = self.submit(pending).await;
        if command == Command::Message {
            self.view.apply(ViewAction::MessageTextChanged(String::new()));
        }
        self.settle(result)
    }

    /// Focus a peer's conversation and mark it read.
    pub async fn on_select_hangout(&mut self, peer: &str) -> Result<(), ClientError> {
        let target = self
            .view
            .find_hangout(peer)
            .map(|h| h.peer())
            .ok_or_else(|| ClientError::UnknownPeer(peer.to_string()))?;
        self.focus(target).await
    }

    /// Focus a conversation from its unread badge and mark it read.
    pub async fn on_select_unread(&mut self, peer: &str) -> Result<(), ClientError> {
        let target = self
            .view
            .unread_hangouts()
            .iter()
            .find(|h| h.username == peer)
            .or_else(|| self.view.find_hangout(peer))
            .map(|h| h.peer())
            .ok_or_else(|| ClientError::UnknownPeer(peer.to_string()))?;
        self.focus(target).await
    }

    /// Focus a peer that may not have a hangout yet, e.g. before the first
    /// invite.
    pub async fn on_select_user(&mut self, username: &str, email: &str) -> Result<(), ClientError> {
        self.focus(Peer::new(username, email)).await
    }

    /// Dismiss a peer's unread badge without opening the conversation.
    pub async fn on_remove_unread(&mut self, peer: &str) -> Result<(), ClientError> {
        let result = match self.cache.remove_unread(peer).await {
            Ok(unread) => {
                debug!("session: dismissed unread for {}", peer);
                self.view.apply(ViewAction::UnreadUpdated(unread));
                Ok(())
            }
            Err(error) => Err(error.into()),
        };
        self.settle(result)
    }

    /// Update the compose draft.
    pub fn on_message_text(&mut self, text: &str) {
        self.view
            .apply(ViewAction::MessageTextChanged(text.to_string()));
    }

    /// Update the hangout search filter.
    pub fn on_search(&mut self, text: &str) {
        self.view.apply(ViewAction::SearchChanged(text.to_string()));
    }

    /// Dismiss the error banner.
    pub fn clear_error(&mut self) {
        self.view.apply(ViewAction::ErrorCleared);
    }

    async fn focus(&mut self, peer: Peer) -> Result<(), ClientError> {
        let result = match self.cache.mark_read(&peer.username).await {
            Ok(receipt) => {
                if let Some(hangout) = receipt.hangout {
                    self.view.apply(ViewAction::HangoutUpdated(hangout));
                }
                self.view.apply(ViewAction::Focused {
                    peer,
                    messages: receipt.messages,
                });
                self.view.apply(ViewAction::UnreadUpdated(receipt.unread));
                Ok(())
            }
            Err(error) => {
                self.view.apply(ViewAction::Focused {
                    peer,
                    messages: Vec::new(),
                });
                Err(error.into())
            }
        };
        self.settle(result)
    }

    // ===========================================
    // Helpers
    // ===========================================

    /// Route recoverable failures into the view's error slot.
    pub(crate) fn settle(&mut self, result: Result<(), ClientError>) -> Result<(), ClientError> {
        match result {
            Err(error) if error.is_recoverable() => {
                warn!("session: {}", error);
                self.view.apply(ViewAction::ErrorRaised(error.to_string()));
                Ok(())
            }
            other => other,
        }
    }

    /// Milliseconds since the epoch, strictly increasing within a session.
    fn next_timestamp(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp = timestamp;
        timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MockDirectory;
    use crate::store::MemoryStore;
    use hangouts_types::{Hangout, HangoutState, ProtocolError};

    async fn session() -> Session<MockDirectory, MemoryStore> {
        Session::open(
            SessionConfig::new("alice", "alice@x.io"),
            MockDirectory::loopback(),
            MemoryStore::new(),
        )
        .await
        .unwrap()
    }

    // ===========================================
    // Lifecycle Tests
    // ===========================================

    #[tokio::test]
    async fn open_subscribes_and_starts_closed() {
        let session = session().await;
        assert!(session.is_subscribed());
        assert_eq!(session.view().ready_state(), ReadyState::Closed);
        assert_eq!(session.directory().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn subscribe_failure_lands_in_error_slot() {
        let directory = MockDirectory::new();
        directory.fail_next_subscribe("refused");

        let mut session = Session::open(
            SessionConfig::new("alice", "alice@x.io"),
            directory,
            MemoryStore::new(),
        )
        .await
        .unwrap();

        assert!(!session.is_subscribed());
        assert_eq!(
            session.view().error(),
            Some("remote error: subscribe failed: refused")
        );

        session.set_ready_state(ReadyState::Open).await.unwrap();
        assert!(session.is_subscribed());
    }

    #[tokio::test]
    async fn reconnect_runs_unread_catch_up() {
        let mut session = session().await;
        session.set_ready_state(ReadyState::Open).await.unwrap();

        let queries = session.directory().queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].collection(), "UnreadHangout");
        assert_eq!(
            queries[0].filters(),
            &[("target".to_string(), "alice".to_string())]
        );

        // Reporting the same state again is a no-op.
        session.set_ready_state(ReadyState::Open).await.unwrap();
        assert_eq!(session.directory().queries().len(), 1);
    }

    #[tokio::test]
    async fn catch_up_results_land_as_unread() {
        let mut session = session().await;
        let carol = Hangout::new(&Peer::new("carol", "carol@x.io"), HangoutState::Inviter, 3);
        let dan = Hangout::new(&Peer::new("dan", "dan@x.io"), HangoutState::Messanger, 4)
            .with_message(Message::new("you there?", "dan", 4));
        session
            .directory()
            .queue_query_result(vec![carol, dan]);

        session.set_ready_state(ReadyState::Open).await.unwrap();

        let view = session.view();
        assert_eq!(view.hangouts().len(), 2);
        assert!(view.hangouts().iter().all(|h| h.delivered && !h.read));
        let unread: Vec<_> = view
            .unread_hangouts()
            .iter()
            .map(|h| h.username.as_str())
            .collect();
        assert_eq!(unread, vec!["carol", "dan"]);
        assert_eq!(session.cache().unread_hangouts().await.unwrap().len(), 2);

        let messages = session.cache().messages("dan").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].read);
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn failed_catch_up_goes_to_error_slot() {
        let mut session = session().await;
        session.directory().fail_next_find("backend down");

        session.set_ready_state(ReadyState::Open).await.unwrap();

        assert_eq!(
            session.view().error(),
            Some("remote error: query failed: backend down")
        );
        assert_eq!(session.view().ready_state(), ReadyState::Open);
        assert!(session.view().unread_hangouts().is_empty());
        assert!(session.directory().queries().is_empty());
    }

    #[tokio::test]
    async fn close_resets_view() {
        let mut session = session().await;
        session.on_message_text("draft");
        session.close().await.unwrap();

        assert!(!session.is_subscribed());
        assert_eq!(session.view(), &ViewState::new());
    }

    // ===========================================
    // Dispatcher Tests
    // ===========================================

    #[tokio::test]
    async fn hangout_requires_focus() {
        let mut session = session().await;
        let result = session.on_hangout("bob", "INVITE").await;
        assert!(matches!(result, Err(ClientError::PeerNotSelected(p)) if p == "bob"));

        session.on_select_user("carol", "").await.unwrap();
        let result = session.on_hangout("bob", "INVITE").await;
        assert!(matches!(result, Err(ClientError::PeerNotSelected(_))));
    }

    #[tokio::test]
    async fn unknown_verb_is_protocol_error() {
        let mut session = session().await;
        session.on_select_user("bob", "").await.unwrap();

        let result = session.on_hangout("bob", "POKE").await;
        assert!(matches!(
            result,
            Err(ClientError::Protocol(ProtocolError::UnknownCommand(v))) if v == "POKE"
        ));
        assert!(session.view().hangouts().is_empty());
    }

    #[tokio::test]
    async fn select_unknown_hangout_fails_fast() {
        let mut session = session().await;
        let result = session.on_select_hangout("ghost").await;
        assert!(matches!(result, Err(ClientError::UnknownPeer(p)) if p == "ghost"));
        assert!(session.view().focused().is_none());
    }

    #[tokio::test]
    async fn message_uses_and_clears_draft() {
        let mut session = session().await;
        session.set_ready_state(ReadyState::Open).await.unwrap();
        session.on_select_user("bob", "bob@x.io").await.unwrap();
        session.on_message_text("hello bob");

        session.on_hangout("bob", "MESSAGE").await.unwrap();

        assert_eq!(session.view().message_text(), "");
        let (_, record) = session.directory().last_saved().unwrap();
        assert_eq!(record.message.unwrap().text, "hello bob");
        assert_eq!(record.sender_state, HangoutState::Messaged);
        assert_eq!(record.target_state, HangoutState::Messanger);
    }

    #[tokio::test]
    async fn search_and_remove_unread() {
        let mut session = session().await;
        session.set_ready_state(ReadyState::Open).await.unwrap();
        let carol = Hangout::new(&Peer::new("carol", ""), HangoutState::Inviter, 5);
        session.directory().emit_create(InboundEvent::Hangout { hangout: carol });
        session.drain_events().await.unwrap();
        assert_eq!(session.view().unread_hangouts().len(), 1);

        session.on_search("car");
        assert_eq!(session.view().filtered_hangouts().len(), 1);
        session.on_search("zzz");
        assert!(session.view().filtered_hangouts().is_empty());

        session.on_remove_unread("carol").await.unwrap();
        assert!(session.view().unread_hangouts().is_empty());
        // The hangout itself stays.
        assert!(session.view().find_hangout("carol").is_some());
    }

    #[tokio::test]
    async fn storage_failure_on_select_lands_in_error_slot() {
        let store = MemoryStore::new();
        let mut session = Session::open(
            SessionConfig::new("alice", "alice@x.io"),
            MockDirectory::new(),
            store.clone(),
        )
        .await
        .unwrap();
        store
            .set(
                "alice-bob-messages",
                r#"[{"text":"hi","timestamp":1,"delivered":true,"read":false,"username":"bob"}]"#,
            )
            .await
            .unwrap();

        store.fail_next_write("quota exceeded");
        session.on_select_user("bob", "").await.unwrap();

        assert_eq!(session.view().focused_username(), Some("bob"));
        assert_eq!(
            session.view().error(),
            Some("storage error: storage unavailable: quota exceeded")
        );
        session.clear_error();
        assert!(session.view().error().is_none());
    }

    #[tokio::test]
    async fn timestamps_strictly_increase() {
        let mut session = session().await;
        let first = session.next_timestamp();
        let second = session.next_timestamp();
        let third = session.next_timestamp();
        assert!(first < second && second < third);
    }
}
