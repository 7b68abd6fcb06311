//! Outbound path: optimistic write, online/offline dispatch, acknowledgement
//! merge and the offline flush.

use hangouts_core::{transition, Route, Transition};
use hangouts_types::{Hangout, HangoutState, Message, OutboundRecord, PendingCommand};
use tracing::{debug, info, warn};

use crate::directory::RemoteDirectory;
use crate::error::ClientError;
use crate::session::Session;
use crate::store::KeyValueStore;
use crate::view::ViewAction;

/// The sender's record as it should look before confirmation.
pub(crate) fn optimistic_hangout(command: &PendingCommand, state: HangoutState) -> Hangout {
    Hangout {
        message: command.message.clone(),
        read: true,
        ..Hangout::new(&command.peer(), state, command.timestamp)
    }
}

impl<D: RemoteDirectory, S: KeyValueStore> Session<D, S> {
    /// Write the optimistic record, then send or park the command.
    pub(crate) async fn submit(&mut self, command: PendingCommand) -> Result<(), ClientError> {
        let states = transition(command.command);
        let optimistic = optimistic_hangout(&command, states.sender_state);
        // A peer with commands still queued keeps queueing, so nothing overtakes them.
        let behind_queue = self.outbox.has_queued(&command.username);
        let online = self.connectivity.is_open() && !behind_queue;
        let was_blocked = self
            .view
            .find_hangout(&command.username)
            .is_some_and(|h| h.state == HangoutState::Blocked);

        if online {
            self.cache.upsert_hangout(optimistic.clone()).await?;
        } else {
            self.cache.queue_offline(&command).await?;
        }
        let route = self.outbox.submit(command.clone(), online);
        self.view.apply(ViewAction::HangoutUpdated(optimistic));

        if states.sender_state == HangoutState::Blocked && !was_blocked {
            self.append_blocked_notice(&command.username, command.timestamp)
                .await?;
        }

        match route {
            Route::Online => {
                let record = self.outbound_record(&command, states, false);
                if let Err(error) = self
                    .directory
                    .save(&self.config.hangout_collection, record)
                    .await
                {
                    self.outbox.reject(command.timestamp)?;
                    return Err(error.into());
                }
                debug!(
                    "reconciler: sent {} to {}",
                    command.command, command.username
                );
            }
            Route::Offline if self.connectivity.is_open() => {
                debug!(
                    "reconciler: {} to {} waits behind queued commands",
                    command.command, command.username
                );
                self.flush_offline().await?;
            }
            Route::Offline => {
                debug!(
                    "reconciler: parked {} to {} until reconnect",
                    command.command, command.username
                );
            }
        }
        Ok(())
    }

    /// Merge an acknowledgement for a locally issued command.
    ///
    /// `offline` carries the command timestamp when the acknowledgement is for
    /// a resent offline command; its bucket entry is removed as well.
    pub(crate) async fn on_delivered(
        &mut self,
        hangout: Hangout,
        offline: Option<u64>,
    ) -> Result<(), ClientError> {
        let tracked = match offline {
            Some(timestamp) => self.outbox.acknowledge_offline(timestamp),
            None => self.outbox.acknowledge(&hangout.username),
        };
        if tracked.is_none() {
            debug!(
                "reconciler: acknowledgement for {} matches nothing in flight",
                hangout.username
            );
        }

        let book = self.cache.hangouts().await?;
        let existing = book.get(&hangout.username);
        let read = existing.map_or(true, |h| h.read);
        let was_blocked = existing.is_some_and(|h| h.state == HangoutState::Blocked);

        let merged = Hangout {
            delivered: true,
            read,
            ..hangout
        };
        self.cache.upsert_hangout(merged.clone()).await?;
        self.view.apply(ViewAction::HangoutUpdated(merged.clone()));

        // Commands issued here already appended the notice on submit.
        if tracked.is_none() && merged.state == HangoutState::Blocked && !was_blocked {
            self.append_blocked_notice(&merged.username, merged.timestamp)
                .await?;
        }

        if let Some(message) = merged.message.clone().filter(|m| !m.text.is_empty()) {
            let message = Message {
                delivered: true,
                read: true,
                ..message
            };
            let is_blocker = merged.state == HangoutState::Blocker;
            let messages = self
                .cache
                .append_message(&merged.username, message, is_blocker)
                .await?;
            self.view.apply(ViewAction::MessagesUpdated {
                peer: merged.username.clone(),
                messages,
            });
        }

        if let Some(timestamp) = offline {
            self.cache.remove_offline(timestamp).await?;
        }
        if let Some(command) = tracked {
            self.outbox.cached(command.timestamp)?;
        }
        Ok(())
    }

    /// Re-send every command in the offline bucket, oldest first.
    ///
    /// Stored commands the outbox lost track of (after `close`, or a failed
    /// rehydrate) are picked up again. Stops at the first rejection; that
    /// command and everything after it stay queued.
    pub(crate) async fn flush_offline(&mut self) -> Result<(), ClientError> {
        let stored = self.cache.offline_hangouts().await?;
        self.outbox.restore(stored);

        let queued = self.outbox.queued();
        if queued.is_empty() {
            return Ok(());
        }
        let total = queued.len();
        info!("reconciler: flushing {} offline commands", total);

        for (sent, command) in queued.into_iter().enumerate() {
            let states = transition(command.command);
            let record = self.outbound_record(&command, states, true);

            self.outbox.resending(command.timestamp)?;
            if let Err(error) = self
                .directory
                .save(&self.config.hangout_collection, record)
                .await
            {
                self.outbox.resend_failed(command.timestamp)?;
                warn!(
                    "reconciler: flush stopped after {} of {} commands",
                    sent, total
                );
                return Err(error.into());
            }
            self.outbox.resent(command.timestamp)?;

            // Online bucket first: a crash before the removal resends, never loses.
            let optimistic = optimistic_hangout(&command, states.sender_state);
            self.cache.upsert_hangout(optimistic.clone()).await?;
            self.cache.remove_offline(command.timestamp).await?;
            self.view.apply(ViewAction::HangoutUpdated(optimistic));
        }

        info!("reconciler: flushed {} offline commands", total);
        Ok(())
    }

    fn outbound_record(
        &self,
        command: &PendingCommand,
        states: Transition,
        offline: bool,
    ) -> OutboundRecord {
        OutboundRecord {
            sender: self.config.local_peer(),
            target: command.peer(),
            command: command.command,
            sender_state: states.sender_state,
            target_state: states.target_state,
            message: command.message.clone(),
            timestamp: command.timestamp,
            offline,
        }
    }

    async fn append_blocked_notice(&mut self, peer: &str, timestamp: u64) -> Result<(), ClientError> {
        let notice = Message::blocked_notice(&self.config.username, timestamp);
        let messages = self.cache.append_message(peer, notice, false).await?;
        self.view.apply(ViewAction::MessagesUpdated {
            peer: peer.to_string(),
            messages,
        });
        Ok(())
    }
}
