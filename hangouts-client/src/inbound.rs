//! Inbound path: applies directory events to the cache and drives unread
//! tracking.

use hangouts_types::{Hangout, InboundEvent, Message};
use tracing::debug;

use crate::directory::{DirectoryEvent, RemoteDirectory};
use crate::error::ClientError;
use crate::session::Session;
use crate::store::KeyValueStore;
use crate::view::ViewAction;

impl<D: RemoteDirectory, S: KeyValueStore> Session<D, S> {
    /// Apply a raw JSON event payload as if it arrived on the subscription.
    ///
    /// A payload that does not decode is a protocol error.
    pub async fn handle_payload(&mut self, payload: &str) -> Result<(), ClientError> {
        let event = InboundEvent::from_json(payload)?;
        let result = self.apply_event(event).await;
        self.settle(result)
    }

    pub(crate) async fn handle_directory_event(
        &mut self,
        event: DirectoryEvent,
    ) -> Result<(), ClientError> {
        match event {
            DirectoryEvent::Create(event) | DirectoryEvent::Update(event) => {
                let result = self.apply_event(event).await;
                self.settle(result)
            }
            DirectoryEvent::Enter(peer) => {
                debug!("inbound: {} entered the live query", peer);
                Ok(())
            }
            DirectoryEvent::Leave(peer) => {
                debug!("inbound: {} left the live query", peer);
                Ok(())
            }
        }
    }

    pub(crate) async fn apply_event(&mut self, event: InboundEvent) -> Result<(), ClientError> {
        debug!("inbound: {}", event.kind());
        event.validate()?;
        match event {
            InboundEvent::Acknowledgement { hangout } => self.on_delivered(hangout, None).await,
            InboundEvent::OfflineAcknowledgement { hangout } => {
                let timestamp = hangout.timestamp;
                self.on_delivered(hangout, Some(timestamp)).await
            }
            InboundEvent::Hangout { hangout } => self.on_peer_hangout(hangout).await,
            InboundEvent::UnreadHangouts { hangouts } => {
                for hangout in hangouts {
                    self.on_peer_hangout(hangout).await?;
                }
                Ok(())
            }
        }
    }

    /// A peer acted on the relationship.
    async fn on_peer_hangout(&mut self, hangout: Hangout) -> Result<(), ClientError> {
        let book = self.cache.hangouts().await?;
        if book
            .get(&hangout.username)
            .is_some_and(|h| h.state == hangout.state && h.timestamp == hangout.timestamp)
        {
            debug!("inbound: {} already applied", hangout.username);
            return Ok(());
        }

        let peer = hangout.username.clone();
        let incoming = Hangout {
            delivered: true,
            read: false,
            ..hangout
        };
        self.cache.upsert_hangout(incoming.clone()).await?;
        self.view.apply(ViewAction::HangoutUpdated(incoming.clone()));

        if let Some(message) = incoming.message.clone().filter(|m| !m.text.is_empty()) {
            let message = Message {
                delivered: true,
                read: false,
                ..message
            };
            let messages = self.cache.append_message(&peer, message, false).await?;
            self.view.apply(ViewAction::MessagesUpdated {
                peer: peer.clone(),
                messages,
            });
        }

        let focused = self.view.focused_username().map(str::to_string);
        if focused.as_deref() == Some(peer.as_str()) {
            let receipt = self.cache.mark_read(&peer).await?;
            if let Some(hangout) = receipt.hangout {
                self.view.apply(ViewAction::HangoutUpdated(hangout));
            }
            self.view.apply(ViewAction::MessagesUpdated {
                peer,
                messages: receipt.messages,
            });
            self.view.apply(ViewAction::UnreadUpdated(receipt.unread));
        } else if let Some(unread) = self
            .cache
            .track_unread(&incoming, focused.as_deref())
            .await?
        {
            self.view.apply(ViewAction::UnreadUpdated(unread));
        }
        Ok(())
    }
}
