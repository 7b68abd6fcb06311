//! Records persisted per local user and saved to the remote directory.

use serde::{Deserialize, Serialize};

use crate::{Command, HangoutState};

/// Text of the local notice appended when a message bounces off a block.
pub const BLOCKER_NOTICE: &str = "You can not send this message because you are blocked.";

/// Text of the local notice appended when the local user blocks a peer.
pub const BLOCKED_NOTICE: &str = "you blocked this user";

/// A peer identity as known to the local user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    /// Peer username (the hangout key).
    pub username: String,
    /// Peer email.
    pub email: String,
}

impl Peer {
    /// Create a new peer.
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
        }
    }
}

/// Kind of a conversation entry.
///
/// Everything except [`MessageKind::Text`] is generated locally and never
/// transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A regular text message.
    #[default]
    Text,
    /// The peer has blocked the local user.
    Blocker,
    /// The local user has blocked the peer.
    Blocked,
}

impl MessageKind {
    fn is_text(&self) -> bool {
        matches!(self, MessageKind::Text)
    }
}

/// A single conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body.
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Confirmed by the remote side.
    pub delivered: bool,
    /// Seen by the local user.
    pub read: bool,
    /// Username of the sender.
    pub username: String,
    /// Entry kind; absent on the wire for regular text.
    #[serde(rename = "type", default, skip_serializing_if = "MessageKind::is_text")]
    pub kind: MessageKind,
}

impl Message {
    /// Create an undelivered, unread text message.
    pub fn new(text: &str, username: &str, timestamp: u64) -> Self {
        Self {
            text: text.to_string(),
            timestamp,
            delivered: false,
            read: false,
            username: username.to_string(),
            kind: MessageKind::Text,
        }
    }

    /// Local notice that the peer has blocked the local user.
    pub fn blocker_notice(username: &str, timestamp: u64) -> Self {
        Self {
            kind: MessageKind::Blocker,
            ..Self::new(BLOCKER_NOTICE, username, timestamp)
        }
    }

    /// Local notice that the local user has blocked the peer.
    pub fn blocked_notice(username: &str, timestamp: u64) -> Self {
        Self {
            kind: MessageKind::Blocked,
            ..Self::new(BLOCKED_NOTICE, username, timestamp)
        }
    }

    /// True for entries that never leave this device.
    pub fn is_local(&self) -> bool {
        !self.kind.is_text()
    }
}

/// A directed relationship record between the local user and one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hangout {
    /// Peer username (the record key).
    pub username: String,
    /// Peer email.
    pub email: String,
    /// Current relationship state.
    pub state: HangoutState,
    /// Message carried by the latest action, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Confirmed by the remote side.
    pub delivered: bool,
    /// Seen by the local user.
    pub read: bool,
}

impl Hangout {
    /// Create an undelivered, unread hangout with the given peer.
    pub fn new(peer: &Peer, state: HangoutState, timestamp: u64) -> Self {
        Self {
            username: peer.username.clone(),
            email: peer.email.clone(),
            state,
            message: None,
            timestamp,
            delivered: false,
            read: false,
        }
    }

    /// Attach a message.
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// The peer this hangout is with.
    pub fn peer(&self) -> Peer {
        Peer::new(&self.username, &self.email)
    }

    /// True when the hangout carries a non-empty message.
    pub fn has_message(&self) -> bool {
        self.message.as_ref().is_some_and(|m| !m.text.is_empty())
    }
}

/// An outgoing intention not yet confirmed by the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommand {
    /// Target peer username.
    pub username: String,
    /// Target peer email.
    pub email: String,
    /// Message carried by the command, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Raw command verb.
    pub command: Command,
    /// Milliseconds since the Unix epoch; unique within a session.
    pub timestamp: u64,
}

impl PendingCommand {
    /// The peer this command is addressed to.
    pub fn peer(&self) -> Peer {
        Peer::new(&self.username, &self.email)
    }
}

/// The record saved to the remote directory for one command.
///
/// Carries both sides of the transition so the directory can write the
/// sender's acknowledgement and the target's hangout without knowing the
/// protocol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRecord {
    /// Issuer of the command.
    pub sender: Peer,
    /// Recipient of the command.
    pub target: Peer,
    /// Raw command verb.
    pub command: Command,
    /// State written into the sender's record.
    pub sender_state: HangoutState,
    /// State written into the target's record.
    pub target_state: HangoutState,
    /// Message carried by the command, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Milliseconds since the Unix epoch, as stamped by the sender.
    pub timestamp: u64,
    /// True when this record is a resend of an offline-queued command.
    #[serde(default)]
    pub offline: bool,
}

impl OutboundRecord {
    /// The hangout the sender should hold once this record is acknowledged.
    pub fn sender_hangout(&self) -> Hangout {
        Hangout {
            message: self.message.clone(),
            ..Hangout::new(&self.target, self.sender_state, self.timestamp)
        }
    }

    /// The hangout the target should receive for this record.
    pub fn target_hangout(&self) -> Hangout {
        Hangout {
            message: self.message.clone(),
            ..Hangout::new(&self.sender, self.target_state, self.timestamp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_omits_type_field() {
        let msg = Message::new("hi", "alice", 1);
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("type").is_none());
    }

    #[test]
    fn local_notices_carry_type_field() {
        let blocked = serde_json::to_value(Message::blocked_notice("alice", 1)).unwrap();
        assert_eq!(blocked["type"], "blocked");
        assert_eq!(blocked["text"], BLOCKED_NOTICE);

        let blocker = serde_json::to_value(Message::blocker_notice("alice", 1)).unwrap();
        assert_eq!(blocker["type"], "blocker");
        assert_eq!(blocker["text"], BLOCKER_NOTICE);
    }

    #[test]
    fn message_without_type_decodes_as_text() {
        let json = r#"{"text":"yo","timestamp":5,"delivered":true,"read":false,"username":"bob"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(!msg.is_local());
    }

    #[test]
    fn hangout_decodes_stored_shape() {
        let json = r#"{"username":"bob","email":"bob@x.io","state":"INVITED","timestamp":10,"delivered":false,"read":false}"#;
        let hangout: Hangout = serde_json::from_str(json).unwrap();
        assert_eq!(hangout.state, HangoutState::Invited);
        assert!(hangout.message.is_none());
        assert!(!hangout.has_message());
    }

    #[test]
    fn empty_message_text_is_not_a_message() {
        let peer = Peer::new("bob", "bob@x.io");
        let hangout = Hangout::new(&peer, HangoutState::Messaged, 1)
            .with_message(Message::new("", "alice", 1));
        assert!(!hangout.has_message());
    }

    #[test]
    fn outbound_record_projects_both_sides() {
        let record = OutboundRecord {
            sender: Peer::new("alice", "alice@x.io"),
            target: Peer::new("bob", "bob@x.io"),
            command: Command::Invite,
            sender_state: HangoutState::Invited,
            target_state: HangoutState::Inviter,
            message: None,
            timestamp: 42,
            offline: false,
        };

        let mine = record.sender_hangout();
        assert_eq!(mine.username, "bob");
        assert_eq!(mine.state, HangoutState::Invited);

        let theirs = record.target_hangout();
        assert_eq!(theirs.username, "alice");
        assert_eq!(theirs.state, HangoutState::Inviter);
        assert_eq!(theirs.timestamp, 42);
    }
}
