//! Relationship protocol vocabulary.
//!
//! A [`Command`] is what a user issues; a [`HangoutState`] is what gets
//! recorded on each side of the relationship once the command is applied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

/// Client command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Ask a peer to start a hangout.
    Invite,
    /// Accept a pending invitation.
    Accept,
    /// Decline a pending invitation.
    Decline,
    /// Block a peer.
    Block,
    /// Lift a block.
    Unblock,
    /// Send a text message.
    Message,
}

impl Command {
    /// All command verbs, in protocol order.
    pub const ALL: [Command; 6] = [
        Command::Invite,
        Command::Accept,
        Command::Decline,
        Command::Block,
        Command::Unblock,
        Command::Message,
    ];

    /// The raw verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Invite => "INVITE",
            Command::Accept => "ACCEPT",
            Command::Decline => "DECLINE",
            Command::Block => "BLOCK",
            Command::Unblock => "UNBLOCK",
            Command::Message => "MESSAGE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownCommand(s.to_string()))
    }
}

/// Relationship state as recorded on one side of a hangout.
///
/// The `-ED` states are written into the issuer's record, the `-ER` states
/// into the recipient's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HangoutState {
    /// Local user sent an invitation.
    Invited,
    /// Peer sent an invitation.
    Inviter,
    /// Local user accepted.
    Accepted,
    /// Peer accepted.
    Accepter,
    /// Local user declined.
    Declined,
    /// Peer declined.
    Decliner,
    /// Local user blocked the peer.
    Blocked,
    /// Peer blocked the local user.
    Blocker,
    /// Local user lifted a block.
    Unblocked,
    /// Peer lifted a block.
    Unblocker,
    /// Local user sent a message.
    Messaged,
    /// Peer sent a message.
    Messanger,
}

impl HangoutState {
    /// All states, in protocol order.
    pub const ALL: [HangoutState; 12] = [
        HangoutState::Invited,
        HangoutState::Inviter,
        HangoutState::Accepted,
        HangoutState::Accepter,
        HangoutState::Declined,
        HangoutState::Decliner,
        HangoutState::Blocked,
        HangoutState::Blocker,
        HangoutState::Unblocked,
        HangoutState::Unblocker,
        HangoutState::Messaged,
        HangoutState::Messanger,
    ];

    /// The state name as it appears on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            HangoutState::Invited => "INVITED",
            HangoutState::Inviter => "INVITER",
            HangoutState::Accepted => "ACCEPTED",
            HangoutState::Accepter => "ACCEPTER",
            HangoutState::Declined => "DECLINED",
            HangoutState::Decliner => "DECLINER",
            HangoutState::Blocked => "BLOCKED",
            HangoutState::Blocker => "BLOCKER",
            HangoutState::Unblocked => "UNBLOCKED",
            HangoutState::Unblocker => "UNBLOCKER",
            HangoutState::Messaged => "MESSAGED",
            HangoutState::Messanger => "MESSANGER",
        }
    }

    /// True for states written into the issuer's own record.
    pub fn is_sender_side(&self) -> bool {
        matches!(
            self,
            HangoutState::Invited
                | HangoutState::Accepted
                | HangoutState::Declined
                | HangoutState::Blocked
                | HangoutState::Unblocked
                | HangoutState::Messaged
        )
    }

    /// True for states written into the recipient's record.
    pub fn is_target_side(&self) -> bool {
        !self.is_sender_side()
    }
}

impl fmt::Display for HangoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HangoutState {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HangoutState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownState(s.to_string()))
    }
}
