//! Relationship state machine.
//!
//! Maps a client command to the pair of states written on each side of the
//! relationship. The table is fixed; nothing here depends on prior state.

use hangouts_types::{Command, HangoutState, ProtocolError};

/// The two sides of one protocol transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State written into the issuer's own record.
    pub sender_state: HangoutState,
    /// State written into the recipient's record.
    pub target_state: HangoutState,
}

/// Compute the sender/target state pair for a command.
pub fn transition(command: Command) -> Transition {
    let (sender_state, target_state) = match command {
        Command::Invite => (HangoutState::Invited, HangoutState::Inviter),
        Command::Accept => (HangoutState::Accepted, HangoutState::Accepter),
        Command::Decline => (HangoutState::Declined, HangoutState::Decliner),
        Command::Block => (HangoutState::Blocked, HangoutState::Blocker),
        Command::Unblock => (HangoutState::Unblocked, HangoutState::Unblocker),
        Command::Message => (HangoutState::Messaged, HangoutState::Messanger),
    };
    Transition {
        sender_state,
        target_state,
    }
}

/// Compute the state pair for a raw command verb.
///
/// Any verb outside the protocol is a [`ProtocolError`].
pub fn transition_verb(verb: &str) -> Result<Transition, ProtocolError> {
    Ok(transition(verb.parse()?))
}
