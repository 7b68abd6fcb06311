//! Unread bookkeeping rules.

use hangouts_types::{Hangout, HangoutState};

/// States that raise an unread badge when they arrive unfocused.
pub fn tracks_unread(state: HangoutState) -> bool {
    matches!(
        state,
        HangoutState::Accepter | HangoutState::Inviter | HangoutState::Messanger
    )
}

/// Decide whether an inbound hangout belongs in the unread list.
///
/// `focused` is the username of the conversation currently open, if any.
pub fn should_track(hangout: &Hangout, focused: Option<&str>) -> bool {
    tracks_unread(hangout.state) && focused != Some(hangout.username.as_str())
}

/// Drop every unread entry for a peer. Returns how many were removed.
pub fn remove_peer(unread: &mut Vec<Hangout>, username: &str) -> usize {
    let before = unread.len();
    unread.retain(|h| h.username != username);
    before - unread.len()
}
