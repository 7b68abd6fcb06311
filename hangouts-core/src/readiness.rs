//! Connectivity transitions for the push channel.
//!
//! Pure state machine over [`ReadyState`]. The session executes the returned
//! actions; entering `Open` from anywhere else is what triggers the offline
//! flush and the unread catch-up.

use hangouts_types::ReadyState;

/// Tracks the channel's ready state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Connectivity {
    state: ReadyState,
}

/// Actions to be executed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityAction {
    /// Publish the new ready state to the view.
    EmitReadyState(ReadyState),
    /// Re-send everything in the offline bucket.
    FlushOffline,
    /// Query the directory for hangouts that arrived while away.
    FetchUnread,
}

impl Connectivity {
    /// Start in the given state.
    pub fn new(state: ReadyState) -> Self {
        Self { state }
    }

    /// The current state.
    pub fn state(&self) -> ReadyState {
        self.state
    }

    /// Check if the channel is live.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Process a reported state and return the new tracker plus actions.
    pub fn on_change(self, next: ReadyState) -> (Self, Vec<ConnectivityAction>) {
        match (self.state, next) {
            (current, next) if current == next => (self, vec![]),
            (_, ReadyState::Open) => (
                Self::new(next),
                vec![
                    ConnectivityAction::EmitReadyState(next),
                    ConnectivityAction::FlushOffline,
                    ConnectivityAction::FetchUnread,
                ],
            ),
            (_, next) => (
                Self::new(next),
                vec![ConnectivityAction::EmitReadyState(next)],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let c = Connectivity::default();
        assert_eq!(c.state(), ReadyState::Closed);
        assert!(!c.is_open());
    }

    #[test]
    fn entering_open_flushes_then_fetches() {
        let (c, actions) = Connectivity::new(ReadyState::Connecting).on_change(ReadyState::Open);
        assert!(c.is_open());
        assert_eq!(
            actions,
            vec![
                ConnectivityAction::EmitReadyState(ReadyState::Open),
                ConnectivityAction::FlushOffline,
                ConnectivityAction::FetchUnread,
            ]
        );
    }

    #[test]
    fn closed_straight_to_open_also_flushes() {
        let (_, actions) = Connectivity::new(ReadyState::Closed).on_change(ReadyState::Open);
        assert!(actions.contains(&ConnectivityAction::FlushOffline));
    }

    #[test]
    fn repeated_open_is_no_op() {
        let (c, actions) = Connectivity::new(ReadyState::Open).on_change(ReadyState::Open);
        assert!(c.is_open());
        assert!(actions.is_empty());
    }

    #[test]
    fn leaving_open_only_emits() {
        let (c, actions) = Connectivity::new(ReadyState::Open).on_change(ReadyState::Closing);
        assert_eq!(c.state(), ReadyState::Closing);
        assert_eq!(
            actions,
            vec![ConnectivityAction::EmitReadyState(ReadyState::Closing)]
        );
    }

    #[test]
    fn full_reconnect_flow() {
        let c = Connectivity::new(ReadyState::Open);
        let (c, _) = c.on_change(ReadyState::Closing);
        let (c, _) = c.on_change(ReadyState::Closed);
        let (c, _) = c.on_change(ReadyState::Connecting);
        let (c, actions) = c.on_change(ReadyState::Open);
        assert!(c.is_open());
        assert!(actions.contains(&ConnectivityAction::FetchUnread));
    }
}
