//! In-memory view-model store.
//!
//! `ViewState` is what the UI renders. It changes only through
//! [`ViewState::apply`], and the session applies an action only after the
//! matching storage write has completed, so memory never runs ahead of the
//! cache.

use hangouts_core::HangoutBook;
use hangouts_types::{Hangout, Message, Peer, ReadyState};

/// State changes the session dispatches to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Replace the relationship list (rehydration).
    HangoutsLoaded(Vec<Hangout>),
    /// One peer's record changed.
    HangoutUpdated(Hangout),
    /// A conversation was opened.
    Focused {
        /// The peer now in focus.
        peer: Peer,
        /// Its conversation.
        messages: Vec<Message>,
    },
    /// A conversation changed; ignored unless it is the focused one.
    MessagesUpdated {
        /// Peer username.
        peer: String,
        /// The conversation after the change.
        messages: Vec<Message>,
    },
    /// The unread list changed.
    UnreadUpdated(Vec<Hangout>),
    /// The compose draft changed.
    MessageTextChanged(String),
    /// The search filter changed.
    SearchChanged(String),
    /// The channel's connectivity changed.
    ReadyStateChanged(ReadyState),
    /// A recoverable storage or remote error occurred.
    ErrorRaised(String),
    /// The error banner was dismissed.
    ErrorCleared,
    /// Drop everything (sign-out).
    Reset,
}

/// View-model state for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    focus: Option<Peer>,
    hangouts: HangoutBook,
    messages: Vec<Message>,
    unread_hangouts: Vec<Hangout>,
    message_text: String,
    ready_state: ReadyState,
    search: String,
    error: Option<String>,
}

impl ViewState {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action.
    pub fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::HangoutsLoaded(hangouts) => {
                self.hangouts = HangoutBook::from_vec(hangouts);
            }
            ViewAction::HangoutUpdated(hangout) => {
                self.hangouts.upsert(hangout);
            }
            ViewAction::Focused { peer, messages } => {
                self.focus = Some(peer);
                self.messages = messages;
            }
            ViewAction::MessagesUpdated { peer, messages } => {
                if self.focused_username() == Some(peer.as_str()) {
                    self.messages = messages;
                }
            }
            ViewAction::UnreadUpdated(unread) => {
                self.unread_hangouts = unread;
            }
            ViewAction::MessageTextChanged(text) => {
                self.message_text = text;
            }
            ViewAction::SearchChanged(search) => {
                self.search = search;
            }
            ViewAction::ReadyStateChanged(state) => {
                self.ready_state = state;
            }
            ViewAction::ErrorRaised(error) => {
                self.error = Some(error);
            }
            ViewAction::ErrorCleared => {
                self.error = None;
            }
            ViewAction::Reset => {
                *self = Self::default();
            }
        }
    }

    // ===========================================
    // Selectors
    // ===========================================

    /// The focused peer's hangout, if the relationship exists yet.
    pub fn hangout(&self) -> Option<&Hangout> {
        self.focus
            .as_ref()
            .and_then(|peer| self.hangouts.get(&peer.username))
    }

    /// The focused peer, with or without a hangout.
    pub fn focused(&self) -> Option<&Peer> {
        self.focus.as_ref()
    }

    /// Username of the focused peer.
    pub fn focused_username(&self) -> Option<&str> {
        self.focus.as_ref().map(|p| p.username.as_str())
    }

    /// All hangouts in first-seen order.
    pub fn hangouts(&self) -> Vec<Hangout> {
        self.hangouts.to_vec()
    }

    /// Look up one peer's hangout.
    pub fn find_hangout(&self, username: &str) -> Option<&Hangout> {
        self.hangouts.get(username)
    }

    /// Hangouts whose username matches the search filter.
    pub fn filtered_hangouts(&self) -> Vec<Hangout> {
        self.hangouts.search(&self.search)
    }

    /// The focused conversation.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Unread badges.
    pub fn unread_hangouts(&self) -> &[Hangout] {
        &self.unread_hangouts
    }

    /// The compose draft.
    pub fn message_text(&self) -> &str {
        &self.message_text
    }

    /// The channel's connectivity.
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// The search filter.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The last recoverable error, if not dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
