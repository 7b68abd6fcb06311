//! Events arriving from the push channel, and the channel's connectivity phase.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Hangout, HangoutState, ProtocolError};

/// All inbound events, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundEvent {
    /// The remote side confirmed a locally-initiated action.
    Acknowledgement {
        /// Authoritative record for the peer.
        hangout: Hangout,
    },
    /// A peer-initiated action.
    Hangout {
        /// The peer's record as it should appear locally.
        hangout: Hangout,
    },
    /// Bulk catch-up of hangouts that arrived while away.
    UnreadHangouts {
        /// Records to apply, oldest first.
        hangouts: Vec<Hangout>,
    },
    /// The remote side confirmed a command that was queued while offline.
    OfflineAcknowledgement {
        /// Authoritative record for the peer; its timestamp identifies the
        /// queued command.
        hangout: Hangout,
    },
}

impl InboundEvent {
    /// Decode an event from its JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(payload).map_err(ProtocolError::MalformedEvent)
    }

    /// Check that every carried record is on the side this kind allows.
    ///
    /// Acknowledgements confirm the local user's own action, so they carry a
    /// sender-side state, or BLOCKER when the peer refused delivery. Peer
    /// events carry a target-side state.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let (hangouts, acknowledged) = match self {
            InboundEvent::Acknowledgement { hangout }
            | InboundEvent::OfflineAcknowledgement { hangout } => {
                (std::slice::from_ref(hangout), true)
            }
            InboundEvent::Hangout { hangout } => (std::slice::from_ref(hangout), false),
            InboundEvent::UnreadHangouts { hangouts } => (hangouts.as_slice(), false),
        };
        let allowed = |state: HangoutState| {
            if acknowledged {
                state.is_sender_side() || state == HangoutState::Blocker
            } else {
                state.is_target_side()
            }
        };
        match hangouts.iter().find(|h| !allowed(h.state)) {
            Some(hangout) => Err(ProtocolError::UnexpectedState {
                kind: self.kind(),
                state: hangout.state,
            }),
            None => Ok(()),
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Acknowledgement { .. } => "ACKNOWLEDGEMENT",
            InboundEvent::Hangout { .. } => "HANGOUT",
            InboundEvent::UnreadHangouts { .. } => "UNREAD_HANGOUTS",
            InboundEvent::OfflineAcknowledgement { .. } => "OFFLINE_ACKNOWLEDGEMENT",
        }
    }
}

/// Connectivity phase of the real-time channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReadyState {
    /// Channel is being opened.
    Connecting = 0,
    /// Channel is live.
    Open = 1,
    /// Channel is shutting down.
    Closing = 2,
    /// Channel is down.
    #[default]
    Closed = 3,
}

impl ReadyState {
    /// Map the numeric code used by socket-style APIs.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ReadyState::Connecting),
            1 => Some(ReadyState::Open),
            2 => Some(ReadyState::Closing),
            3 => Some(ReadyState::Closed),
            _ => None,
        }
    }

    /// The numeric code of this phase.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Check if the channel is live.
    pub fn is_open(&self) -> bool {
        matches!(self, ReadyState::Open)
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadyState::Connecting => "CONNECTING",
            ReadyState::Open => "OPEN",
            ReadyState::Closing => "CLOSING",
            ReadyState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HangoutState;

    #[test]
    fn acknowledgement_decodes_from_tagged_json() {
        let json = r#"{
            "type": "ACKNOWLEDGEMENT",
            "hangout": {"username":"bob","email":"bob@x.io","state":"INVITED",
                        "timestamp":7,"delivered":false,"read":false}
        }"#;
        let event = InboundEvent::from_json(json).unwrap();
        match event {
            InboundEvent::Acknowledgement { hangout } => {
                assert_eq!(hangout.username, "bob");
                assert_eq!(hangout.state, HangoutState::Invited);
            }
            other => panic!("Expected Acknowledgement, got {:?}", other),
        }
    }

    #[test]
    fn unread_hangouts_decodes_list() {
        let json = r#"{"type":"UNREAD_HANGOUTS","hangouts":[]}"#;
        let event = InboundEvent::from_json(json).unwrap();
        assert_eq!(event, InboundEvent::UnreadHangouts { hangouts: vec![] });
        assert_eq!(event.kind(), "UNREAD_HANGOUTS");
    }

    #[test]
    fn unknown_event_type_is_protocol_error() {
        let err = InboundEvent::from_json(r#"{"type":"PRESENCE"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedEvent(_)));
    }

    #[test]
    fn unknown_state_in_event_is_protocol_error() {
        let json = r#"{"type":"HANGOUT","hangout":{"username":"bob","email":"",
            "state":"FRIENDED","timestamp":1,"delivered":false,"read":false}}"#;
        assert!(InboundEvent::from_json(json).is_err());
    }

    fn hangout(state: HangoutState) -> Hangout {
        Hangout::new(&crate::Peer::new("bob", "bob@x.io"), state, 1)
    }

    #[test]
    fn acknowledgement_must_carry_own_side() {
        let ok = InboundEvent::Acknowledgement {
            hangout: hangout(HangoutState::Invited),
        };
        assert!(ok.validate().is_ok());

        let refused = InboundEvent::OfflineAcknowledgement {
            hangout: hangout(HangoutState::Blocker),
        };
        assert!(refused.validate().is_ok());

        let wrong = InboundEvent::Acknowledgement {
            hangout: hangout(HangoutState::Inviter),
        };
        assert!(matches!(
            wrong.validate(),
            Err(ProtocolError::UnexpectedState { kind: "ACKNOWLEDGEMENT", state: HangoutState::Inviter })
        ));
    }

    #[test]
    fn peer_events_must_carry_target_side() {
        let blocked = InboundEvent::Hangout {
            hangout: hangout(HangoutState::Blocked),
        };
        assert!(blocked.validate().is_err());

        let catch_up = InboundEvent::UnreadHangouts {
            hangouts: vec![hangout(HangoutState::Inviter), hangout(HangoutState::Messaged)],
        };
        let err = catch_up.validate().unwrap_err();
        assert_eq!(err.to_string(), "UNREAD_HANGOUTS event cannot carry state MESSAGED");

        let empty = InboundEvent::UnreadHangouts { hangouts: vec![] };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn ready_state_codes() {
        for code in 0..4u8 {
            assert_eq!(ReadyState::from_code(code).unwrap().code(), code);
        }
        assert!(ReadyState::from_code(4).is_none());
        assert_eq!(ReadyState::Open.code(), 1);
        assert!(ReadyState::Open.is_open());
        assert!(!ReadyState::Closing.is_open());
        assert_eq!(ReadyState::default(), ReadyState::Closed);
    }
}
