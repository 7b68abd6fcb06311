//! Session configuration.

use hangouts_types::Peer;

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Local username; namespaces every storage key.
    pub username: String,
    /// Local user's email.
    pub email: String,
    /// Push-channel topic to subscribe to.
    pub topic: String,
    /// Directory collection that outbound records are saved to.
    pub hangout_collection: String,
    /// Directory collection queried for the unread catch-up.
    pub unread_collection: String,
}

impl SessionConfig {
    /// Create a configuration with default topic and collection names.
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            topic: "hangouts".to_string(),
            hangout_collection: "Hangout".to_string(),
            unread_collection: "UnreadHangout".to_string(),
        }
    }

    /// Set the subscription topic.
    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = topic.to_string();
        self
    }

    /// Set the collection outbound records are saved to.
    pub fn with_hangout_collection(mut self, collection: &str) -> Self {
        self.hangout_collection = collection.to_string();
        self
    }

    /// Set the collection queried for unread catch-up.
    pub fn with_unread_collection(mut self, collection: &str) -> Self {
        self.unread_collection = collection.to_string();
        self
    }

    /// The local user as a peer identity.
    pub fn local_peer(&self) -> Peer {
        Peer::new(&self.username, &self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::new("alice", "alice@x.io");
        assert_eq!(config.topic, "hangouts");
        assert_eq!(config.hangout_collection, "Hangout");
        assert_eq!(config.unread_collection, "UnreadHangout");
        assert_eq!(config.local_peer(), Peer::new("alice", "alice@x.io"));
    }

    #[test]
    fn config_builder_pattern() {
        let config = SessionConfig::new("alice", "alice@x.io")
            .with_topic("rooms")
            .with_hangout_collection("Rel")
            .with_unread_collection("Backlog");

        assert_eq!(config.topic, "rooms");
        assert_eq!(config.hangout_collection, "Rel");
        assert_eq!(config.unread_collection, "Backlog");
    }
}
