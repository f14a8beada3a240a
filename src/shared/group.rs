//! Conversation Groups
//!
//! A group is the server-side representation of a two-party conversation
//! channel. Its identity is derived from the two participant usernames so
//! that both sides always resolve the same group no matter who opens the
//! conversation first.
//!
//! # Canonical identity
//!
//! Internally the identity is a structured ordered pair ([`GroupKey`]), not a
//! joined string. The pair is ordered lexicographically on construction, which
//! makes `GroupKey::new` commutative. Only the persistence layer flattens the
//! key to a single string column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identity of a two-party conversation.
///
/// `first <= second` holds by construction, so `GroupKey::new(a, b)` and
/// `GroupKey::new(b, a)` are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    first: String,
    second: String,
}

impl GroupKey {
    /// Build the canonical key for a pair of usernames, in either order.
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    /// True if `username` is one of the two participants.
    pub fn involves(&self, username: &str) -> bool {
        self.first == username || self.second == username
    }

    /// Flatten the key to the single-column form used by the group store.
    ///
    /// Usernames containing `-` can make two distinct pairs collide under
    /// this encoding; the member service rejects the separator character at
    /// registration, so the flattened form is unambiguous here.
    pub fn store_key(&self) -> String {
        format!("{}-{}", self.first, self.second)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

/// One live transport-level connection inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Opaque connection identifier assigned by the transport
    pub connection_id: String,
    /// Username the connection authenticated as
    pub username: String,
}

impl Connection {
    pub fn new(connection_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            username: username.into(),
        }
    }
}

/// A two-party conversation channel and the connections currently viewing it.
///
/// Membership reflects who is *inside the conversation view* right now, which
/// is narrower than being online: a user can hold open connections without
/// being a member of any group. Groups are created lazily on first join and
/// the record is reused after the membership empties out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub key: GroupKey,
    pub connections: Vec<Connection>,
}

impl Group {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            connections: Vec::new(),
        }
    }

    /// Persisted name of the group (the flattened key).
    pub fn name(&self) -> String {
        self.key.store_key()
    }

    /// Add a connection to the membership. Re-adding the same connection id
    /// is a no-op.
    pub fn add_connection(&mut self, connection: Connection) {
        if !self
            .connections
            .iter()
            .any(|c| c.connection_id == connection.connection_id)
        {
            self.connections.push(connection);
        }
    }

    /// Remove a connection by id. Returns true if it was a member.
    pub fn remove_connection(&mut self, connection_id: &str) -> bool {
        let before = self.connections.len();
        self.connections
            .retain(|c| c.connection_id != connection_id);
        self.connections.len() != before
    }

    /// True if any current member connection belongs to `username`.
    pub fn has_user(&self, username: &str) -> bool {
        self.connections.iter().any(|c| c.username == username)
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_is_commutative() {
        assert_eq!(GroupKey::new("alice", "bob"), GroupKey::new("bob", "alice"));
        assert_eq!(GroupKey::new("alice", "bob").store_key(), "alice-bob");
        assert_eq!(GroupKey::new("bob", "alice").store_key(), "alice-bob");
    }

    #[test]
    fn test_group_key_ordering_is_lexicographic() {
        let key = GroupKey::new("zoe", "adam");
        assert_eq!(key.first(), "adam");
        assert_eq!(key.second(), "zoe");
    }

    #[test]
    fn test_group_key_involves() {
        let key = GroupKey::new("alice", "bob");
        assert!(key.involves("alice"));
        assert!(key.involves("bob"));
        assert!(!key.involves("carol"));
    }

    #[test]
    fn test_add_connection_deduplicates() {
        let mut group = Group::new(GroupKey::new("alice", "bob"));
        group.add_connection(Connection::new("conn-1", "alice"));
        group.add_connection(Connection::new("conn-1", "alice"));
        assert_eq!(group.connections.len(), 1);
    }

    #[test]
    fn test_remove_connection() {
        let mut group = Group::new(GroupKey::new("alice", "bob"));
        group.add_connection(Connection::new("conn-1", "alice"));

        assert!(group.remove_connection("conn-1"));
        assert!(group.is_empty());
        assert!(!group.remove_connection("conn-1"));
    }

    #[test]
    fn test_has_user_tracks_membership_not_presence() {
        let mut group = Group::new(GroupKey::new("alice", "bob"));
        group.add_connection(Connection::new("conn-1", "alice"));

        assert!(group.has_user("alice"));
        assert!(!group.has_user("bob"));
    }
}
