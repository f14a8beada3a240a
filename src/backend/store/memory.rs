//! In-Memory Store
//!
//! `Mutex`-guarded map implementations of the store interfaces. Used by the
//! test suite, and by the server when `DATABASE_URL` is not configured so a
//! development instance can run with nothing else installed.

use crate::backend::error::HubError;
use crate::backend::store::{GroupStore, MessageStore, UserDirectory};
use crate::shared::{ChatMessage, Group, GroupKey, UserProfile};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory user directory, message store, and group store in one.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserProfile>>,
    messages: Mutex<Vec<ChatMessage>>,
    groups: Mutex<HashMap<GroupKey, Group>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user record. Test and development helper; real deployments
    /// resolve users against the member database.
    pub fn insert_user(&self, profile: UserProfile) {
        self.users
            .lock()
            .unwrap()
            .insert(profile.username.clone(), profile);
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_user_by_name(&self, username: &str) -> Result<Option<UserProfile>, HubError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn save_message(&self, message: &ChatMessage) -> Result<(), HubError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn load_thread(
        &self,
        username: &str,
        peer: &str,
    ) -> Result<Vec<ChatMessage>, HubError> {
        let mut messages = self.messages.lock().unwrap();
        let now = Utc::now();

        let mut thread: Vec<ChatMessage> = messages
            .iter_mut()
            .filter(|m| {
                (m.sender_username == username && m.recipient_username == peer)
                    || (m.sender_username == peer && m.recipient_username == username)
            })
            .map(|m| {
                // Opening the thread reads everything the peer sent us.
                if m.recipient_username == username && m.read_at.is_none() {
                    m.read_at = Some(now);
                }
                m.clone()
            })
            .collect();

        thread.sort_by_key(|m| m.sent_at);
        Ok(thread)
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn load_group(&self, key: &GroupKey) -> Result<Option<Group>, HubError> {
        Ok(self.groups.lock().unwrap().get(key).cloned())
    }

    async fn save_group(&self, group: &Group) -> Result<(), HubError> {
        self.groups
            .lock()
            .unwrap()
            .insert(group.key.clone(), group.clone());
        Ok(())
    }

    async fn group_for_connection(
        &self,
        connection_id: &str,
    ) -> Result<Option<Group>, HubError> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .values()
            .find(|g| g.connections.iter().any(|c| c.connection_id == connection_id))
            .cloned())
    }
}

/// User directory that resolves any username to a profile named after
/// itself. Stands in for the member database when the server runs without
/// one; never used in production.
pub struct OpenDirectory;

#[async_trait]
impl UserDirectory for OpenDirectory {
    async fn get_user_by_name(&self, username: &str) -> Result<Option<UserProfile>, HubError> {
        Ok(Some(UserProfile::new(username, username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Connection;

    #[tokio::test]
    async fn test_directory_lookup() {
        let store = MemoryStore::new();
        store.insert_user(UserProfile::new("alice", "Alice"));

        let found = store.get_user_by_name("alice").await.unwrap();
        assert_eq!(found, Some(UserProfile::new("alice", "Alice")));
        assert_eq!(store.get_user_by_name("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_thread_orders_and_marks_read() {
        let store = MemoryStore::new();
        let from_bob = ChatMessage::new("bob", "Bob", "alice", "hey");
        let from_alice = ChatMessage::new("alice", "Alice", "bob", "hello");
        store.save_message(&from_bob).await.unwrap();
        store.save_message(&from_alice).await.unwrap();

        let thread = store.load_thread("alice", "bob").await.unwrap();
        assert_eq!(thread.len(), 2);
        assert!(thread.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));

        // Bob's message to alice is now read; alice's own message is not.
        let bobs = thread.iter().find(|m| m.sender_username == "bob").unwrap();
        assert!(bobs.is_read());
        let hers = thread.iter().find(|m| m.sender_username == "alice").unwrap();
        assert!(!hers.is_read());
    }

    #[tokio::test]
    async fn test_load_thread_ignores_other_conversations() {
        let store = MemoryStore::new();
        store
            .save_message(&ChatMessage::new("carol", "Carol", "alice", "hi"))
            .await
            .unwrap();

        assert!(store.load_thread("alice", "bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_group_round_trip_and_connection_lookup() {
        let store = MemoryStore::new();
        let key = GroupKey::new("alice", "bob");
        assert_eq!(store.load_group(&key).await.unwrap(), None);

        let mut group = Group::new(key.clone());
        group.add_connection(Connection::new("conn-1", "alice"));
        store.save_group(&group).await.unwrap();

        assert_eq!(store.load_group(&key).await.unwrap(), Some(group.clone()));
        assert_eq!(
            store.group_for_connection("conn-1").await.unwrap(),
            Some(group)
        );
        assert_eq!(store.group_for_connection("conn-9").await.unwrap(), None);
    }
}
