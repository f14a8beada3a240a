//! Store Interfaces
//!
//! Narrow interfaces to the collaborators the messaging core depends on but
//! does not own: the user directory and the message/group persistence store.
//! The rest of the application (accounts, profiles, likes) lives behind
//! these seams.
//!
//! Two implementations ship with the crate: [`db::PgStore`] backed by
//! PostgreSQL via `sqlx`, and [`memory::MemoryStore`] used by the test suite
//! and as a fallback when no database is configured.

pub mod db;
pub mod memory;

use crate::backend::error::HubError;
use crate::shared::{ChatMessage, Group, GroupKey, UserProfile};
use async_trait::async_trait;

/// Read-only lookup into the member service's user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a username to its profile, or `None` if unknown.
    async fn get_user_by_name(&self, username: &str) -> Result<Option<UserProfile>, HubError>;
}

/// Persistence for chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message.
    async fn save_message(&self, message: &ChatMessage) -> Result<(), HubError>;

    /// Load the full thread between two users, ordered by `sent_at`.
    ///
    /// Loading a thread marks every unread message addressed to `username`
    /// from `peer` as read, and the returned thread reflects those updates.
    async fn load_thread(
        &self,
        username: &str,
        peer: &str,
    ) -> Result<Vec<ChatMessage>, HubError>;
}

/// Persistence for conversation groups and their member connections.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Load a group by its canonical key, or `None` if it was never created.
    async fn load_group(&self, key: &GroupKey) -> Result<Option<Group>, HubError>;

    /// Persist a group's current membership, creating the record if absent.
    async fn save_group(&self, group: &Group) -> Result<(), HubError>;

    /// Find the group currently containing `connection_id`, if any.
    ///
    /// A connection belongs to at most one group at a time.
    async fn group_for_connection(&self, connection_id: &str)
        -> Result<Option<Group>, HubError>;
}
