/**
 * Conversation Group Manager
 *
 * Mediates join/leave against the group store and hands out the
 * per-conversation locks that keep group mutations and message sends for
 * the same conversation serialized.
 *
 * # Locking
 *
 * Every mutation of one group's membership, and every message send into
 * that conversation, runs under that group's async mutex. Distinct
 * conversations never contend. The lock table itself is guarded by a plain
 * `Mutex` held only long enough to fetch or create a lock entry.
 */
use crate::backend::error::HubError;
use crate::backend::store::GroupStore;
use crate::shared::{Connection, Group, GroupKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-conversation lock handle
pub type ConversationLock = Arc<tokio::sync::Mutex<()>>;

/// Resolves canonical groups and mutates their membership.
#[derive(Clone)]
pub struct GroupManager {
    store: Arc<dyn GroupStore>,
    locks: Arc<Mutex<HashMap<GroupKey, ConversationLock>>>,
}

impl GroupManager {
    pub fn new(store: Arc<dyn GroupStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The lock serializing all membership changes and sends for one
    /// conversation.
    pub fn conversation_lock(&self, key: &GroupKey) -> ConversationLock {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(key.clone()).or_default().clone()
    }

    /// Current membership of a conversation's group, if it exists.
    pub async fn current_members(&self, key: &GroupKey) -> Result<Option<Group>, HubError> {
        self.store.load_group(key).await
    }

    /// Add a connection to the canonical group for `key`, creating the group
    /// on first join, and persist the result.
    ///
    /// If the store cannot save, the connection is not joined and the error
    /// propagates to the caller.
    pub async fn join(&self, key: GroupKey, connection: Connection) -> Result<Group, HubError> {
        let lock = self.conversation_lock(&key);
        let _guard = lock.lock().await;

        let mut group = self
            .store
            .load_group(&key)
            .await?
            .unwrap_or_else(|| Group::new(key.clone()));
        group.add_connection(connection);
        self.store.save_group(&group).await?;

        tracing::debug!(
            "[Hub] Group {} now has {} connection(s)",
            group.name(),
            group.connections.len()
        );
        Ok(group)
    }

    /// Remove a connection from whichever group currently contains it and
    /// persist the result.
    ///
    /// Returns `Ok(None)` when no group contains the connection, e.g. on a
    /// duplicate disconnect.
    pub async fn leave(&self, connection_id: &str) -> Result<Option<Group>, HubError> {
        let Some(found) = self.store.group_for_connection(connection_id).await? else {
            return Ok(None);
        };

        let lock = self.conversation_lock(&found.key);
        let _guard = lock.lock().await;

        // Reload under the lock; membership may have moved since the lookup.
        let Some(mut group) = self.store.load_group(&found.key).await? else {
            return Ok(None);
        };
        if !group.remove_connection(connection_id) {
            return Ok(None);
        }
        self.store.save_group(&group).await?;

        if group.is_empty() {
            self.evict_lock(&group.key, &lock);
        }

        Ok(Some(group))
    }

    /// Drop the lock-table entry for an emptied conversation so the table
    /// does not grow with every pair that ever talked.
    ///
    /// Only evicts while exactly two handles exist: the table's and the
    /// caller's. A third handle means another task holds or is waiting on
    /// the lock, and its entry must stay alive.
    fn evict_lock(&self, key: &GroupKey, lock: &ConversationLock) {
        let mut locks = self.locks.lock().unwrap();
        let evict = locks
            .get(key)
            .map_or(false, |entry| {
                Arc::ptr_eq(entry, lock) && Arc::strong_count(entry) == 2
            });
        if evict {
            locks.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::memory::MemoryStore;
    use assert_matches::assert_matches;

    fn manager() -> GroupManager {
        GroupManager::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_join_creates_group_lazily() {
        let groups = manager();
        let key = GroupKey::new("alice", "bob");

        let group = groups
            .join(key.clone(), Connection::new("conn-1", "alice"))
            .await
            .unwrap();

        assert_eq!(group.key, key);
        assert_eq!(group.connections.len(), 1);
        assert!(groups.current_members(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_both_sides_resolve_same_group() {
        let groups = manager();

        groups
            .join(GroupKey::new("alice", "bob"), Connection::new("conn-1", "alice"))
            .await
            .unwrap();
        let group = groups
            .join(GroupKey::new("bob", "alice"), Connection::new("conn-2", "bob"))
            .await
            .unwrap();

        assert_eq!(group.connections.len(), 2);
    }

    #[tokio::test]
    async fn test_leave_returns_updated_group() {
        let groups = manager();
        let key = GroupKey::new("alice", "bob");
        groups
            .join(key.clone(), Connection::new("conn-1", "alice"))
            .await
            .unwrap();
        groups
            .join(key.clone(), Connection::new("conn-2", "bob"))
            .await
            .unwrap();

        let group = groups.leave("conn-1").await.unwrap();
        assert_matches!(group, Some(g) if g.connections.len() == 1);

        // The emptied group record survives for reuse.
        groups.leave("conn-2").await.unwrap();
        assert_matches!(
            groups.current_members(&key).await.unwrap(),
            Some(g) if g.is_empty()
        );
    }

    #[tokio::test]
    async fn test_duplicate_leave_is_not_found() {
        let groups = manager();
        groups
            .join(GroupKey::new("alice", "bob"), Connection::new("conn-1", "alice"))
            .await
            .unwrap();

        assert!(groups.leave("conn-1").await.unwrap().is_some());
        assert!(groups.leave("conn-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lock_entry_evicted_when_group_empties() {
        let groups = manager();
        let key = GroupKey::new("alice", "bob");
        groups
            .join(key.clone(), Connection::new("conn-1", "alice"))
            .await
            .unwrap();
        groups
            .join(key.clone(), Connection::new("conn-2", "bob"))
            .await
            .unwrap();
        assert_eq!(groups.locks.lock().unwrap().len(), 1);

        // A non-empty group keeps its lock entry.
        groups.leave("conn-1").await.unwrap();
        assert_eq!(groups.locks.lock().unwrap().len(), 1);

        // Emptying the group drops the entry; the table does not grow with
        // every pair that ever talked.
        groups.leave("conn-2").await.unwrap();
        assert_eq!(groups.locks.lock().unwrap().len(), 0);

        // A later join recreates the entry on demand.
        groups
            .join(key, Connection::new("conn-3", "alice"))
            .await
            .unwrap();
        assert_eq!(groups.locks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_joins_do_not_lose_members() {
        let groups = manager();
        let key = GroupKey::new("alice", "bob");

        let mut handles = Vec::new();
        for i in 0..16 {
            let groups = groups.clone();
            let key = key.clone();
            let user = if i % 2 == 0 { "alice" } else { "bob" };
            let connection = Connection::new(format!("conn-{i}"), user);
            handles.push(tokio::spawn(async move { groups.join(key, connection).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let group = groups.current_members(&key).await.unwrap().unwrap();
        assert_eq!(group.connections.len(), 16);
    }
}
