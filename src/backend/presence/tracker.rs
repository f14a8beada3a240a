/**
 * Presence Tracker
 *
 * Process-wide table of `username -> connection ids`, the one piece of
 * mutable shared state in the messaging core. A user may be connected from
 * several devices or tabs at once, so each username maps to the set of its
 * live connection ids.
 *
 * # Invariant
 *
 * A username key exists if and only if the user holds at least one open
 * connection. The table never stores an empty set; absence of the key IS
 * "offline".
 *
 * # Thread Safety
 *
 * One `Mutex` guards the whole table. Every operation takes the lock for the
 * duration of its read or mutation, so registrations, removals, and
 * snapshots serialize against each other and a snapshot can never observe a
 * torn state. All operations are pure in-memory; nothing blocks beyond lock
 * contention.
 */
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared presence table. Cheap to clone; clones share the same table.
#[derive(Clone, Default)]
pub struct PresenceTracker {
    online: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection for `username`.
    ///
    /// Returns true exactly when this call transitioned the user from
    /// offline to online (no prior connections).
    pub fn user_connected(&self, username: &str, connection_id: &str) -> bool {
        let mut online = self.online.lock().unwrap();
        match online.get_mut(username) {
            Some(connections) => {
                connections.push(connection_id.to_string());
                false
            }
            None => {
                online.insert(username.to_string(), vec![connection_id.to_string()]);
                true
            }
        }
    }

    /// Remove a connection for `username`.
    ///
    /// Returns true exactly when this call transitioned the user from online
    /// to offline (last connection removed). An unknown username is a no-op,
    /// not an error.
    pub fn user_disconnected(&self, username: &str, connection_id: &str) -> bool {
        let mut online = self.online.lock().unwrap();
        let Some(connections) = online.get_mut(username) else {
            return false;
        };
        connections.retain(|id| id != connection_id);
        if connections.is_empty() {
            online.remove(username);
            true
        } else {
            false
        }
    }

    /// Alphabetically ordered snapshot of every online username.
    pub fn online_users(&self) -> Vec<String> {
        let online = self.online.lock().unwrap();
        let mut users: Vec<String> = online.keys().cloned().collect();
        users.sort();
        users
    }

    /// Connection ids currently held by `username` (possibly empty).
    pub fn connections_for(&self, username: &str) -> Vec<String> {
        let online = self.online.lock().unwrap();
        online.get(username).cloned().unwrap_or_default()
    }
}
