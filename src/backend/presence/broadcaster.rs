//! Presence Broadcaster
//!
//! Announces online/offline transitions on top of the presence tracker.
//! Notifications are fire-and-forget: a delivery failure to an individual
//! connection affects neither the tracker state nor the other recipients.

use crate::backend::hub::ClientHub;
use crate::backend::presence::PresenceTracker;
use crate::shared::ServerEvent;

/// Broadcasts presence transitions to connected sessions.
///
/// On a user's first connection, every *other* session hears `user-online`
/// and the new session alone receives the full online-user snapshot. On the
/// user's last disconnection every other session hears `user-offline`.
/// Connections that only add to or subtract from an already-online user make
/// no noise at all.
#[derive(Clone)]
pub struct PresenceBroadcaster {
    tracker: PresenceTracker,
    clients: ClientHub,
}

impl PresenceBroadcaster {
    pub fn new(tracker: PresenceTracker, clients: ClientHub) -> Self {
        Self { tracker, clients }
    }

    /// Register a connection and announce the transition if it was the
    /// user's first.
    pub fn connection_opened(&self, username: &str, connection_id: &str) {
        let came_online = self.tracker.user_connected(username, connection_id);
        if came_online {
            tracing::info!("[Presence] {username} is online");
            self.clients.broadcast_except(
                connection_id,
                ServerEvent::UserOnline {
                    username: username.to_string(),
                },
            );
        }

        // The new session always gets the current snapshot, even when the
        // user was already online from another device.
        self.clients.send_to(
            connection_id,
            ServerEvent::OnlineUsers {
                usernames: self.tracker.online_users(),
            },
        );
    }

    /// Unregister a connection and announce the transition if it was the
    /// user's last.
    pub fn connection_closed(&self, username: &str, connection_id: &str) {
        let went_offline = self.tracker.user_disconnected(username, connection_id);
        if went_offline {
            tracing::info!("[Presence] {username} is offline");
            self.clients.broadcast_except(
                connection_id,
                ServerEvent::UserOffline {
                    username: username.to_string(),
                },
            );
        }
    }
}
