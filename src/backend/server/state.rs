/**
 * Application State Management
 *
 * This module defines the hub service bundle and the Axum application state
 * wrapper around it, with the `FromRef` implementation that lets handlers
 * extract the hub directly.
 *
 * # Thread Safety
 *
 * Every service handle here is cheap to clone and internally synchronized:
 * - `PresenceTracker` and `ClientHub` guard their tables with a `Mutex`
 * - `GroupManager` serializes per-conversation work on async mutexes
 * - the store handles are `Arc<dyn Trait>` over `Send + Sync`
 *   implementations
 *
 * A `Hub` clone shares all underlying state with its source; sessions and
 * request handlers each hold their own clone.
 */
use crate::backend::hub::{ClientHub, GroupManager};
use crate::backend::presence::{PresenceBroadcaster, PresenceTracker};
use crate::backend::store::{GroupStore, MessageStore, UserDirectory};
use axum::extract::FromRef;
use std::sync::Arc;

/// The messaging core's service bundle.
///
/// Constructed once at startup and handed (by clone) to every session. The
/// presence tracker is deliberately a constructed instance here rather than
/// a process global; nothing outside this bundle can reach it.
#[derive(Clone)]
pub struct Hub {
    /// Online-user table shared by every session
    pub tracker: PresenceTracker,
    /// Announces online/offline transitions
    pub presence: PresenceBroadcaster,
    /// Canonical group resolution and membership
    pub groups: GroupManager,
    /// Outbound per-connection event channels
    pub clients: ClientHub,
    /// Read-only member lookup
    pub users: Arc<dyn UserDirectory>,
    /// Message persistence
    pub messages: Arc<dyn MessageStore>,
}

impl Hub {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        messages: Arc<dyn MessageStore>,
        groups: Arc<dyn GroupStore>,
    ) -> Self {
        let tracker = PresenceTracker::new();
        let clients = ClientHub::new();
        let presence = PresenceBroadcaster::new(tracker.clone(), clients.clone());

        Self {
            tracker,
            presence,
            groups: GroupManager::new(groups),
            clients,
            users,
            messages,
        }
    }
}

/// Application state for the Axum router
#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
}

impl AppState {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }
}

/// Allows handlers to take `State(hub): State<Hub>` without the full
/// `AppState`.
impl FromRef<AppState> for Hub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}
