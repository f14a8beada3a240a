//! Common test utilities
//!
//! Builds hubs over the in-memory store and wraps a session plus its
//! outbound event channel the way the WebSocket task wires them together.

#![allow(dead_code)]

use kindred::backend::error::HubError;
use kindred::backend::hub::MessageSession;
use kindred::backend::server::Hub;
use kindred::backend::store::memory::MemoryStore;
use kindred::shared::{ServerEvent, UserProfile};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Hub backed by one in-memory store seeded with the given users.
pub fn hub_with_users(users: &[(&str, &str)]) -> (Hub, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    for (username, display_name) in users {
        store.insert_user(UserProfile::new(*username, *display_name));
    }
    let hub = Hub::new(store.clone(), store.clone(), store.clone());
    (hub, store)
}

/// A session with its outbound channel, standing in for one client socket.
pub struct TestClient {
    pub session: MessageSession,
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
}

impl TestClient {
    /// Register an outbound channel and create a (not yet connected)
    /// session, exactly as the transport does on upgrade.
    pub fn open(hub: &Hub, connection_id: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        hub.clients.register(connection_id, tx);
        Self {
            session: MessageSession::new(hub.clone(), connection_id),
            events: rx,
        }
    }

    /// Open a connection and drive it through `connect`.
    pub async fn connect(
        hub: &Hub,
        connection_id: &str,
        username: &str,
        peer: &str,
    ) -> Result<Self, HubError> {
        let mut client = Self::open(hub, connection_id);
        client.session.connect(username, peer).await?;
        Ok(client)
    }

    /// Drain every event delivered so far.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Next pending event, panicking if none has been delivered.
    pub fn next_event(&mut self) -> ServerEvent {
        self.events.try_recv().expect("expected a pending event")
    }
}
