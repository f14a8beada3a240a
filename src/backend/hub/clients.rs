/**
 * Outbound Client Dispatch
 *
 * Maps each live connection id to the sender half of its outbound event
 * channel. The WebSocket task owns the receiver half and pumps events onto
 * the socket, so anything holding a `ClientHub` handle can push an event to
 * a specific connection without touching the transport.
 *
 * # Delivery semantics
 *
 * Every delivery here is fire-and-forget. A connection that has disconnected
 * (or whose channel has closed under it) is silently skipped; a failed
 * delivery to one recipient never affects the others and never fails the
 * operation that triggered it.
 */
use crate::shared::{Group, ServerEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Sender half of one connection's outbound event channel
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// Registry of outbound channels for all live connections.
///
/// Cheap to clone; clones share the same registry. Serves double duty as the
/// notification dispatcher: [`ClientHub::notify`] delivers a payload to an
/// explicit list of connection ids, skipping any that have since gone away.
#[derive(Clone, Default)]
pub struct ClientHub {
    senders: Arc<Mutex<HashMap<String, OutboundSender>>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outbound channel for a newly opened connection.
    pub fn register(&self, connection_id: &str, sender: OutboundSender) {
        self.senders
            .lock()
            .unwrap()
            .insert(connection_id.to_string(), sender);
    }

    /// Drop a connection's outbound channel after its transport closes.
    pub fn unregister(&self, connection_id: &str) {
        self.senders.lock().unwrap().remove(connection_id);
    }

    /// Deliver an event to a single connection. Returns false if the
    /// connection is gone.
    pub fn send_to(&self, connection_id: &str, event: ServerEvent) -> bool {
        let senders = self.senders.lock().unwrap();
        match senders.get(connection_id) {
            Some(sender) => sender.send(event).is_ok(),
            None => {
                tracing::debug!("[Hub] Dropping event for unknown connection {connection_id}");
                false
            }
        }
    }

    /// Deliver an event to every live connection except `connection_id`.
    pub fn broadcast_except(&self, connection_id: &str, event: ServerEvent) {
        let senders = self.senders.lock().unwrap();
        for (id, sender) in senders.iter() {
            if id != connection_id {
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Deliver an event to every current member connection of a group.
    pub fn send_to_group(&self, group: &Group, event: ServerEvent) {
        let senders = self.senders.lock().unwrap();
        for connection in &group.connections {
            if let Some(sender) = senders.get(&connection.connection_id) {
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Deliver an event to exactly the listed connection ids.
    ///
    /// Ids that have disconnected since the list was computed are skipped
    /// per id; the call as a whole never fails.
    pub fn notify(&self, connection_ids: &[String], event: ServerEvent) {
        let senders = self.senders.lock().unwrap();
        for id in connection_ids {
            if let Some(sender) = senders.get(id) {
                let _ = sender.send(event.clone());
            } else {
                tracing::debug!("[Hub] Skipping notification for stale connection {id}");
            }
        }
    }
}
