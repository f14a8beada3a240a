/**
 * Message Session
 *
 * The lifecycle state machine for one logical client connection:
 *
 * ```text
 * Disconnected -> Connecting -> Joined -> Disconnected
 * ```
 *
 * The transport layer creates one session per connection attempt and drives
 * it through explicit lifecycle calls: `connect` when the socket opens,
 * `send_message` for each inbound command, `disconnect` when the socket
 * closes on any path.
 *
 * # Ordering and the read-receipt race
 *
 * A send into a conversation runs under that conversation's lock, shared
 * with group join/leave. The recipient therefore cannot join the group
 * between the membership check and the persist: either the join completes
 * first and the message is marked read at send time, or the join lands after
 * the broadcast and the recipient picks the message up from the thread load.
 * The same lock keeps `sent_at` order in a thread consistent with persisted
 * order.
 */
use crate::backend::error::HubError;
use crate::backend::server::state::Hub;
use crate::shared::{ChatMessage, Connection, GroupKey, ServerEvent};

/// Lifecycle state of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No transport activity yet, or the session has been torn down
    Disconnected,
    /// Presence is registered; the group join has not completed
    Connecting { username: String },
    /// The connection is a member of its conversation group
    Joined { username: String, peer: String },
}

/// One logical client connection's view of the hub.
pub struct MessageSession {
    hub: Hub,
    connection_id: String,
    state: SessionState,
}

impl MessageSession {
    pub fn new(hub: Hub, connection_id: impl Into<String>) -> Self {
        Self {
            hub,
            connection_id: connection_id.into(),
            state: SessionState::Disconnected,
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Open the session: register presence, join the canonical group for
    /// `username`/`peer`, and deliver the persisted thread to the caller.
    ///
    /// Group members (including the caller) receive `updated-group`; the
    /// thread itself goes to the caller only. If the group join fails the
    /// caller must not treat the connection as joined - presence is already
    /// registered at that point and is released by the `disconnect` the
    /// transport runs on teardown.
    pub async fn connect(&mut self, username: &str, peer: &str) -> Result<(), HubError> {
        if self.state != SessionState::Disconnected {
            return Err(HubError::invalid_request("session already connected"));
        }
        if username.is_empty() {
            return Err(HubError::invalid_request("missing authenticated username"));
        }
        if peer.is_empty() {
            return Err(HubError::invalid_request("missing peer username"));
        }

        self.state = SessionState::Connecting {
            username: username.to_string(),
        };
        self.hub
            .presence
            .connection_opened(username, &self.connection_id);

        let key = GroupKey::new(username, peer);
        let group = self
            .hub
            .groups
            .join(key, Connection::new(self.connection_id.clone(), username))
            .await?;
        self.hub.clients.send_to_group(
            &group,
            ServerEvent::UpdatedGroup {
                group: group.clone(),
            },
        );

        let messages = self.hub.messages.load_thread(username, peer).await?;
        self.hub
            .clients
            .send_to(&self.connection_id, ServerEvent::MessageThread { messages });

        tracing::info!(
            "[Hub] {username} joined {} on connection {}",
            group.name(),
            self.connection_id
        );
        self.state = SessionState::Joined {
            username: username.to_string(),
            peer: peer.to_string(),
        };
        Ok(())
    }

    /// Send a message from this session's user to `recipient`.
    ///
    /// The message is marked read at send time exactly when the recipient
    /// has a connection inside the conversation's group. It is persisted
    /// before any broadcast; on a store failure nothing is broadcast. When
    /// the recipient is online but not viewing this conversation, their
    /// connections get a best-effort `message-notification` instead.
    pub async fn send_message(&self, recipient: &str, content: &str) -> Result<(), HubError> {
        let SessionState::Joined { username, .. } = &self.state else {
            return Err(HubError::invalid_request(
                "session has not joined a conversation",
            ));
        };
        if username == recipient {
            return Err(HubError::invalid_request("cannot send a message to yourself"));
        }

        let sender = self
            .hub
            .users
            .get_user_by_name(username)
            .await?
            .ok_or_else(|| HubError::not_found(format!("unknown sender {username}")))?;
        let recipient = self
            .hub
            .users
            .get_user_by_name(recipient)
            .await?
            .ok_or_else(|| HubError::not_found(format!("unknown recipient {recipient}")))?;

        let key = GroupKey::new(&sender.username, &recipient.username);
        let lock = self.hub.groups.conversation_lock(&key);
        let _guard = lock.lock().await;

        let group = self.hub.groups.current_members(&key).await?;
        let recipient_in_group = group
            .as_ref()
            .is_some_and(|g| g.has_user(&recipient.username));

        let mut message = ChatMessage::new(
            &sender.username,
            &sender.display_name,
            &recipient.username,
            content,
        );
        if recipient_in_group {
            // Recipient is actively viewing this conversation.
            message.mark_read();
        }

        self.hub.messages.save_message(&message).await?;

        if let Some(group) = &group {
            self.hub.clients.send_to_group(
                group,
                ServerEvent::NewMessage {
                    message: message.clone(),
                },
            );
        }

        if !recipient_in_group {
            let connections = self.hub.tracker.connections_for(&recipient.username);
            if !connections.is_empty() {
                self.hub.clients.notify(
                    &connections,
                    ServerEvent::MessageNotification {
                        username: sender.username.clone(),
                        display_name: sender.display_name.clone(),
                    },
                );
            }
        }

        Ok(())
    }

    /// Tear the session down: leave the group (if joined) and release
    /// presence.
    ///
    /// Cleanup failures are logged, never raised - a disconnect must not be
    /// blocked by a server-side persistence error, and the presence release
    /// runs regardless of the group outcome.
    pub async fn disconnect(&mut self) {
        let username = match &self.state {
            SessionState::Disconnected => return,
            SessionState::Connecting { username } => username.clone(),
            SessionState::Joined { username, .. } => username.clone(),
        };

        match self.hub.groups.leave(&self.connection_id).await {
            Ok(Some(group)) => {
                self.hub
                    .clients
                    .send_to_group(&group, ServerEvent::UpdatedGroup { group: group.clone() });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    "[Hub] Failed to remove connection {} from its group: {e}",
                    self.connection_id
                );
            }
        }

        self.hub
            .presence
            .connection_closed(&username, &self.connection_id);
        tracing::info!("[Hub] Connection {} disconnected ({username})", self.connection_id);
        self.state = SessionState::Disconnected;
    }
}
