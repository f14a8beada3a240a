//! Chat Message Data Structure
//!
//! Represents one message in a two-party conversation. Messages are immutable
//! after creation except for the read receipt (`read_at`), which transitions
//! once from absent to set and never reverts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: Uuid,
    /// Username of the sender
    pub sender_username: String,
    /// Display name of the sender at send time
    pub sender_display_name: String,
    /// Username of the recipient
    pub recipient_username: String,
    /// Message body
    pub content: String,
    /// When the message was sent. Threads are ordered by this field.
    pub sent_at: DateTime<Utc>,
    /// When the recipient read the message, if they have.
    ///
    /// Set at send time when the recipient is actively viewing the
    /// conversation, or later when they open the thread.
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Create a new unread message with `sent_at = now`.
    pub fn new(
        sender_username: impl Into<String>,
        sender_display_name: impl Into<String>,
        recipient_username: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_username: sender_username.into(),
            sender_display_name: sender_display_name.into(),
            recipient_username: recipient_username.into(),
            content: content.into(),
            sent_at: Utc::now(),
            read_at: None,
        }
    }

    /// Mark the message read now. The first call wins; a read timestamp is
    /// never overwritten or cleared.
    pub fn mark_read(&mut self) {
        if self.read_at.is_none() {
            self.read_at = Some(Utc::now());
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
