//! Wire Events and Commands
//!
//! The JSON protocol spoken over a client's WebSocket connection. The server
//! pushes [`ServerEvent`]s; the client sends [`ClientCommand`]s. Both sides
//! use internally tagged JSON so an event can be dispatched on its tag
//! without peeking at the payload.
//!
//! # Delivery scopes
//!
//! - `message-thread` - the caller only, on connect
//! - `updated-group` / `new-message` - members of one conversation group
//! - `user-online` / `user-offline` - every other connected session
//! - `online-users` - the newly connected session only
//! - `message-notification` - the recipient's connections outside the
//!   conversation (recipient online but viewing something else)
//! - `error` - the session whose command failed

use crate::shared::group::Group;
use crate::shared::message::ChatMessage;
use serde::{Deserialize, Serialize};

/// Event pushed from the server to one or more client connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full persisted message thread, delivered to the caller on connect
    MessageThread { messages: Vec<ChatMessage> },
    /// A group's membership changed
    UpdatedGroup { group: Group },
    /// A message was persisted and broadcast to the conversation
    NewMessage { message: ChatMessage },
    /// A user transitioned from offline to online
    UserOnline { username: String },
    /// A user transitioned from online to offline
    UserOffline { username: String },
    /// Current online-user snapshot, alphabetically ordered
    OnlineUsers { usernames: Vec<String> },
    /// A new message is waiting in a conversation the recipient is not viewing
    MessageNotification {
        username: String,
        display_name: String,
    },
    /// A command from this session failed
    Error { code: String, message: String },
}

/// Command sent from a client over its WebSocket connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Send a chat message to another member
    SendMessage {
        recipient_username: String,
        content: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_tags() {
        let event = ServerEvent::UserOnline {
            username: "alice".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "user-online");
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_client_command_parses() {
        let json = r#"{"command":"send-message","recipient_username":"bob","content":"hi"}"#;
        let command: ClientCommand = serde_json::from_str(json).unwrap();
        assert_eq!(
            command,
            ClientCommand::SendMessage {
                recipient_username: "bob".to_string(),
                content: "hi".to_string(),
            }
        );
    }
}
