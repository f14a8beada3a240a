//! User Profile Data Structure
//!
//! The slice of a user record this core needs. The full user entity (photos,
//! bio, likes) lives in the member service; the hub only ever resolves a
//! username to this projection through the user directory interface.

use serde::{Deserialize, Serialize};

/// Minimal user projection used by the message hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique, case-sensitive username
    pub username: String,
    /// Name shown to other members (carried in message notifications)
    pub display_name: String,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
        }
    }
}
