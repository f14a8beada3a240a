//! Shared Wire Types
//!
//! Types serialized between the server and connected clients: chat messages,
//! conversation groups, presence events, and client commands. Everything in
//! this module derives `Serialize`/`Deserialize` and carries no server-side
//! behavior beyond small constructors and state transitions.

pub mod event;
pub mod group;
pub mod message;
pub mod user;

pub use event::{ClientCommand, ServerEvent};
pub use group::{Connection, Group, GroupKey};
pub use message::ChatMessage;
pub use user::UserProfile;
