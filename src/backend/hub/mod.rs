//! Message Hub
//!
//! The conversation core: outbound client dispatch, conversation-group
//! membership, and the per-connection session state machine.
//!
//! # Overview
//!
//! - [`clients`] - per-connection outbound channels and targeted delivery
//!   (group broadcast, broadcast-to-others, notification dispatch)
//! - [`group`] - canonical group resolution and join/leave against the
//!   group store, serialized per group
//! - [`session`] - the `Disconnected -> Connecting -> Joined -> Disconnected`
//!   lifecycle of one logical client connection

pub mod clients;
pub mod group;
pub mod session;

pub use clients::ClientHub;
pub use group::GroupManager;
pub use session::MessageSession;
