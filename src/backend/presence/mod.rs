//! Presence Tracking
//!
//! Authoritative record of which users currently hold open connections, and
//! the broadcaster that announces online/offline transitions.
//!
//! A user is online exactly while they hold at least one open connection;
//! there is no timeout-driven expiry. The tracker is an explicitly
//! constructed service handle passed into every session, never a process
//! global.

pub mod broadcaster;
pub mod tracker;

pub use broadcaster::PresenceBroadcaster;
pub use tracker::PresenceTracker;
