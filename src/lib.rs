//! Kindred real-time messaging core
//!
//! This crate implements the presence and messaging backbone of the Kindred
//! social app: a process-wide presence tracker, per-conversation groups with
//! deterministic naming, and a per-connection session state machine that
//! delivers chat messages with read-receipt semantics and offline
//! notification fallback.
//!
//! # Structure
//!
//! - [`shared`] - wire-level types exchanged with clients (events, messages,
//!   groups). Everything here is `serde`-serializable.
//! - [`backend`] - the server: presence tracking, the message hub, store
//!   interfaces and their Postgres/in-memory implementations, and the
//!   WebSocket transport.
//!
//! The surrounding application (user accounts, profiles, photos, likes) talks
//! to this core only through the narrow interfaces in [`backend::store`] and
//! the WebSocket endpoint in [`backend::realtime`].

pub mod backend;
pub mod shared;
