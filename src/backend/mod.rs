//! Backend Module
//!
//! Server-side implementation of the Kindred real-time messaging core.
//!
//! # Overview
//!
//! - **`presence`** - the online-user table and its broadcaster; the one
//!   piece of cross-session shared mutable state
//! - **`hub`** - conversation groups, the per-connection session state
//!   machine, and outbound client dispatch
//! - **`store`** - narrow interfaces to the user directory and the
//!   message/group store, with Postgres and in-memory implementations
//! - **`realtime`** - the WebSocket transport driving sessions
//! - **`routes`** / **`server`** - router assembly, configuration, state
//! - **`error`** - the hub error taxonomy
//!
//! # Control flow
//!
//! A client opens `/ws?user=<peer>`: the transport registers the connection,
//! the session joins the canonical conversation group and returns the
//! persisted thread to the caller. Each send persists the message, decides
//! between read-at-send and offline notification from the group membership,
//! then broadcasts to the group. Socket teardown always releases group
//! membership and presence.

pub mod error;
pub mod hub;
pub mod presence;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod store;
