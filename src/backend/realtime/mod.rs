//! Real-time Transport
//!
//! WebSocket endpoint carrying the persistent bidirectional connection each
//! client holds while a conversation view is open. See [`ws`].

pub mod ws;

pub use ws::ws_handler;
