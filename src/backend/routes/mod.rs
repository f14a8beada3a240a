//! Route Configuration
//!
//! Router assembly for the messaging server. See [`router::create_router`].

pub mod router;

pub use router::create_router;
