//! Backend Error Types
//!
//! Error taxonomy for the message hub. See [`types::HubError`].

pub mod types;

pub use types::HubError;
