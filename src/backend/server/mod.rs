//! Server Assembly
//!
//! Configuration loading, application state, and router initialization.

pub mod config;
pub mod init;
pub mod state;

pub use state::{AppState, Hub};
