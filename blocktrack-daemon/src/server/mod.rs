//! HTTP server for the blocktrack daemon.
//!
//! Provides:
//! - Project lifecycle endpoints (create, unzip, commit, push)
//! - Changed-sprite queries for the companion client
//! - WebSocket relay of project events

mod http;
pub mod state;
mod websocket;

pub use http::create_router;
pub use state::{AppState, ProjectEvent};
