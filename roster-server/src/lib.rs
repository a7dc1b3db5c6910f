//! Roster Server - HTTP surface for the review service
//!
//! Exposes team, user and pull request operations as JSON endpoints and runs
//! them with graceful shutdown.

pub mod api;
pub mod server;

pub use api::{router, AppState};
pub use server::{app, serve, serve_with_shutdown};
