//! Database layer for Roster
//!
//! Provides SQLite persistence for teams, users and pull requests, and
//! implements the `roster-core` store traits on top of it.

mod db;
pub mod error;
pub mod repos;

pub use db::{Database, DatabaseConfig};
pub use error::{DbError, Result};
pub use repos::{PullRequestRepo, TeamRepo, UserRepo};
