//! Roster Core - Teams, users and pull-request reviewer assignment
//!
//! This crate holds the domain model, the reviewer assignment engine and the
//! service that ties the engine to pluggable stores. Persistence lives in
//! `roster-db`; the HTTP surface lives in `roster-server`.

pub mod assignment;
pub mod config;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use assignment::{RngSource, MAX_REVIEWERS};
pub use config::{CliOverrides, Config};
pub use error::{Error, Result};
pub use model::{PrStatus, PullRequest, PullRequestShort, Team, User};
pub use service::ReviewService;
pub use store::{InMemoryStore, PullRequestStore, ReviewerSwap, TeamStore, UserStore};
