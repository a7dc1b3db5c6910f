//! Store abstraction for teams, users and pull requests.
//!
//! The review service talks to persistence only through these traits.
//! `roster-db` implements them on SQLite; [`InMemoryStore`] implements them
//! on in-process maps for tests and throwaway runs.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{PullRequest, PullRequestShort, Team, User};
use crate::Result;

/// User lookups and activation toggling
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user, or `NotFound`.
    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// Active members of a team, ordered by user id.
    ///
    /// An unknown team yields an empty list.
    async fn active_users_by_team(&self, team_name: &str) -> Result<Vec<User>>;

    /// Set the active flag and return the updated user, or `NotFound`.
    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User>;
}

/// Team creation and lookup
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Insert the team and upsert its members as one unit.
    ///
    /// Fails with `TeamExists` if the name is taken; in that case no member
    /// is touched. Members that already exist elsewhere move into this team.
    async fn create_team_with_members(&self, team: &Team) -> Result<()>;

    /// Get a team with all of its members ordered by user id, or `NotFound`.
    async fn get_team(&self, name: &str) -> Result<Team>;
}

/// A compare-and-swap reviewer replacement
///
/// Applies only if the pull request is still open and still at
/// `expected_version`, the version the decision was based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerSwap {
    pub pr_id: String,
    pub old_reviewer_id: String,
    pub new_reviewer_id: String,
    pub expected_version: i64,
}

/// Pull request persistence
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert the pull request and its reviewers as one unit, or `PrExists`.
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()>;

    /// Get a pull request with its reviewers in assignment order, or `NotFound`.
    async fn get_pull_request(&self, pr_id: &str) -> Result<PullRequest>;

    /// Mark an open pull request merged at `merged_at` and return it.
    ///
    /// An already merged pull request is returned unchanged. `NotFound` if it
    /// does not exist.
    async fn merge_pull_request(&self, pr_id: &str, merged_at: DateTime<Utc>)
        -> Result<PullRequest>;

    /// Apply a reviewer swap atomically.
    ///
    /// Errors, in order of precedence: `NotFound`, `PrMerged`, `Conflict`
    /// (version moved), `NotAssigned`. No error leaves a partial write.
    async fn replace_reviewer(&self, swap: &ReviewerSwap) -> Result<()>;

    /// Pull requests on which `user_id` is a reviewer, oldest first.
    async fn pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>>;
}
