//! Review service
//!
//! Orchestrates the stores and the assignment engine for each request. The
//! service itself owns no mutable state apart from the random source; all
//! consistency comes from the stores' atomic operations.

use std::sync::Arc;

use chrono::Utc;

use crate::assignment::{self, RngSource};
use crate::model::{PullRequest, PullRequestShort, Team, User};
use crate::store::{PullRequestStore, ReviewerSwap, TeamStore, UserStore};
use crate::Result;

/// Entry point for every team, user and pull request operation
pub struct ReviewService {
    teams: Arc<dyn TeamStore>,
    users: Arc<dyn UserStore>,
    pull_requests: Arc<dyn PullRequestStore>,
    rng: RngSource,
}

impl ReviewService {
    /// Create a service over separate stores
    pub fn new(
        teams: Arc<dyn TeamStore>,
        users: Arc<dyn UserStore>,
        pull_requests: Arc<dyn PullRequestStore>,
    ) -> Self {
        Self {
            teams,
            users,
            pull_requests,
            rng: RngSource::default(),
        }
    }

    /// Create a service over one value implementing every store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: TeamStore + UserStore + PullRequestStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Replace the random source, e.g. with a seeded one
    pub fn with_rng_source(mut self, rng: RngSource) -> Self {
        self.rng = rng;
        self
    }

    /// Create a team and upsert its members
    ///
    /// Returns the team as stored: every member carries the team's name.
    pub async fn create_team(&self, team: Team) -> Result<Team> {
        let team = Team {
            members: team
                .members
                .into_iter()
                .map(|u| User {
                    team_name: team.name.clone(),
                    ..u
                })
                .collect(),
            name: team.name,
        };

        self.teams.create_team_with_members(&team).await?;
        tracing::info!(team = %team.name, members = team.members.len(), "Team created");
        Ok(team)
    }

    pub async fn get_team(&self, name: &str) -> Result<Team> {
        self.teams.get_team(name).await
    }

    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let user = self.users.set_user_active(user_id, is_active).await?;
        tracing::info!(user = %user.id, is_active, "User activity changed");
        Ok(user)
    }

    /// Pull requests the user reviews; `NotFound` for an unknown user
    pub async fn get_user_reviews(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        self.users.get_user(user_id).await?;
        self.pull_requests.pull_requests_by_reviewer(user_id).await
    }

    /// Create an open pull request and assign up to two reviewers
    ///
    /// Reviewers are active teammates of the author. If nobody is eligible
    /// the call fails with `NoCandidate` and nothing is stored. A failed
    /// insert discards the selection.
    pub async fn create_pull_request(
        &self,
        pr_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        let author = self.users.get_user(author_id).await?;
        let candidates = self.users.active_users_by_team(&author.team_name).await?;

        let reviewers = assignment::select_reviewers(
            pr_id,
            &author.id,
            &candidates,
            &mut self.rng.next_rng(),
        )
        .inspect_err(|e| tracing::debug!(pr = %pr_id, error = %e, "Reviewer selection rejected"))?;

        let pr = PullRequest::new(pr_id, name, &author.id).with_reviewers(reviewers);
        self.pull_requests.create_pull_request(&pr).await?;

        tracing::info!(
            pr = %pr.id,
            author = %pr.author_id,
            reviewers = ?pr.reviewers,
            "Pull request created"
        );
        Ok(pr)
    }

    /// Merge a pull request
    ///
    /// Merging an already merged pull request succeeds and returns it
    /// unchanged, including its original `merged_at`.
    pub async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let pr = self.pull_requests.merge_pull_request(pr_id, Utc::now()).await?;
        tracing::info!(pr = %pr.id, merged_at = ?pr.merged_at, "Pull request merged");
        Ok(pr)
    }

    /// Replace one reviewer with a random eligible teammate of theirs
    ///
    /// Returns the updated pull request and the id of the new reviewer. The
    /// write is conditional on the pull request being unchanged since it was
    /// read, so a concurrent swap surfaces as `Conflict` instead of being
    /// silently overwritten.
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> Result<(PullRequest, String)> {
        let mut pr = self.pull_requests.get_pull_request(pr_id).await?;
        assignment::ensure_reassignable(&pr, old_reviewer_id)?;

        let old_reviewer = self.users.get_user(old_reviewer_id).await?;
        let candidates = self
            .users
            .active_users_by_team(&old_reviewer.team_name)
            .await?;

        let new_reviewer_id = assignment::select_replacement(
            &pr,
            old_reviewer_id,
            &candidates,
            &mut self.rng.next_rng(),
        )
        .inspect_err(|e| tracing::debug!(pr = %pr_id, error = %e, "Reassignment rejected"))?;

        let swap = ReviewerSwap {
            pr_id: pr.id.clone(),
            old_reviewer_id: old_reviewer_id.to_string(),
            new_reviewer_id: new_reviewer_id.clone(),
            expected_version: pr.version,
        };
        self.pull_requests
            .replace_reviewer(&swap)
            .await
            .inspect_err(|e| tracing::debug!(pr = %pr_id, error = %e, "Reviewer swap not applied"))?;

        pr.replace_reviewer(old_reviewer_id, &new_reviewer_id);
        pr.version += 1;

        tracing::info!(
            pr = %pr.id,
            old = %old_reviewer_id,
            new = %new_reviewer_id,
            "Reviewer reassigned"
        );
        Ok((pr, new_reviewer_id))
    }
}
