//! In-memory implementation of the store traits.
//!
//! All state is held in one map set behind a `RwLock` and lost on restart.
//! Each trait method takes the lock once, so every call is atomic just like
//! a database transaction.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{PullRequestStore, ReviewerSwap, TeamStore, UserStore};
use crate::model::{PullRequest, PullRequestShort, Team, User};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, PullRequest>,
}

/// In-memory store for users, teams and pull requests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        let state = self.state.read().await;
        state
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
    }

    async fn active_users_by_team(&self, team_name: &str) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active)
            .cloned()
            .collect())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
        user.is_active = is_active;
        Ok(user.clone())
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn create_team_with_members(&self, team: &Team) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.teams.insert(team.name.clone()) {
            return Err(Error::TeamExists(team.name.clone()));
        }

        for member in &team.members {
            let user = User {
                team_name: team.name.clone(),
                ..member.clone()
            };
            state.users.insert(user.id.clone(), user);
        }
        Ok(())
    }

    async fn get_team(&self, name: &str) -> Result<Team> {
        let state = self.state.read().await;
        if !state.teams.contains(name) {
            return Err(Error::NotFound(format!("team {name}")));
        }

        Ok(Team {
            name: name.to_string(),
            members: state
                .users
                .values()
                .filter(|u| u.team_name == name)
                .cloned()
                .collect(),
        })
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
        let mut state = self.state.write().await;
        if state.pull_requests.contains_key(&pr.id) {
            return Err(Error::PrExists(pr.id.clone()));
        }
        state.pull_requests.insert(
            pr.id.clone(),
            PullRequest {
                version: 0,
                ..pr.clone()
            },
        );
        Ok(())
    }

    async fn get_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let state = self.state.read().await;
        state
            .pull_requests
            .get(pr_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("pull request {pr_id}")))
    }

    async fn merge_pull_request(
        &self,
        pr_id: &str,
        merged_at: DateTime<Utc>,
    ) -> Result<PullRequest> {
        let mut state = self.state.write().await;
        let pr = state
            .pull_requests
            .get_mut(pr_id)
            .ok_or_else(|| Error::NotFound(format!("pull request {pr_id}")))?;
        if pr.merge(merged_at) {
            pr.version += 1;
        }
        Ok(pr.clone())
    }

    async fn replace_reviewer(&self, swap: &ReviewerSwap) -> Result<()> {
        let mut state = self.state.write().await;
        let pr = state
            .pull_requests
            .get_mut(&swap.pr_id)
            .ok_or_else(|| Error::NotFound(format!("pull request {}", swap.pr_id)))?;

        if pr.is_merged() {
            return Err(Error::PrMerged(pr.id.clone()));
        }
        if pr.version != swap.expected_version {
            return Err(Error::Conflict(pr.id.clone()));
        }
        if !pr.has_reviewer(&swap.old_reviewer_id) {
            return Err(Error::NotAssigned {
                pr_id: pr.id.clone(),
                user_id: swap.old_reviewer_id.clone(),
            });
        }
        if !pr.replace_reviewer(&swap.old_reviewer_id, &swap.new_reviewer_id) {
            return Err(Error::Conflict(pr.id.clone()));
        }
        pr.version += 1;
        Ok(())
    }

    async fn pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let state = self.state.read().await;
        let mut prs: Vec<&PullRequest> = state
            .pull_requests
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .collect();
        prs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(prs.into_iter().map(PullRequest::short).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_team() -> Team {
        Team::new("backend")
            .with_member(User::new("u1", "Alice", ""))
            .with_member(User::new("u2", "Bob", ""))
            .with_member(User::new("u3", "Carol", "").with_active(false))
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let store = InMemoryStore::new();
        store.create_team_with_members(&backend_team()).await.unwrap();

        let team = store.get_team("backend").await.unwrap();
        assert_eq!(team.members.len(), 3);
        assert_eq!(team.members[0].id, "u1");
        assert_eq!(team.members[2].team_name, "backend");
    }

    #[tokio::test]
    async fn test_duplicate_team_leaves_members_alone() {
        let store = InMemoryStore::new();
        store.create_team_with_members(&backend_team()).await.unwrap();

        let again = Team::new("backend").with_member(User::new("u1", "Renamed", ""));
        let err = store.create_team_with_members(&again).await.unwrap_err();
        assert!(matches!(err, Error::TeamExists(_)));
        assert_eq!(store.get_user("u1").await.unwrap().username, "Alice");
    }

    #[tokio::test]
    async fn test_member_moves_between_teams() {
        let store = InMemoryStore::new();
        store.create_team_with_members(&backend_team()).await.unwrap();

        let frontend = Team::new("frontend").with_member(User::new("u2", "Bob", ""));
        store.create_team_with_members(&frontend).await.unwrap();

        assert_eq!(store.get_user("u2").await.unwrap().team_name, "frontend");
        assert_eq!(store.get_team("backend").await.unwrap().members.len(), 2);
    }

    #[tokio::test]
    async fn test_active_users_and_toggle() {
        let store = InMemoryStore::new();
        store.create_team_with_members(&backend_team()).await.unwrap();

        let active = store.active_users_by_team("backend").await.unwrap();
        assert_eq!(active.len(), 2);

        let carol = store.set_user_active("u3", true).await.unwrap();
        assert!(carol.is_active);
        assert_eq!(store.active_users_by_team("backend").await.unwrap().len(), 3);

        assert!(matches!(
            store.set_user_active("ghost", true).await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(store.active_users_by_team("nobody").await.unwrap().is_empty());
    }

    fn pr() -> PullRequest {
        PullRequest::new("pr-1", "Feature", "u1").with_reviewers(vec!["u2".into(), "u3".into()])
    }

    #[tokio::test]
    async fn test_duplicate_pull_request() {
        let store = InMemoryStore::new();
        store.create_pull_request(&pr()).await.unwrap();
        let err = store.create_pull_request(&pr()).await.unwrap_err();
        assert!(matches!(err, Error::PrExists(_)));
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let store = InMemoryStore::new();
        store.create_pull_request(&pr()).await.unwrap();

        let at = Utc::now();
        let merged = store.merge_pull_request("pr-1", at).await.unwrap();
        assert!(merged.is_merged());
        assert_eq!(merged.merged_at, Some(at));

        let again = store
            .merge_pull_request("pr-1", at + chrono::Duration::seconds(3))
            .await
            .unwrap();
        assert_eq!(again, merged);

        assert!(matches!(
            store.merge_pull_request("nope", at).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_replace_reviewer_compare_and_swap() {
        let store = InMemoryStore::new();
        store.create_pull_request(&pr()).await.unwrap();

        let swap = ReviewerSwap {
            pr_id: "pr-1".into(),
            old_reviewer_id: "u2".into(),
            new_reviewer_id: "u4".into(),
            expected_version: 0,
        };
        store.replace_reviewer(&swap).await.unwrap();

        let stored = store.get_pull_request("pr-1").await.unwrap();
        assert_eq!(stored.reviewers, vec!["u4", "u3"]);
        assert_eq!(stored.version, 1);

        // Stale version: the first swap already moved it on.
        let stale = ReviewerSwap {
            old_reviewer_id: "u3".into(),
            new_reviewer_id: "u5".into(),
            ..swap.clone()
        };
        assert!(matches!(
            store.replace_reviewer(&stale).await.unwrap_err(),
            Error::Conflict(_)
        ));

        let not_assigned = ReviewerSwap {
            expected_version: 1,
            ..swap
        };
        assert!(matches!(
            store.replace_reviewer(&not_assigned).await.unwrap_err(),
            Error::NotAssigned { .. }
        ));
    }

    #[tokio::test]
    async fn test_replace_reviewer_on_merged() {
        let store = InMemoryStore::new();
        store.create_pull_request(&pr()).await.unwrap();
        store.merge_pull_request("pr-1", Utc::now()).await.unwrap();

        let swap = ReviewerSwap {
            pr_id: "pr-1".into(),
            old_reviewer_id: "u2".into(),
            new_reviewer_id: "u4".into(),
            expected_version: 1,
        };
        assert!(matches!(
            store.replace_reviewer(&swap).await.unwrap_err(),
            Error::PrMerged(_)
        ));
        let stored = store.get_pull_request("pr-1").await.unwrap();
        assert_eq!(stored.reviewers, vec!["u2", "u3"]);
    }

    #[tokio::test]
    async fn test_reviews_listing() {
        let store = InMemoryStore::new();
        store.create_pull_request(&pr()).await.unwrap();
        let other = PullRequest::new("pr-2", "Other", "u2").with_reviewers(vec!["u3".into()]);
        store.create_pull_request(&other).await.unwrap();

        let reviews = store.pull_requests_by_reviewer("u3").await.unwrap();
        let ids: Vec<_> = reviews.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pr-1", "pr-2"]);

        assert!(store.pull_requests_by_reviewer("u1").await.unwrap().is_empty());
    }
}
