//! Domain model: users, teams and pull requests

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: String,

    /// Display name
    pub username: String,

    /// Name of the team the user belongs to
    pub team_name: String,

    /// Inactive users are never picked as reviewers
    pub is_active: bool,
}

impl User {
    /// Create an active user in the given team
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        team_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            team_name: team_name.into(),
            is_active: true,
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A named group of users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team name
    pub name: String,

    /// Members of the team; order carries no meaning
    pub members: Vec<User>,
}

impl Team {
    /// Create a team with no members
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member, re-homing it into this team
    pub fn with_member(mut self, mut user: User) -> Self {
        user.team_name = self.name.clone();
        self.members.push(user);
        self
    }

    /// Active members of the team
    pub fn active_members(&self) -> impl Iterator<Item = &User> {
        self.members.iter().filter(|u| u.is_active)
    }
}

/// Pull request status
///
/// `Open` is the initial state and `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// Check if a transition to `to` is valid
    pub fn can_transition_to(&self, to: PrStatus) -> bool {
        matches!((self, to), (PrStatus::Open, PrStatus::Merged))
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::internal(format!(
                "unknown pull request status: {other}"
            ))),
        }
    }
}

/// A pull request and its reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Unique pull request identifier
    pub id: String,

    /// Title
    pub name: String,

    /// Author user id; never one of the reviewers
    pub author_id: String,

    pub status: PrStatus,

    pub created_at: DateTime<Utc>,

    /// Set exactly once, when the pull request is merged
    pub merged_at: Option<DateTime<Utc>>,

    /// Reviewer ids in assignment order, without duplicates
    pub reviewers: Vec<String>,

    /// Bumped by the store on every mutation; used for compare-and-swap writes
    #[serde(skip)]
    pub version: i64,
}

impl PullRequest {
    /// Create an open pull request with no reviewers
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            created_at: Utc::now(),
            merged_at: None,
            reviewers: Vec::new(),
            version: 0,
        }
    }

    /// Set the reviewer list
    pub fn with_reviewers(mut self, reviewers: Vec<String>) -> Self {
        self.reviewers = reviewers;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == PrStatus::Open
    }

    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.reviewers.iter().any(|r| r == user_id)
    }

    /// Transition to `Merged`, stamping `merged_at`
    ///
    /// Returns false without touching anything if the pull request is
    /// already merged.
    pub fn merge(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(PrStatus::Merged) {
            return false;
        }
        self.status = PrStatus::Merged;
        self.merged_at = Some(at);
        true
    }

    /// Swap `old` for `new` in place, keeping every other reviewer's position
    ///
    /// Returns false if `old` is not a reviewer or `new` already is one.
    pub fn replace_reviewer(&mut self, old: &str, new: &str) -> bool {
        if self.has_reviewer(new) {
            return false;
        }
        match self.reviewers.iter_mut().find(|r| r.as_str() == old) {
            Some(slot) => {
                *slot = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Summary view used by reviewer listings
    pub fn short(&self) -> PullRequestShort {
        PullRequestShort {
            id: self.id.clone(),
            name: self.name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Pull request summary without reviewers or timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub status: PrStatus,
}
