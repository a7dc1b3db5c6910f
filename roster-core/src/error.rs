//! Error types for Roster

use thiserror::Error;

/// Result type alias for Roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Roster operations
///
/// The business variants are terminal outcomes reported to the caller as-is.
/// Store failures that do not map onto one of them travel as `Internal`.
#[derive(Error, Debug)]
pub enum Error {
    /// Team, user or pull request does not exist
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A team with this name already exists
    #[error("team already exists: {0}")]
    TeamExists(String),

    /// A pull request with this id already exists
    #[error("pull request already exists: {0}")]
    PrExists(String),

    /// The pull request is merged and can no longer change reviewers
    #[error("pull request is already merged: {0}")]
    PrMerged(String),

    /// The user is not a reviewer of the pull request
    #[error("user {user_id} is not assigned as a reviewer of {pr_id}")]
    NotAssigned { pr_id: String, user_id: String },

    /// No active teammate is eligible for review
    #[error("no active candidates available for review of {0}")]
    NoCandidate(String),

    /// The pull request changed between read and write
    #[error("pull request {0} was modified concurrently")]
    Conflict(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unclassified store failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap any displayable store failure as `Internal`
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Error::Internal(err.to_string())
    }

    /// Machine-readable code used by the transport layer
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NOT_FOUND",
            Error::TeamExists(_) => "TEAM_EXISTS",
            Error::PrExists(_) => "PR_EXISTS",
            Error::PrMerged(_) => "PR_MERGED",
            Error::NotAssigned { .. } => "NOT_ASSIGNED",
            Error::NoCandidate(_) => "NO_CANDIDATE",
            Error::Conflict(_) => "CONFLICT",
            Error::Io(_) | Error::Config(_) | Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is a business outcome rather than an infrastructure failure
    pub fn is_business(&self) -> bool {
        self.code() != "INTERNAL_ERROR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Error::NotFound("u1".into()).code(), "NOT_FOUND");
        assert_eq!(Error::PrMerged("pr-1".into()).code(), "PR_MERGED");
        assert_eq!(
            Error::NotAssigned {
                pr_id: "pr-1".into(),
                user_id: "u9".into()
            }
            .code(),
            "NOT_ASSIGNED"
        );
        assert_eq!(Error::internal("disk full").code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_business_classification() {
        assert!(Error::NoCandidate("pr-1".into()).is_business());
        assert!(Error::Conflict("pr-1".into()).is_business());
        assert!(!Error::internal("boom").is_business());
        assert!(!Error::Config("bad".into()).is_business());
    }

    #[test]
    fn test_not_assigned_message() {
        let err = Error::NotAssigned {
            pr_id: "pr-7".into(),
            user_id: "u3".into(),
        };
        assert_eq!(
            err.to_string(),
            "user u3 is not assigned as a reviewer of pr-7"
        );
    }
}
