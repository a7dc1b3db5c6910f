//! Repository modules for database operations

pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestRepo;
pub use teams::TeamRepo;
pub use users::UserRepo;

use roster_core::User;

/// Row shape shared by the user and team queries
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}
