//! Repository for user records

use async_trait::async_trait;
use roster_core::{Error, Result, User, UserStore};
use sqlx::SqlitePool;

use super::UserRow;
use crate::error::internal;

/// Repository for managing users
#[derive(Clone)]
pub struct UserRepo {
    pool: SqlitePool,
}

impl UserRepo {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, team_name, is_active FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .map(User::from)
        .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
    }

    async fn active_users_by_team(&self, team_name: &str) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, team_name, is_active FROM users
            WHERE team_name = ? AND is_active = 1
            ORDER BY id
            "#,
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET is_active = ? WHERE id = ?
            RETURNING id, username, team_name, is_active
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .map(User::from)
        .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
    }
}
