//! Repository for teams and their membership

use async_trait::async_trait;
use roster_core::{Error, Result, Team, TeamStore, User};
use sqlx::SqlitePool;

use super::UserRow;
use crate::error::{internal, is_unique_violation};

/// Repository for managing teams
#[derive(Clone)]
pub struct TeamRepo {
    pool: SqlitePool,
}

impl TeamRepo {
    /// Create a new team repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamStore for TeamRepo {
    async fn create_team_with_members(&self, team: &Team) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        sqlx::query("INSERT INTO teams (name) VALUES (?)")
            .bind(&team.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::TeamExists(team.name.clone())
                } else {
                    internal(e)
                }
            })?;

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (id, username, team_name, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (id) DO UPDATE
                SET username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&member.id)
            .bind(&member.username)
            .bind(&team.name)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        }

        tx.commit().await.map_err(internal)?;
        Ok(())
    }

    async fn get_team(&self, name: &str) -> Result<Team> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT name FROM teams WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        if exists.is_none() {
            return Err(Error::NotFound(format!("team {name}")));
        }

        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, team_name, is_active FROM users WHERE team_name = ? ORDER BY id",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        Ok(Team {
            name: name.to_string(),
            members: rows.into_iter().map(User::from).collect(),
        })
    }
}
