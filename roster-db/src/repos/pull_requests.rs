//! Repository for pull requests and their reviewers

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::{
    Error, PrStatus, PullRequest, PullRequestShort, PullRequestStore, Result, ReviewerSwap,
};
use sqlx::{Sqlite, SqlitePool};

use crate::error::{internal, is_unique_violation};

/// Pull request row without reviewers
#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    id: String,
    name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    version: i64,
}

impl PullRequestRow {
    fn into_model(self, reviewers: Vec<String>) -> Result<PullRequest> {
        Ok(PullRequest {
            id: self.id,
            name: self.name,
            author_id: self.author_id,
            status: self.status.parse()?,
            created_at: self.created_at,
            merged_at: self.merged_at,
            reviewers,
            version: self.version,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PullRequestShortRow {
    id: String,
    name: String,
    author_id: String,
    status: String,
}

const SELECT_PULL_REQUEST: &str = r#"
    SELECT id, name, author_id, status, created_at, merged_at, version
    FROM pull_requests WHERE id = ?
"#;

/// Reviewer ids of a pull request in assignment order
async fn fetch_reviewers<'e, E>(executor: E, pr_id: &str) -> Result<Vec<String>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, String>(
        "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY position",
    )
    .bind(pr_id)
    .fetch_all(executor)
    .await
    .map_err(internal)
}

/// Repository for managing pull requests
#[derive(Clone)]
pub struct PullRequestRepo {
    pool: SqlitePool,
}

impl PullRequestRepo {
    /// Create a new pull request repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PullRequestStore for PullRequestRepo {
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (id, name, author_id, status, created_at, merged_at, version)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&pr.id)
        .bind(&pr.name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::PrExists(pr.id.clone())
            } else {
                internal(e)
            }
        })?;

        for (position, reviewer_id) in pr.reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pr_reviewers (pull_request_id, reviewer_id, position) VALUES (?, ?, ?)",
            )
            .bind(&pr.id)
            .bind(reviewer_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        }

        tx.commit().await.map_err(internal)?;
        Ok(())
    }

    async fn get_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let row = sqlx::query_as::<_, PullRequestRow>(SELECT_PULL_REQUEST)
            .bind(pr_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or_else(|| Error::NotFound(format!("pull request {pr_id}")))?;

        let reviewers = fetch_reviewers(&self.pool, pr_id).await?;
        row.into_model(reviewers)
    }

    async fn merge_pull_request(
        &self,
        pr_id: &str,
        merged_at: DateTime<Utc>,
    ) -> Result<PullRequest> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // Only an open pull request transitions; a merged one keeps its merged_at
        sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = 'MERGED', merged_at = ?, version = version + 1
            WHERE id = ? AND status = 'OPEN'
            "#,
        )
        .bind(merged_at)
        .bind(pr_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;

        let row = sqlx::query_as::<_, PullRequestRow>(SELECT_PULL_REQUEST)
            .bind(pr_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(internal)?
            .ok_or_else(|| Error::NotFound(format!("pull request {pr_id}")))?;
        let reviewers = fetch_reviewers(&mut *tx, pr_id).await?;

        tx.commit().await.map_err(internal)?;
        row.into_model(reviewers)
    }

    async fn replace_reviewer(&self, swap: &ReviewerSwap) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // Claim the write lock and check the version in one statement
        let claimed = sqlx::query(
            r#"
            UPDATE pull_requests SET version = version + 1
            WHERE id = ? AND status = 'OPEN' AND version = ?
            "#,
        )
        .bind(&swap.pr_id)
        .bind(swap.expected_version)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;

        if claimed.rows_affected() == 0 {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM pull_requests WHERE id = ?")
                    .bind(&swap.pr_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(internal)?;

            return Err(match status.as_deref().map(str::parse::<PrStatus>) {
                None => Error::NotFound(format!("pull request {}", swap.pr_id)),
                Some(Ok(PrStatus::Merged)) => Error::PrMerged(swap.pr_id.clone()),
                Some(Ok(PrStatus::Open)) => Error::Conflict(swap.pr_id.clone()),
                Some(Err(e)) => e,
            });
        }

        let swapped = sqlx::query(
            r#"
            UPDATE pr_reviewers SET reviewer_id = ?
            WHERE pull_request_id = ? AND reviewer_id = ?
            "#,
        )
        .bind(&swap.new_reviewer_id)
        .bind(&swap.pr_id)
        .bind(&swap.old_reviewer_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(swap.pr_id.clone())
            } else {
                internal(e)
            }
        })?;

        if swapped.rows_affected() == 0 {
            return Err(Error::NotAssigned {
                pr_id: swap.pr_id.clone(),
                user_id: swap.old_reviewer_id.clone(),
            });
        }

        tx.commit().await.map_err(internal)?;
        Ok(())
    }

    async fn pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let rows = sqlx::query_as::<_, PullRequestShortRow>(
            r#"
            SELECT pr.id, pr.name, pr.author_id, pr.status
            FROM pull_requests pr
            JOIN pr_reviewers rev ON pr.id = rev.pull_request_id
            WHERE rev.reviewer_id = ?
            ORDER BY pr.created_at, pr.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        rows.into_iter()
            .map(|row| {
                Ok(PullRequestShort {
                    id: row.id,
                    name: row.name,
                    author_id: row.author_id,
                    status: row.status.parse()?,
                })
            })
            .collect()
    }
}
