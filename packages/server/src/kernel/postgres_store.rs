//! PostgreSQL-backed review store.
//!
//! Row-level mutual exclusion comes from `SELECT ... FOR UPDATE` inside a
//! `sqlx::Transaction`; uniqueness and referential integrity are enforced by
//! the schema in `migrations/`.

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::{PgPool, Postgres, Transaction};

use crate::common::Resource;
use crate::domains::pull_requests::{NewPullRequest, PullRequest, PullRequestShort};
use crate::domains::teams::{Team, TeamMember};
use crate::domains::users::User;
use crate::kernel::{BaseReviewStore, BaseStoreTx, StoreError};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }
        match violation(&err) {
            // A dangling author/team reference means the referenced row is absent.
            Some(ErrorKind::ForeignKeyViolation) => StoreError::NotFound,
            _ => StoreError::Database(err),
        }
    }
}

fn violation(err: &sqlx::Error) -> Option<ErrorKind> {
    match err {
        sqlx::Error::Database(db) => Some(db.kind()),
        _ => None,
    }
}

/// Error mapper for INSERTs: unique violations become `AlreadyExists(resource)`.
fn insert_error(resource: Resource) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| match violation(&err) {
        Some(ErrorKind::UniqueViolation) => StoreError::AlreadyExists(resource),
        _ => err.into(),
    }
}

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseReviewStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn BaseStoreTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTx { tx }))
    }

    async fn create_team(&self, team: &Team) -> Result<(), StoreError> {
        // Use a transaction so a conflicting member leaves no half-created team
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (team_name) VALUES ($1)")
            .bind(&team.team_name)
            .execute(&mut *tx)
            .await
            .map_err(insert_error(Resource::Team))?;

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(&team.team_name)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await
            .map_err(insert_error(Resource::User))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> Result<Team, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = $1)")
                .bind(team_name)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT user_id, username, is_active
            FROM users
            WHERE team_name = $1
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(Team::new(team_name, members))
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET is_active = $2
            WHERE user_id = $1
            RETURNING user_id, username, team_name, is_active
            "#,
        )
        .bind(user_id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list_prs_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, StoreError> {
        sqlx::query_as::<_, PullRequestShort>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status
            FROM pull_requests
            WHERE assigned_reviewers @> ARRAY[$1]::TEXT[]
            ORDER BY created_at DESC, pull_request_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BaseStoreTx for PostgresTx {
    async fn get_user(&mut self, user_id: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(Into::into)
    }

    async fn list_team_members(&mut self, team_name: &str) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = $1
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(Into::into)
    }

    async fn insert_pull_request(&mut self, pr: &NewPullRequest) -> Result<PullRequest, StoreError> {
        sqlx::query_as::<_, PullRequest>(
            r#"
            INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, assigned_reviewers)
            VALUES ($1, $2, $3, 'OPEN', $4)
            RETURNING pull_request_id, pull_request_name, author_id, status, assigned_reviewers, created_at, merged_at
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(&pr.assigned_reviewers)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(insert_error(Resource::PullRequest))
    }

    async fn get_pull_request_for_update(
        &mut self,
        pull_request_id: &str,
    ) -> Result<PullRequest, StoreError> {
        sqlx::query_as::<_, PullRequest>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, assigned_reviewers, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = $1
            FOR UPDATE
            "#,
        )
        .bind(pull_request_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(Into::into)
    }

    async fn update_pull_request(&mut self, pr: &PullRequest) -> Result<PullRequest, StoreError> {
        sqlx::query_as::<_, PullRequest>(
            r#"
            UPDATE pull_requests
            SET status = $2,
                assigned_reviewers = $3,
                merged_at = $4
            WHERE pull_request_id = $1
            RETURNING pull_request_id, pull_request_name, author_id, status, assigned_reviewers, created_at, merged_at
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(pr.status)
        .bind(&pr.assigned_reviewers)
        .bind(pr.merged_at)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
