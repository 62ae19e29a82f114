use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{NewProfile, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique email constraint rejected the insert.
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence for users and their profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;

    /// Inserts the user and its profile atomically.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewProfile,
    ) -> Result<User, StoreError>;

    /// Whether any profile carries the admin flag.
    async fn admin_exists(&self) -> anyhow::Result<bool>;

    /// Deletes the user and, by cascade, its profile. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewProfile,
    ) -> Result<User, StoreError> {
        let mut tx = self.db.begin().await.map_err(anyhow::Error::from)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail
            } else {
                StoreError::Backend(e.into())
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, name, lastname, birthday, picture, college, review, admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(profile.name)
        .bind(profile.lastname)
        .bind(profile.birthday)
        .bind(profile.picture)
        .bind(profile.college)
        .bind(profile.review)
        .bind(profile.admin)
        .execute(&mut *tx)
        .await
        .map_err(anyhow::Error::from)?;

        tx.commit().await.map_err(anyhow::Error::from)?;
        Ok(user)
    }

    async fn admin_exists(&self) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM profiles WHERE admin)"#)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
