use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use tracing::{error, info};

use super::{LocalProfile, NewProfile, ProfileStore, Role, StorageError};
use crate::config::DatabaseConfig;

const PROFILE_COLUMNS: &str = "id, user_id, email, fullname, role, avatar, created_at, updated_at";

// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed profile store over the `user_profiles` table
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await
            .map_err(|e| StorageError::ConnectionError(e.to_string()))?;

        info!("Created profile database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Create the profile table when missing; safe to run on every start
    pub async fn migrate(&self) -> Result<(), StorageError> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id     UUID NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                fullname    TEXT NOT NULL,
                role        TEXT NOT NULL DEFAULT 'USER',
                avatar      TEXT,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#;

        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(())
    }
}

fn profile_from_row(row: &PgRow) -> Result<LocalProfile, StorageError> {
    let role: String = row.try_get("role")?;
    let role = role.parse::<Role>().map_err(StorageError::QueryError)?;

    Ok(LocalProfile {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        email: row.try_get("email")?,
        fullname: row.try_get("fullname")?,
        role,
        avatar: row.try_get("avatar")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_insert_error(err: sqlx::Error, profile: &NewProfile) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StorageError::Duplicate(format!(
                "profile for user {} or email {} already exists",
                profile.user_id, profile.email
            ));
        }
    }
    error!("Failed to insert profile for user {}: {}", profile.user_id, err);
    StorageError::Sqlx(err)
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn create_profile(&self, profile: NewProfile) -> Result<LocalProfile, StorageError> {
        let query = format!(
            r#"
            INSERT INTO user_profiles (user_id, email, fullname, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(profile.user_id)
            .bind(&profile.email)
            .bind(&profile.fullname)
            .bind(profile.role.as_str())
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &profile))?;

        profile_from_row(&row)
    }

    async fn profile_by_email(&self, email: &str) -> Result<Option<LocalProfile>, StorageError> {
        let query = format!(
            "SELECT {} FROM user_profiles WHERE lower(email) = lower($1) LIMIT 1",
            PROFILE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
