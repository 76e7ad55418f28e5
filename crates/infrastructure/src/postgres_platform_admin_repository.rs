use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use warden_application::PlatformAdminRepository;
use warden_core::{AppError, AppResult};
use warden_domain::PlatformAdmin;

use crate::postgres_support::{is_unique_violation, storage_error};

/// PostgreSQL-backed repository for the platform administrator registry.
#[derive(Clone)]
pub struct PostgresPlatformAdminRepository {
    pool: PgPool,
}

impl PostgresPlatformAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PlatformAdminRow {
    user_id: String,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl PlatformAdminRow {
    fn into_admin(self) -> PlatformAdmin {
        PlatformAdmin {
            user_id: self.user_id,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl PlatformAdminRepository for PostgresPlatformAdminRepository {
    async fn insert_admin(&self, admin: PlatformAdmin) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO platform_admins (user_id, created_by, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(admin.user_id.as_str())
        .bind(admin.created_by.as_deref())
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "user '{}' is already a platform admin",
                    admin.user_id
                ));
            }

            storage_error("failed to insert platform admin", error)
        })?;

        Ok(())
    }

    async fn find_admin(&self, user_id: &str) -> AppResult<Option<PlatformAdmin>> {
        let row = sqlx::query_as::<_, PlatformAdminRow>(
            r#"
            SELECT user_id, created_by, created_at
            FROM platform_admins
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load platform admin", error))?;

        Ok(row.map(PlatformAdminRow::into_admin))
    }

    async fn list_admins(&self) -> AppResult<Vec<PlatformAdmin>> {
        let rows = sqlx::query_as::<_, PlatformAdminRow>(
            r#"
            SELECT user_id, created_by, created_at
            FROM platform_admins
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error("failed to list platform admins", error))?;

        Ok(rows.into_iter().map(PlatformAdminRow::into_admin).collect())
    }

    async fn delete_admin(&self, user_id: &str) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error("failed to begin transaction", error))?;

        let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM platform_admins")
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| storage_error("failed to count platform admins", error))?;

        if remaining <= 1 {
            return Err(AppError::Conflict(
                "cannot remove the last platform admin".to_owned(),
            ));
        }

        sqlx::query("DELETE FROM platform_admins WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error("failed to delete platform admin", error))?;

        transaction
            .commit()
            .await
            .map_err(|error| storage_error("failed to commit transaction", error))
    }

    async fn is_platform_admin(&self, user_id: &str) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM platform_admins WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| storage_error("failed to check platform admin", error))?;

        Ok(count > 0)
    }
}
