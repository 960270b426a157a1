use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{MediaKind, PreferenceKind, PreferenceRecord},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Persistence seam for user preference records.
///
/// Records are keyed by (user_id, media_id, preference): a media item may be
/// both liked and watchlisted at once. The store does not enforce like/dislike
/// exclusivity; that is deliberately left to callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Media ids the user recorded with the given preference and media kind
    async fn fetch_ids(
        &self,
        user_id: Uuid,
        preference: PreferenceKind,
        media: MediaKind,
    ) -> AppResult<Vec<i64>>;

    /// Inserts or updates one preference record
    async fn upsert(&self, record: PreferenceRecord) -> AppResult<()>;

    /// Removes one preference record
    async fn delete(&self, user_id: Uuid, media_id: i64, preference: PreferenceKind)
        -> AppResult<()>;
}

/// PostgreSQL-backed preference store over `user_media_preferences`
#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn fetch_ids(
        &self,
        user_id: Uuid,
        preference: PreferenceKind,
        media: MediaKind,
    ) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT media_id
            FROM user_media_preferences
            WHERE user_id = $1 AND preference = $2 AND media_kind = $3
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .bind(preference.as_str())
        .bind(media.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn upsert(&self, record: PreferenceRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_media_preferences (user_id, media_id, preference, media_kind)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, media_id, preference)
            DO UPDATE SET media_kind = EXCLUDED.media_kind
            "#,
        )
        .bind(record.user_id)
        .bind(record.media.id)
        .bind(record.preference.as_str())
        .bind(record.media.kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(
        &self,
        user_id: Uuid,
        media_id: i64,
        preference: PreferenceKind,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM user_media_preferences
            WHERE user_id = $1 AND media_id = $2 AND preference = $3
            "#,
        )
        .bind(user_id)
        .bind(media_id)
        .bind(preference.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
