use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::CatalogDetail,
};

/// Creates a Redis client for the recommendation cache
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// One user's cached recommendation list, overwritten wholesale on
/// regeneration ("last generation wins")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedRecommendations {
    pub recommendations: Vec<CatalogDetail>,
    pub generated_at: DateTime<Utc>,
}

impl CachedRecommendations {
    pub fn new(recommendations: Vec<CatalogDetail>) -> Self {
        Self {
            recommendations,
            generated_at: Utc::now(),
        }
    }
}

/// Backing store seam for cached recommendation entries, one per user
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationCacheStore: Send + Sync {
    async fn read_entry(&self, user_id: Uuid) -> AppResult<Option<CachedRecommendations>>;

    /// Upsert keyed by user id, unconditional overwrite
    async fn write_entry(&self, user_id: Uuid, entry: CachedRecommendations) -> AppResult<()>;
}

/// Redis-backed recommendation cache.
///
/// Entries are JSON values keyed `recs:{user_id}`. With no TTL configured,
/// entries live until the next generation overwrites them.
#[derive(Clone)]
pub struct RedisRecommendationCache {
    redis_client: Client,
    ttl_secs: Option<u64>,
}

impl RedisRecommendationCache {
    pub fn new(redis_client: Client, ttl_secs: Option<u64>) -> Self {
        Self {
            redis_client,
            ttl_secs,
        }
    }

    fn cache_key(user_id: Uuid) -> String {
        format!("recs:{}", user_id)
    }
}

#[async_trait::async_trait]
impl RecommendationCacheStore for RedisRecommendationCache {
    async fn read_entry(&self, user_id: Uuid) -> AppResult<Option<CachedRecommendations>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let cached: Option<String> = conn.get(Self::cache_key(user_id)).await?;

        match cached {
            Some(json) => {
                let entry: CachedRecommendations = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn write_entry(&self, user_id: Uuid, entry: CachedRecommendations) -> AppResult<()> {
        let json = serde_json::to_string(&entry)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let key = Self::cache_key(user_id);

        match self.ttl_secs {
            Some(ttl) => {
                let _: () = conn.set_ex(&key, json, ttl).await?;
            }
            None => {
                let _: () = conn.set(&key, json).await?;
            }
        }

        tracing::debug!(user_id = %user_id, ttl = ?self.ttl_secs, "Cached recommendations");

        Ok(())
    }
}
