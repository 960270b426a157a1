pub mod postgres;
pub mod recommendation_cache;

pub use postgres::{create_pool, PgPreferenceStore, PreferenceStore};
pub use recommendation_cache::{
    create_redis_client, CachedRecommendations, RecommendationCacheStore, RedisRecommendationCache,
};

#[cfg(test)]
pub use postgres::MockPreferenceStore;
#[cfg(test)]
pub use recommendation_cache::MockRecommendationCacheStore;
