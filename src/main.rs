use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use watchlog_api::api::{create_router, AppState};
use watchlog_api::config::Config;
use watchlog_api::db::{
    create_pool, create_redis_client, PgPreferenceStore, RedisRecommendationCache,
};
use watchlog_api::services::providers::{RecommenderClient, TmdbClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;

    let state = AppState::new(
        Arc::new(PgPreferenceStore::new(pool)),
        Arc::new(TmdbClient::new(
            config.catalog_api_key.clone(),
            config.catalog_api_url.clone(),
        )),
        Arc::new(RecommenderClient::new(config.recommender_url.clone())),
        Arc::new(RedisRecommendationCache::new(
            redis_client,
            config.recommendation_ttl_secs,
        )),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
