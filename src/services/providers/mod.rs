/// External collaborator abstractions
///
/// The catalog API and the recommendation generator are both opaque remote
/// services. These traits are the seams the aggregation and recommendation
/// services depend on, so tests can substitute in-memory collaborators.
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CatalogDetail, MediaRef},
};

pub mod recommender;
pub mod tmdb;

pub use recommender::RecommenderClient;
pub use tmdb::TmdbClient;

/// Resolves a media identity to a full catalog detail snapshot.
///
/// Stateless and idempotent; batch callers treat per-item failures as
/// skippable.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_detail(&self, media: MediaRef) -> AppResult<CatalogDetail>;
}

/// Generation outcome reported by the external recommender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorStatus {
    Ok,
    NotFound,
}

/// One bare recommended id; hydration into details happens downstream
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecommendedId {
    pub id: i64,
}

/// Raw response from the recommendation generator.
///
/// Ordering of `recommendations` carries the generator's relevance ranking
/// and must be preserved through hydration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorResponse {
    pub status: GeneratorStatus,
    #[serde(default)]
    pub recommendations: Vec<RecommendedId>,
}

/// Opaque external recommendation generator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationEngine: Send + Sync {
    /// Generates candidate ids from the user's like/dislike history.
    ///
    /// `user_id` is passed for logging only; the generator's input is the id
    /// history itself.
    async fn generate(
        &self,
        user_id: Uuid,
        liked_ids: Vec<i64>,
        disliked_ids: Vec<i64>,
    ) -> AppResult<GeneratorResponse>;
}
