use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{CachedRecommendations, PreferenceStore, RecommendationCacheStore},
    error::{AppError, AppResult},
    models::{CatalogDetail, MediaKind, MediaRef, PreferenceKind},
    services::{
        hydrate_details,
        providers::{CatalogFetcher, GeneratorStatus, RecommendationEngine},
        session::{SessionCache, SingleFlight},
    },
};

/// Read-through / write-through orchestration over the external
/// recommendation generator.
///
/// Generation is expensive (the generator walks the user's full like/dislike
/// history), so a cached entry is always preferred. Cache faults fail open:
/// a read error regenerates, a write error still returns the fresh list.
pub struct RecommendationService {
    preferences: Arc<dyn PreferenceStore>,
    catalog: Arc<dyn CatalogFetcher>,
    engine: Arc<dyn RecommendationEngine>,
    cache: Arc<dyn RecommendationCacheStore>,
    session: Arc<SessionCache>,
    flights: SingleFlight,
}

impl RecommendationService {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn CatalogFetcher>,
        engine: Arc<dyn RecommendationEngine>,
        cache: Arc<dyn RecommendationCacheStore>,
        session: Arc<SessionCache>,
    ) -> Self {
        Self {
            preferences,
            catalog,
            engine,
            cache,
            session,
            flights: SingleFlight::new(),
        }
    }

    /// Personalized recommendations, hydrated into full catalog details.
    ///
    /// Fails with `EmptyHistory` when the user has no movie like/dislike
    /// records, `Generation` when the generator returns no usable candidates,
    /// and `DetailResolution` when every hydration fails.
    pub async fn get_recommendations(&self, user_id: Uuid) -> AppResult<Arc<Vec<CatalogDetail>>> {
        if let Some(recommendations) = self.session.recommendations(user_id).await {
            tracing::debug!(user_id = %user_id, "Serving recommendations from session cache");
            return Ok(recommendations);
        }

        let flight = self.flights.lock_for(user_id);
        let _guard = flight.lock().await;

        // A concurrent caller may have finished while we waited
        if let Some(recommendations) = self.session.recommendations(user_id).await {
            return Ok(recommendations);
        }

        if let Some(cached) = self.read_cached(user_id).await {
            let cached = Arc::new(cached);
            self.session
                .store_recommendations(user_id, Arc::clone(&cached))
                .await;
            return Ok(cached);
        }

        let fresh = Arc::new(self.generate_and_cache(user_id).await?);
        self.session
            .store_recommendations(user_id, Arc::clone(&fresh))
            .await;

        Ok(fresh)
    }

    /// Backing-store lookup. Read failures and present-but-empty entries are
    /// both treated as misses: an empty cached list provides no value and may
    /// reflect a previously mis-cached failed generation.
    async fn read_cached(&self, user_id: Uuid) -> Option<Vec<CatalogDetail>> {
        match self.cache.read_entry(user_id).await {
            Ok(Some(entry)) if !entry.recommendations.is_empty() => {
                tracing::debug!(
                    user_id = %user_id,
                    count = entry.recommendations.len(),
                    generated_at = %entry.generated_at,
                    "Recommendation cache hit"
                );
                Some(entry.recommendations)
            }
            Ok(Some(_)) => {
                tracing::debug!(user_id = %user_id, "Cached entry empty, regenerating");
                None
            }
            Ok(None) => {
                tracing::debug!(user_id = %user_id, "Recommendation cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Cache read failed, regenerating");
                None
            }
        }
    }

    async fn generate_and_cache(&self, user_id: Uuid) -> AppResult<Vec<CatalogDetail>> {
        use MediaKind::Movie;
        use PreferenceKind::{Dislike, Like};

        let (liked_ids, disliked_ids) = tokio::try_join!(
            self.preferences.fetch_ids(user_id, Like, Movie),
            self.preferences.fetch_ids(user_id, Dislike, Movie),
        )?;

        if liked_ids.is_empty() && disliked_ids.is_empty() {
            return Err(AppError::EmptyHistory);
        }

        let generated = self.engine.generate(user_id, liked_ids, disliked_ids).await?;

        if generated.status != GeneratorStatus::Ok || generated.recommendations.is_empty() {
            return Err(AppError::Generation(
                "the recommender produced no candidates".to_string(),
            ));
        }

        let candidate_count = generated.recommendations.len();
        let refs = generated
            .recommendations
            .into_iter()
            .map(|rec| MediaRef::movie(rec.id))
            .collect();

        // Preserves the generator's relevance ordering
        let details = hydrate_details(&self.catalog, refs).await;

        if details.is_empty() {
            return Err(AppError::DetailResolution(format!(
                "none of {} recommended titles could be resolved",
                candidate_count
            )));
        }

        // Write-through is best effort: the fresh list is returned regardless
        if let Err(e) = self
            .cache
            .write_entry(user_id, CachedRecommendations::new(details.clone()))
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to cache recommendations");
        }

        tracing::info!(
            user_id = %user_id,
            recommended = details.len(),
            "Generated fresh recommendations"
        );

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockPreferenceStore, MockRecommendationCacheStore};
    use crate::models::Runtime;
    use crate::services::providers::{MockCatalogFetcher, MockRecommendationEngine, RecommendedId};
    use crate::services::providers::GeneratorResponse;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn movie_detail(id: i64) -> CatalogDetail {
        CatalogDetail {
            id,
            media_kind: MediaKind::Movie,
            title: format!("Movie {}", id),
            release_date: None,
            runtime: Runtime::Movie { minutes: 100 },
            genres: vec![],
            poster_path: None,
            overview: None,
        }
    }

    fn generated(ids: &[i64]) -> GeneratorResponse {
        GeneratorResponse {
            status: GeneratorStatus::Ok,
            recommendations: ids.iter().map(|&id| RecommendedId { id }).collect(),
        }
    }

    /// Store with some movie like history and nothing else
    fn store_with_history() -> MockPreferenceStore {
        let mut store = MockPreferenceStore::new();
        store
            .expect_fetch_ids()
            .withf(|_, preference, media| {
                *preference == PreferenceKind::Like && *media == MediaKind::Movie
            })
            .returning(|_, _, _| Ok(vec![1, 2]));
        store.expect_fetch_ids().returning(|_, _, _| Ok(vec![]));
        store
    }

    fn resolving_catalog() -> MockCatalogFetcher {
        let mut catalog = MockCatalogFetcher::new();
        catalog
            .expect_fetch_detail()
            .returning(|media| Ok(movie_detail(media.id)));
        catalog
    }

    fn service(
        store: MockPreferenceStore,
        catalog: MockCatalogFetcher,
        engine: MockRecommendationEngine,
        cache: MockRecommendationCacheStore,
    ) -> RecommendationService {
        RecommendationService::new(
            Arc::new(store),
            Arc::new(catalog),
            Arc::new(engine),
            Arc::new(cache),
            Arc::new(SessionCache::new()),
        )
    }

    #[tokio::test]
    async fn test_non_empty_cache_short_circuits_generator() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().with(eq(user)).returning(|_| {
            Ok(Some(CachedRecommendations::new(vec![
                movie_detail(42),
                movie_detail(43),
            ])))
        });

        // No expectations on store, engine or catalog: any call panics
        let service = service(
            MockPreferenceStore::new(),
            MockCatalogFetcher::new(),
            MockRecommendationEngine::new(),
            cache,
        );

        let recommendations = service.get_recommendations(user).await.unwrap();
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].id, 42);
    }

    #[tokio::test]
    async fn test_empty_cached_entry_regenerates() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache
            .expect_read_entry()
            .returning(|_| Ok(Some(CachedRecommendations::new(vec![]))));
        cache.expect_write_entry().returning(|_, _| Ok(()));

        let mut engine = MockRecommendationEngine::new();
        engine
            .expect_generate()
            .times(1)
            .returning(|_, _, _| Ok(generated(&[5])));

        let service = service(store_with_history(), resolving_catalog(), engine, cache);

        let recommendations = service.get_recommendations(user).await.unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].id, 5);
    }

    #[tokio::test]
    async fn test_cache_read_failure_fails_open() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache
            .expect_read_entry()
            .returning(|_| Err(AppError::Internal("redis unreachable".to_string())));
        cache.expect_write_entry().returning(|_, _| Ok(()));

        let mut engine = MockRecommendationEngine::new();
        engine
            .expect_generate()
            .times(1)
            .returning(|_, _, _| Ok(generated(&[9])));

        let service = service(store_with_history(), resolving_catalog(), engine, cache);

        let recommendations = service.get_recommendations(user).await.unwrap();
        assert_eq!(recommendations[0].id, 9);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_fresh_list() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().returning(|_| Ok(None));
        cache
            .expect_write_entry()
            .times(1)
            .returning(|_, _| Err(AppError::Internal("redis unreachable".to_string())));

        let mut engine = MockRecommendationEngine::new();
        engine
            .expect_generate()
            .returning(|_, _, _| Ok(generated(&[5, 3, 9])));

        let service = service(store_with_history(), resolving_catalog(), engine, cache);

        let recommendations = service.get_recommendations(user).await.unwrap();
        let ids: Vec<i64> = recommendations.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![5, 3, 9]);
    }

    #[tokio::test]
    async fn test_empty_history_fails_without_calling_generator() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().returning(|_| Ok(None));

        let mut store = MockPreferenceStore::new();
        store.expect_fetch_ids().returning(|_, _, _| Ok(vec![]));

        // Generator has no expectations: calling it panics
        let service = service(
            store,
            MockCatalogFetcher::new(),
            MockRecommendationEngine::new(),
            cache,
        );

        let result = service.get_recommendations(user).await;
        assert!(matches!(result, Err(AppError::EmptyHistory)));
    }

    #[tokio::test]
    async fn test_not_found_status_is_generation_error() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().returning(|_| Ok(None));

        let mut engine = MockRecommendationEngine::new();
        engine.expect_generate().returning(|_, _, _| {
            Ok(GeneratorResponse {
                status: GeneratorStatus::NotFound,
                recommendations: vec![],
            })
        });

        let service = service(
            store_with_history(),
            MockCatalogFetcher::new(),
            engine,
            cache,
        );

        let result = service.get_recommendations(user).await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[tokio::test]
    async fn test_all_hydration_failures_surface() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().returning(|_| Ok(None));

        let mut engine = MockRecommendationEngine::new();
        engine
            .expect_generate()
            .returning(|_, _, _| Ok(generated(&[5, 3])));

        let mut catalog = MockCatalogFetcher::new();
        catalog
            .expect_fetch_detail()
            .returning(|_| Err(AppError::NotFound("gone".to_string())));

        let service = service(store_with_history(), catalog, engine, cache);

        let result = service.get_recommendations(user).await;
        assert!(matches!(result, Err(AppError::DetailResolution(_))));
    }

    #[tokio::test]
    async fn test_partial_hydration_failure_keeps_survivor_order() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().returning(|_| Ok(None));
        cache.expect_write_entry().returning(|_, _| Ok(()));

        let mut engine = MockRecommendationEngine::new();
        engine
            .expect_generate()
            .returning(|_, _, _| Ok(generated(&[5, 3, 9])));

        let mut catalog = MockCatalogFetcher::new();
        catalog
            .expect_fetch_detail()
            .with(eq(MediaRef::movie(3)))
            .returning(|_| Err(AppError::NotFound("gone".to_string())));
        catalog
            .expect_fetch_detail()
            .returning(|media| Ok(movie_detail(media.id)));

        let service = service(store_with_history(), catalog, engine, cache);

        let recommendations = service.get_recommendations(user).await.unwrap();
        let ids: Vec<i64> = recommendations.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![5, 9]);
    }

    /// Catalog stub whose per-id latency is inverted relative to input order,
    /// so completion order differs from request order
    struct DelayedCatalog;

    #[async_trait::async_trait]
    impl CatalogFetcher for DelayedCatalog {
        async fn fetch_detail(&self, media: MediaRef) -> AppResult<CatalogDetail> {
            let delay_ms = match media.id {
                5 => 30,
                3 => 15,
                _ => 1,
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(movie_detail(media.id))
        }
    }

    #[tokio::test]
    async fn test_hydration_preserves_generator_ordering() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().returning(|_| Ok(None));
        cache.expect_write_entry().returning(|_, _| Ok(()));

        let mut engine = MockRecommendationEngine::new();
        engine
            .expect_generate()
            .returning(|_, _, _| Ok(generated(&[5, 3, 9])));

        let service = RecommendationService::new(
            Arc::new(store_with_history()),
            Arc::new(DelayedCatalog),
            Arc::new(engine),
            Arc::new(cache),
            Arc::new(SessionCache::new()),
        );

        let recommendations = service.get_recommendations(user).await.unwrap();
        let ids: Vec<i64> = recommendations.iter().map(|d| d.id).collect();
        // Id 9 completes first but the ranking order must survive
        assert_eq!(ids, vec![5, 3, 9]);
    }

    /// Engine stub counting invocations, slow enough for callers to overlap
    struct CountingEngine {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RecommendationEngine for CountingEngine {
        async fn generate(
            &self,
            _user_id: Uuid,
            _liked_ids: Vec<i64>,
            _disliked_ids: Vec<i64>,
        ) -> AppResult<GeneratorResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(generated(&[5]))
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_generation() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().returning(|_| Ok(None));
        cache.expect_write_entry().returning(|_, _| Ok(()));

        let engine = Arc::new(CountingEngine {
            calls: AtomicUsize::new(0),
        });

        let service = Arc::new(RecommendationService::new(
            Arc::new(store_with_history()),
            Arc::new(DelayedCatalog),
            Arc::clone(&engine) as Arc<dyn RecommendationEngine>,
            Arc::new(cache),
            Arc::new(SessionCache::new()),
        ));

        let (first, second) = tokio::join!(
            service.get_recommendations(user),
            service.get_recommendations(user)
        );

        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_call_serves_session_cache() {
        let user = Uuid::new_v4();

        let mut cache = MockRecommendationCacheStore::new();
        cache.expect_read_entry().times(1).returning(|_| Ok(None));
        cache.expect_write_entry().times(1).returning(|_, _| Ok(()));

        let mut engine = MockRecommendationEngine::new();
        engine
            .expect_generate()
            .times(1)
            .returning(|_, _, _| Ok(generated(&[5])));

        let service = service(store_with_history(), resolving_catalog(), engine, cache);

        let first = service.get_recommendations(user).await.unwrap();
        let second = service.get_recommendations(user).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
