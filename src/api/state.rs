use std::sync::Arc;

use crate::{
    db::{PreferenceStore, RecommendationCacheStore},
    services::{
        providers::{CatalogFetcher, RecommendationEngine},
        AggregationService, RecommendationService, SessionCache,
    },
};

/// Shared application state
///
/// Collaborators are injected as trait objects so tests can wire in-memory
/// substitutes; both services share one session cache with the refresh
/// handler.
#[derive(Clone)]
pub struct AppState {
    pub preferences: Arc<dyn PreferenceStore>,
    pub aggregation: Arc<AggregationService>,
    pub recommendations: Arc<RecommendationService>,
    pub session: Arc<SessionCache>,
}

impl AppState {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn CatalogFetcher>,
        engine: Arc<dyn RecommendationEngine>,
        cache: Arc<dyn RecommendationCacheStore>,
    ) -> Self {
        let session = Arc::new(SessionCache::new());

        let aggregation = Arc::new(AggregationService::new(
            Arc::clone(&preferences),
            Arc::clone(&catalog),
            Arc::clone(&session),
        ));

        let recommendations = Arc::new(RecommendationService::new(
            Arc::clone(&preferences),
            catalog,
            engine,
            cache,
            Arc::clone(&session),
        ));

        Self {
            preferences,
            aggregation,
            recommendations,
            session,
        }
    }
}
