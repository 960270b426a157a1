use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::PreferenceStore,
    error::AppResult,
    models::{CatalogDetail, MediaKind, MediaRef, MediaStats, PreferenceKind, ProfileStats},
    services::{
        hydrate_details,
        providers::CatalogFetcher,
        session::{SessionCache, SingleFlight},
    },
};

/// Computes per-user viewing statistics from preference records and resolved
/// catalog details.
///
/// Results are cached in the session store; recomputation happens only after
/// explicit invalidation. Concurrent requests for the same user share one
/// computation.
pub struct AggregationService {
    preferences: Arc<dyn PreferenceStore>,
    catalog: Arc<dyn CatalogFetcher>,
    session: Arc<SessionCache>,
    flights: SingleFlight,
}

impl AggregationService {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn CatalogFetcher>,
        session: Arc<SessionCache>,
    ) -> Self {
        Self {
            preferences,
            catalog,
            session,
            flights: SingleFlight::new(),
        }
    }

    /// Aggregated statistics for both media kinds.
    ///
    /// A preference-id fetch failure aborts the whole call; without id sets no
    /// partial aggregation is meaningful. Individual detail-resolution
    /// failures only drop the affected item.
    pub async fn compute_stats(&self, user_id: Uuid) -> AppResult<Arc<ProfileStats>> {
        if let Some(stats) = self.session.stats(user_id).await {
            tracing::debug!(user_id = %user_id, "Serving stats from session cache");
            return Ok(stats);
        }

        let flight = self.flights.lock_for(user_id);
        let _guard = flight.lock().await;

        // A concurrent caller may have finished while we waited
        if let Some(stats) = self.session.stats(user_id).await {
            return Ok(stats);
        }

        let stats = Arc::new(self.compute_fresh(user_id).await?);
        self.session.store_stats(user_id, Arc::clone(&stats)).await;

        Ok(stats)
    }

    async fn compute_fresh(&self, user_id: Uuid) -> AppResult<ProfileStats> {
        use MediaKind::{Movie, Tv};
        use PreferenceKind::{Dislike, Like, Watchlist};

        let (
            liked_movie_ids,
            disliked_movie_ids,
            watchlist_movie_ids,
            liked_tv_ids,
            disliked_tv_ids,
            watchlist_tv_ids,
        ) = tokio::try_join!(
            self.preferences.fetch_ids(user_id, Like, Movie),
            self.preferences.fetch_ids(user_id, Dislike, Movie),
            self.preferences.fetch_ids(user_id, Watchlist, Movie),
            self.preferences.fetch_ids(user_id, Like, Tv),
            self.preferences.fetch_ids(user_id, Dislike, Tv),
            self.preferences.fetch_ids(user_id, Watchlist, Tv),
        )?;

        // Watchlist ids contribute a count only and are never hydrated
        let (liked_movies, disliked_movies, liked_tv, disliked_tv) = tokio::join!(
            self.hydrate(&liked_movie_ids, Movie),
            self.hydrate(&disliked_movie_ids, Movie),
            self.hydrate(&liked_tv_ids, Tv),
            self.hydrate(&disliked_tv_ids, Tv),
        );

        let stats = ProfileStats {
            movie: MediaStats::from_details(
                &liked_movies,
                &disliked_movies,
                watchlist_movie_ids.len() as u32,
            ),
            tv: MediaStats::from_details(&liked_tv, &disliked_tv, watchlist_tv_ids.len() as u32),
        };

        tracing::info!(
            user_id = %user_id,
            movies_watched = stats.movie.total,
            shows_watched = stats.tv.total,
            "Computed profile stats"
        );

        Ok(stats)
    }

    async fn hydrate(&self, ids: &[i64], kind: MediaKind) -> Vec<CatalogDetail> {
        let refs = ids.iter().map(|&id| MediaRef { id, kind }).collect();
        hydrate_details(&self.catalog, refs).await
    }
}
