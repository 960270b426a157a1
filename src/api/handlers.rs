use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    CatalogDetail, GenreCount, MediaKind, MediaRef, MediaStats, PreferenceKind, PreferenceRecord,
    WatchTime,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct MediaStatsResponse {
    pub total: u32,
    pub hours_watched: u32,
    pub like_count: u32,
    pub dislike_count: u32,
    pub watchlist_count: u32,
    pub genre_histogram: Vec<GenreCount>,
    /// Display derivation: hours, or days once past a full day
    pub watch_time: WatchTime,
}

impl From<&MediaStats> for MediaStatsResponse {
    fn from(stats: &MediaStats) -> Self {
        Self {
            total: stats.total,
            hours_watched: stats.hours_watched,
            like_count: stats.like_count,
            dislike_count: stats.dislike_count,
            watchlist_count: stats.watchlist_count,
            genre_histogram: stats.genre_histogram.clone(),
            watch_time: stats.watch_time(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub movie: MediaStatsResponse,
    pub tv: MediaStatsResponse,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceQuery {
    pub preference: PreferenceKind,
    pub media: MediaKind,
}

#[derive(Debug, Deserialize)]
pub struct UpsertPreferenceRequest {
    pub media_id: i64,
    pub media_kind: MediaKind,
    pub preference: PreferenceKind,
}

#[derive(Debug, Deserialize)]
pub struct DeletePreferenceRequest {
    pub media_id: i64,
    pub preference: PreferenceKind,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Aggregated viewing statistics for a user, per media kind
pub async fn get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.aggregation.compute_stats(user_id).await?;

    Ok(Json(StatsResponse {
        movie: MediaStatsResponse::from(&stats.movie),
        tv: MediaStatsResponse::from(&stats.tv),
    }))
}

/// Personalized recommendations, hydrated into full catalog details
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<CatalogDetail>>> {
    let recommendations = state.recommendations.get_recommendations(user_id).await?;
    Ok(Json(recommendations.as_ref().clone()))
}

/// Drops the user's derived-data cache entry so the next read recomputes.
/// Preference writes do not invalidate automatically; callers decide when
/// fresh derived data is worth the recomputation.
pub async fn refresh_cache(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> StatusCode {
    state.session.invalidate(user_id).await;
    StatusCode::NO_CONTENT
}

/// Media ids the user recorded with the given preference and media kind
pub async fn get_preference_ids(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PreferenceQuery>,
) -> AppResult<Json<Vec<i64>>> {
    let ids = state
        .preferences
        .fetch_ids(user_id, query.preference, query.media)
        .await?;
    Ok(Json(ids))
}

/// Records or updates one preference
pub async fn upsert_preference(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpsertPreferenceRequest>,
) -> AppResult<StatusCode> {
    state
        .preferences
        .upsert(PreferenceRecord {
            user_id,
            media: MediaRef {
                id: request.media_id,
                kind: request.media_kind,
            },
            preference: request.preference,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Removes one preference record
pub async fn delete_preference(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<DeletePreferenceRequest>,
) -> AppResult<StatusCode> {
    state
        .preferences
        .delete(user_id, request.media_id, request.preference)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
