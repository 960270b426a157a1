use serde::{Deserialize, Serialize};

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Stable string form used in persistence and API paths
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity pair for a catalog entry, shared between preference records
/// and cache keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaRef {
    pub id: i64,
    pub kind: MediaKind,
}

impl MediaRef {
    pub fn movie(id: i64) -> Self {
        Self {
            id,
            kind: MediaKind::Movie,
        }
    }

    pub fn tv(id: i64) -> Self {
        Self {
            id,
            kind: MediaKind::Tv,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Watch-time source for a catalog entry.
///
/// Movies carry a single runtime; series carry a per-episode runtime and an
/// episode count. Defaults for missing catalog fields are applied during
/// conversion from the raw API responses, not here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Runtime {
    Movie { minutes: u32 },
    Series { episode_minutes: u32, episodes: u32 },
}

impl Runtime {
    /// Total minutes this entry contributes to watch-time accumulation
    pub fn total_minutes(&self) -> u64 {
        match self {
            Runtime::Movie { minutes } => u64::from(*minutes),
            Runtime::Series {
                episode_minutes,
                episodes,
            } => u64::from(*episode_minutes) * u64::from(*episodes),
        }
    }
}

/// Resolved, read-only snapshot of a catalog entry
///
/// Fetched fresh from the catalog API per request; only ever persisted inside
/// a recommendation cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogDetail {
    pub id: i64,
    pub media_kind: MediaKind,
    pub title: String,
    pub release_date: Option<String>,
    pub runtime: Runtime,
    pub genres: Vec<Genre>,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
}

impl CatalogDetail {
    pub fn media_ref(&self) -> MediaRef {
        MediaRef {
            id: self.id,
            kind: self.media_kind,
        }
    }
}

// ============================================================================
// Raw catalog API types
// ============================================================================

/// Raw movie detail response from the catalog API
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailsResponse {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// Raw TV detail response from the catalog API
#[derive(Debug, Clone, Deserialize)]
pub struct TvDetailsResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// Assumed episode length when the catalog omits `episode_run_time`
const DEFAULT_EPISODE_MINUTES: u32 = 30;

/// The catalog API reports missing dates as empty strings
fn non_empty(date: Option<String>) -> Option<String> {
    date.filter(|d| !d.is_empty())
}

impl From<MovieDetailsResponse> for CatalogDetail {
    fn from(raw: MovieDetailsResponse) -> Self {
        Self {
            id: raw.id,
            media_kind: MediaKind::Movie,
            title: raw.title,
            release_date: non_empty(raw.release_date),
            runtime: Runtime::Movie {
                minutes: raw.runtime.unwrap_or(0),
            },
            genres: raw.genres,
            poster_path: raw.poster_path,
            overview: raw.overview,
        }
    }
}

impl From<TvDetailsResponse> for CatalogDetail {
    fn from(raw: TvDetailsResponse) -> Self {
        let episode_minutes = raw
            .episode_run_time
            .first()
            .copied()
            .unwrap_or(DEFAULT_EPISODE_MINUTES);

        Self {
            id: raw.id,
            media_kind: MediaKind::Tv,
            title: raw.name,
            release_date: non_empty(raw.first_air_date),
            runtime: Runtime::Series {
                episode_minutes,
                episodes: raw.number_of_episodes.unwrap_or(0),
            },
            genres: raw.genres,
            poster_path: raw.poster_path,
            overview: raw.overview,
        }
    }
}
