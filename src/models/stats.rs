use serde::{Deserialize, Serialize};

use super::CatalogDetail;

/// One genre bucket in a histogram.
///
/// Histograms are kept as insertion-ordered sequences rather than maps so the
/// "first encountered wins" tie-break in top-N extraction stays deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreCount {
    pub name: String,
    pub count: u32,
}

/// Aggregated viewing statistics for one media kind.
///
/// Watchlist items count toward `watchlist_count` only; watched totals, hours
/// and the genre histogram are derived from liked and disliked items.
/// Invariant: `total == like_count + dislike_count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaStats {
    pub total: u32,
    pub hours_watched: u32,
    pub like_count: u32,
    pub dislike_count: u32,
    pub watchlist_count: u32,
    pub genre_histogram: Vec<GenreCount>,
}

impl MediaStats {
    /// Folds resolved catalog details into aggregated statistics.
    ///
    /// Pure function of its inputs: identical details yield identical stats.
    /// Counts reflect the details actually supplied, so items dropped earlier
    /// by failed resolution are not counted.
    pub fn from_details(
        liked: &[CatalogDetail],
        disliked: &[CatalogDetail],
        watchlist_count: u32,
    ) -> Self {
        let mut histogram: Vec<GenreCount> = Vec::new();
        let mut total_minutes: u64 = 0;

        for detail in liked.iter().chain(disliked.iter()) {
            for genre in &detail.genres {
                match histogram.iter_mut().find(|g| g.name == genre.name) {
                    Some(bucket) => bucket.count += 1,
                    None => histogram.push(GenreCount {
                        name: genre.name.clone(),
                        count: 1,
                    }),
                }
            }
            total_minutes += detail.runtime.total_minutes();
        }

        Self {
            total: (liked.len() + disliked.len()) as u32,
            hours_watched: round_div(total_minutes, 60),
            like_count: liked.len() as u32,
            dislike_count: disliked.len() as u32,
            watchlist_count,
            genre_histogram: histogram,
        }
    }

    /// Top N genres by descending count; ties keep first-encountered order
    pub fn top_genres(&self, n: usize) -> Vec<&GenreCount> {
        let mut genres: Vec<&GenreCount> = self.genre_histogram.iter().collect();
        genres.sort_by(|a, b| b.count.cmp(&a.count));
        genres.truncate(n);
        genres
    }

    pub fn genre_count(&self, name: &str) -> u32 {
        self.genre_histogram
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.count)
            .unwrap_or(0)
    }

    /// Display derivation: switch to days once past a full day of hours
    pub fn watch_time(&self) -> WatchTime {
        if self.hours_watched > 24 {
            WatchTime::Days(round_div(u64::from(self.hours_watched), 24))
        } else {
            WatchTime::Hours(self.hours_watched)
        }
    }
}

/// Per-kind statistics for a whole profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileStats {
    pub movie: MediaStats,
    pub tv: MediaStats,
}

/// Watch time in display units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum WatchTime {
    Hours(u32),
    Days(u32),
}

/// Integer division rounded to nearest, half away from zero
fn round_div(numerator: u64, divisor: u64) -> u32 {
    ((numerator + divisor / 2) / divisor) as u32
}
