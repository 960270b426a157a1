use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MediaRef;

/// A user's recorded stance toward a media item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    Like,
    Dislike,
    Watchlist,
}

impl PreferenceKind {
    /// Stable string form used in persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKind::Like => "like",
            PreferenceKind::Dislike => "dislike",
            PreferenceKind::Watchlist => "watchlist",
        }
    }
}

impl std::fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One preference record, keyed by (user_id, media id, preference).
///
/// The store permits a like and a watchlist record for the same media item at
/// once, and deliberately does not enforce like/dislike exclusivity; callers
/// that want single-choice semantics must delete the opposite record
/// themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceRecord {
    pub user_id: Uuid,
    pub media: MediaRef,
    pub preference: PreferenceKind,
}
