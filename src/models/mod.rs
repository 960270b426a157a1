mod media;
mod preference;
mod stats;

pub use media::{
    CatalogDetail, Genre, MediaKind, MediaRef, MovieDetailsResponse, Runtime, TvDetailsResponse,
};
pub use preference::{PreferenceKind, PreferenceRecord};
pub use stats::{GenreCount, MediaStats, ProfileStats, WatchTime};
