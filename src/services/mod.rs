use std::sync::Arc;

use crate::models::{CatalogDetail, MediaRef};

pub mod aggregation;
pub mod providers;
pub mod recommendations;
pub mod session;

pub use aggregation::AggregationService;
pub use providers::{CatalogFetcher, RecommendationEngine};
pub use recommendations::RecommendationService;
pub use session::{SessionCache, SingleFlight};

/// Resolves a batch of media ids into catalog details with per-item isolated
/// failure.
///
/// Fetches run concurrently as spawned tasks; awaiting them in spawn order
/// preserves the input ordering regardless of completion order. A failed
/// resolution drops that item and never aborts the batch.
pub(crate) async fn hydrate_details(
    catalog: &Arc<dyn CatalogFetcher>,
    refs: Vec<MediaRef>,
) -> Vec<CatalogDetail> {
    let mut tasks = Vec::with_capacity(refs.len());

    for media in refs {
        let catalog = Arc::clone(catalog);
        tasks.push(tokio::spawn(async move { catalog.fetch_detail(media).await }));
    }

    let mut details = Vec::new();
    let mut failures = 0usize;

    for task in tasks {
        match task.await {
            Ok(Ok(detail)) => details.push(detail),
            Ok(Err(e)) => {
                failures += 1;
                tracing::warn!(error = %e, "Detail resolution failed, dropping item");
            }
            Err(e) => {
                failures += 1;
                tracing::error!(error = %e, "Detail resolution task failed to join");
            }
        }
    }

    if failures > 0 {
        tracing::warn!(
            resolved = details.len(),
            failed = failures,
            "Partial detail resolution"
        );
    }

    details
}
