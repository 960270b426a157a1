/// Recommendation generator client
///
/// The generator is an opaque external service: it takes the user's movie
/// like/dislike history and returns ranked candidate ids. This client only
/// transports; caching and hydration live in the recommendation service.
use reqwest::Client as HttpClient;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::providers::{GeneratorResponse, RecommendationEngine},
};

#[derive(Clone)]
pub struct RecommenderClient {
    http_client: HttpClient,
    api_url: String,
}

impl RecommenderClient {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
        }
    }

    fn join_ids(ids: &[i64]) -> String {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait::async_trait]
impl RecommendationEngine for RecommenderClient {
    async fn generate(
        &self,
        user_id: Uuid,
        liked_ids: Vec<i64>,
        disliked_ids: Vec<i64>,
    ) -> AppResult<GeneratorResponse> {
        let url = format!("{}/recommend/by_user", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("liked_ids", Self::join_ids(&liked_ids)),
                ("disliked_ids", Self::join_ids(&disliked_ids)),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recommender returned status {}: {}",
                status, body
            )));
        }

        let generated: GeneratorResponse = response.json().await?;

        tracing::info!(
            user_id = %user_id,
            liked = liked_ids.len(),
            disliked = disliked_ids.len(),
            candidates = generated.recommendations.len(),
            "Recommendation generation completed"
        );

        Ok(generated)
    }
}
