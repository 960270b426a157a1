/// TMDB catalog provider
///
/// Resolves media ids to full detail objects via the TMDB REST API.
/// Movies and TV shows live on separate endpoints with differently shaped
/// responses; both are normalized into `CatalogDetail`.
use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogDetail, MediaKind, MediaRef, MovieDetailsResponse, TvDetailsResponse},
    services::providers::CatalogFetcher,
};

const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    async fn get(&self, path: &str) -> AppResult<reqwest::Response> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "Catalog entry not found: {}",
                path
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl CatalogFetcher for TmdbClient {
    async fn fetch_detail(&self, media: MediaRef) -> AppResult<CatalogDetail> {
        let detail = match media.kind {
            MediaKind::Movie => {
                let response = self.get(&format!("movie/{}", media.id)).await?;
                let raw: MovieDetailsResponse = response.json().await?;
                CatalogDetail::from(raw)
            }
            MediaKind::Tv => {
                let response = self.get(&format!("tv/{}", media.id)).await?;
                let raw: TvDetailsResponse = response.json().await?;
                CatalogDetail::from(raw)
            }
        };

        tracing::debug!(
            media_id = media.id,
            media_kind = %media.kind,
            title = %detail.title,
            "Resolved catalog detail"
        );

        Ok(detail)
    }
}
