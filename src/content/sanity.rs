use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::SanityConfig;
use crate::error::{AppError, Result};
use crate::models::{Artwork, ArtworkStatus};

use super::{queries, ContentStore};

/// Query API response envelope: `{"result": ..., "ms": ...}`.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// HTTP client for the Sanity data APIs.
///
/// Reads hit the public query endpoint of the dataset; the mark-sold
/// mutation posts to the mutate endpoint with the write token.
#[derive(Debug, Clone)]
pub struct SanityClient {
    client: Client,
    query_url: String,
    mutate_url: String,
    write_token: Option<String>,
}

impl SanityClient {
    pub fn new(config: &SanityConfig) -> Self {
        let base = format!(
            "https://{}.api.sanity.io/v{}/data",
            config.project_id, config.api_version
        );
        Self {
            client: Client::new(),
            query_url: format!("{}/query/{}", base, config.dataset),
            mutate_url: format!("{}/mutate/{}", base, config.dataset),
            write_token: config.write_token.clone(),
        }
    }

    /// Run a GROQ query with optional `$name` string parameters.
    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), groq.to_string())];
        for (name, value) in params {
            // Parameters are passed JSON-encoded, hence the added quotes.
            let encoded = serde_json::to_string(value)
                .map_err(|e| AppError::Internal(format!("Failed to encode query param: {}", e)))?;
            pairs.push((format!("${}", name), encoded));
        }

        let response = self
            .client
            .get(&self.query_url)
            .query(&pairs)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Sanity API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Sanity API error: {}",
                error_text
            )));
        }

        let envelope: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Sanity response: {}", e)))?;

        Ok(envelope.result)
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn artwork_by_slug(&self, slug: &str) -> Result<Option<Artwork>> {
        self.query(queries::ARTWORK_BY_SLUG, &[("slug", slug)]).await
    }

    async fn gallery(&self) -> Result<Vec<Artwork>> {
        self.query(queries::GALLERY, &[]).await
    }

    async fn featured(&self) -> Result<Vec<Artwork>> {
        self.query(queries::FEATURED, &[]).await
    }

    async fn homepage(&self) -> Result<Option<serde_json::Value>> {
        self.query(queries::HOMEPAGE, &[]).await
    }

    async fn mark_sold(&self, artwork_id: &str, sold_at: DateTime<Utc>) -> Result<()> {
        let token = self.write_token.as_deref().ok_or_else(|| {
            AppError::Internal("Sanity write token not configured".to_string())
        })?;

        let body = json!({
            "mutations": [{
                "patch": {
                    "id": artwork_id,
                    "set": {
                        "status": ArtworkStatus::Sold.as_ref(),
                        "soldAt": sold_at.to_rfc3339(),
                    }
                }
            }]
        });

        let response = self
            .client
            .post(&self.mutate_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Sanity API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Sanity mutation error: {}",
                error_text
            )));
        }

        tracing::info!(artwork_id, "Artwork marked sold in content store");
        Ok(())
    }
}
