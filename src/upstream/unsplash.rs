use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;

use super::{ImageSearchProvider, SearchRequest, UpstreamError};

pub struct UnsplashClient {
    http: Client,
    base_url: String,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
        })
    }
}

#[async_trait]
impl ImageSearchProvider for UnsplashClient {
    async fn search_photos(&self, request: &SearchRequest) -> Result<Value, UpstreamError> {
        tracing::info!(
            "Fetching from Unsplash: {} (page {})",
            request.query,
            request.page
        );

        let per_page = request.per_page.to_string();
        let page = request.page.to_string();
        let response = self
            .http
            .get(format!("{}/search/photos", self.base_url))
            .header(header::AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .query(&[
                ("query", request.query.as_str()),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
                ("orientation", request.orientation.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
