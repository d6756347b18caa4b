use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::MovieProvider;
use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResultItem};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// HTTP client for the OMDb API (`/?apikey=..&s=..` and `/?apikey=..&i=..`).
#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    endpoint: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SourceError::Transport)?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: format!("{}/", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET the endpoint with `params`, racing the request against `cancel`.
    /// Dropping the request future on cancel closes its connection.
    async fn get_body(
        &self,
        params: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<String, SourceError> {
        let request = async {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[("apikey", self.api_key.as_str())])
                .query(params)
                .send()
                .await
                .map_err(|e| {
                    debug!(error = %e, timeout = e.is_timeout(), "OMDb request failed");
                    SourceError::Transport(e)
                })?;

            let status = response.status();
            if !status.is_success() {
                debug!(status = status.as_u16(), "OMDb returned non-success status");
                return Err(SourceError::BadStatus(status.as_u16()));
            }

            response.text().await.map_err(SourceError::Transport)
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SourceError::Cancelled),
            result = request => result,
        }
    }
}

#[async_trait]
impl MovieProvider for OmdbClient {
    fn provider_name(&self) -> &str {
        "omdb"
    }

    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, SourceError> {
        debug!(query, "Searching OMDb");
        let body = self.get_body(&[("s", query)], cancel).await?;
        let items = api::parse_search(&body)?;
        debug!(query, results = items.len(), "OMDb search complete");
        Ok(items)
    }

    async fn fetch_detail(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, SourceError> {
        debug!(id, "Fetching OMDb detail");
        let body = self.get_body(&[("i", id)], cancel).await?;
        api::parse_detail(&body)
    }
}
