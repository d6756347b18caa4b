use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResultItem};
use tokio_util::sync::CancellationToken;
use crate::error::SourceError;

/// A remote movie database.
///
/// Implementations must stop work and return `SourceError::Cancelled` once
/// `cancel` fires, releasing any pending network resource.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, SourceError>;

    async fn fetch_detail(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, SourceError>;
}
