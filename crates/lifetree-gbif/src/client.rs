//! HTTP client for the GBIF API
//!
//! [`TaxonSource`] is the read contract the tree model depends on;
//! [`GbifClient`] implements it with `reqwest`. Operations suspend until the
//! round-trip completes and never retry: a failure is the terminal outcome
//! for that call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use lifetree_common::{LifetreeError, Rank, Result, Taxon, TaxonKey};

use crate::endpoints;
use crate::types::{ChildRecord, NameMatch, OccurrenceRecord, Paged, SpeciesDetail};

/// Default GBIF API base URL.
/// Can be overridden via the LIFETREE_API_URL environment variable.
pub const DEFAULT_API_URL: &str = "https://api.gbif.org/v1";

/// Default timeout for API requests in seconds.
/// Can be overridden via the LIFETREE_HTTP_TIMEOUT_SECS environment variable.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Read operations against the taxonomy backbone
///
/// The tree model consumes this trait so its state machine is testable
/// against an in-memory double.
#[async_trait]
pub trait TaxonSource: Send + Sync {
    /// Fetch one taxon by key
    async fn fetch_taxon(&self, key: TaxonKey) -> Result<Taxon>;

    /// Fetch up to `limit` direct children, unfiltered by rank, in API order
    async fn fetch_raw_children(&self, key: TaxonKey, limit: u32) -> Result<Vec<ChildRecord>>;

    /// Resolve a free-text scientific name to a canonical taxon
    ///
    /// Fails with [`LifetreeError::NotFound`] when the API signals no
    /// confident match.
    async fn match_taxon_by_name(&self, name: &str) -> Result<Taxon>;

    /// List taxa of a given rank (root-level discovery entry point)
    async fn search_by_rank(&self, rank: Rank, limit: u32) -> Result<Vec<Taxon>>;
}

/// GBIF API client
pub struct GbifClient {
    client: Client,
    base_url: String,
}

impl GbifClient {
    /// Create a new client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let timeout_secs = std::env::var("LIFETREE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("lifetree/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| LifetreeError::http(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("LIFETREE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(base_url)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search coordinate-bearing occurrence records for a taxon
    ///
    /// One page per call; the caller owns the paging loop and its cap.
    pub async fn search_occurrences(
        &self,
        key: TaxonKey,
        limit: u32,
        offset: usize,
    ) -> Result<Paged<OccurrenceRecord>> {
        let url = endpoints::occurrence_search_url(&self.base_url, key, limit, offset);
        self.get_json(&url, &format!("occurrences of taxon {}", key))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LifetreeError::not_found(what.to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "GBIF request failed".to_string());
            return Err(LifetreeError::status(status.as_u16(), message));
        }

        response.json::<T>().await.map_err(request_error)
    }
}

#[async_trait]
impl TaxonSource for GbifClient {
    async fn fetch_taxon(&self, key: TaxonKey) -> Result<Taxon> {
        let url = endpoints::species_url(&self.base_url, key);
        let detail: SpeciesDetail = self.get_json(&url, &format!("species {}", key)).await?;
        Ok(detail.into())
    }

    async fn fetch_raw_children(&self, key: TaxonKey, limit: u32) -> Result<Vec<ChildRecord>> {
        if limit == 0 {
            return Err(LifetreeError::config("children limit must be positive"));
        }
        let url = endpoints::children_url(&self.base_url, key, limit);
        let page: Paged<ChildRecord> =
            self.get_json(&url, &format!("children of species {}", key)).await?;
        Ok(page.results)
    }

    async fn match_taxon_by_name(&self, name: &str) -> Result<Taxon> {
        let url = endpoints::match_url(&self.base_url, name);
        let matched: NameMatch = self.get_json(&url, &format!("match for '{}'", name)).await?;
        matched
            .into_taxon()
            .ok_or_else(|| LifetreeError::not_found(format!("no confident match for '{}'", name)))
    }

    async fn search_by_rank(&self, rank: Rank, limit: u32) -> Result<Vec<Taxon>> {
        if limit == 0 {
            return Err(LifetreeError::config("search limit must be positive"));
        }
        let url = endpoints::search_url(&self.base_url, rank, limit);
        let page: Paged<SpeciesDetail> =
            self.get_json(&url, &format!("{} taxa", rank)).await?;
        Ok(page.results.into_iter().map(Taxon::from).collect())
    }
}

fn request_error(err: reqwest::Error) -> LifetreeError {
    if err.is_decode() {
        LifetreeError::Json(err.to_string())
    } else {
        LifetreeError::http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GbifClient::new("http://localhost:8080").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_from_env() {
        std::env::set_var("LIFETREE_API_URL", "http://test.example.com");
        let client = GbifClient::from_env().unwrap();
        assert_eq!(client.base_url(), "http://test.example.com");
        std::env::remove_var("LIFETREE_API_URL");
    }

    #[tokio::test]
    async fn test_zero_limit_rejected_without_network() {
        let client = GbifClient::new("http://localhost:1").unwrap();
        let err = client.fetch_raw_children(TaxonKey(6), 0).await.unwrap_err();
        assert!(matches!(err, LifetreeError::Config(_)));
    }
}
