//! Probe catalog service client
//!
//! Bootstrap is the one place where failure is fatal: the engine cannot
//! operate without its catalog, so a fetch or parse problem surfaces as an
//! explicit error instead of a sentinel.

use crate::client::default_headers;
use crate::defaults;
use crate::error::{AppError, Result};
use crate::models::ProbeCatalog;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;

/// Timeout for the one-shot catalog fetch
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the external probe catalog service
#[derive(Debug, Clone)]
pub struct CatalogService {
    base_url: String,
    headers: HeaderMap,
}

impl CatalogService {
    /// Create a service client for `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: default_headers(),
        }
    }

    /// Create a service client with a custom header set
    pub fn with_headers(base_url: &str, headers: HeaderMap) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        }
    }

    /// Full URL of the catalog endpoint
    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.base_url, defaults::CATALOG_PATH)
    }

    /// Fetch and parse the probe catalog
    ///
    /// Any transport error or non-success status is a fatal catalog error;
    /// an unparsable or semantically invalid document is a fatal
    /// invalid-catalog error.
    pub async fn fetch(&self) -> Result<ProbeCatalog> {
        let client = Client::builder()
            .default_headers(self.headers.clone())
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AppError::network(format!("failed to build HTTP client: {}", e)))?;

        let url = self.catalog_url();
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::catalog(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::catalog(format!(
                "catalog service answered HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::catalog(format!("failed to read catalog body: {}", e)))?;

        ProbeCatalog::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let service = CatalogService::new("https://example.com/");
        assert_eq!(
            service.catalog_url(),
            "https://example.com/internet/api/v0/get-probes"
        );
    }

    #[test]
    fn test_catalog_url_without_trailing_slash() {
        let service = CatalogService::new("https://example.com");
        assert_eq!(
            service.catalog_url(),
            "https://example.com/internet/api/v0/get-probes"
        );
    }
}
