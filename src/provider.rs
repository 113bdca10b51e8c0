//! Reporting-API client.
//!
//! [`SearchAnalyticsApi`] is the seam between the fetch pipeline and the
//! outside world: the fetcher and harvester only see the trait, so tests
//! drive them with scripted in-memory providers. [`GscClient`] is the
//! production implementation over the Search Console `searchAnalytics/query`
//! endpoint.
//!
//! The credential is held per client instance and sent as a bearer header on
//! every request. There is deliberately no process-wide token cache; the
//! calling session owns the credential's lifetime.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Credential, Dimension, SearchAnalyticsRow};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

/// One bounded query, camelCase per the provider's wire format.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub dimensions: Vec<Dimension>,
    #[serde(rename = "rowLimit")]
    pub row_limit: usize,
}

/// `rows` is omitted entirely on empty results, hence the default.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    rows: Vec<SearchAnalyticsRow>,
}

/// The boundary trait for the primary reporting source.
#[async_trait]
pub trait SearchAnalyticsApi: Send + Sync {
    async fn query(
        &self,
        site: &str,
        request: &QueryRequest,
    ) -> Result<Vec<SearchAnalyticsRow>, ProviderError>;
}

/// Production client for the Search Console reporting API.
pub struct GscClient {
    http: reqwest::Client,
    credential: Credential,
    endpoint: String,
}

impl GscClient {
    pub fn new(credential: Credential, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            endpoint: endpoint.into(),
        }
    }

    /// Build the client against the configured endpoint base.
    pub fn from_config(credential: Credential) -> Self {
        let config = crate::config::get_config();
        Self::new(credential, config.provider.endpoint.clone())
    }

    fn query_url(&self, site: &str) -> String {
        // Site identifiers ("sc-domain:example.com", "https://example.com/")
        // are a single path segment and must be percent-encoded.
        format!(
            "{}/sites/{}/searchAnalytics/query",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(site)
        )
    }
}

#[async_trait]
impl SearchAnalyticsApi for GscClient {
    async fn query(
        &self,
        site: &str,
        request: &QueryRequest,
    ) -> Result<Vec<SearchAnalyticsRow>, ProviderError> {
        let url = self.query_url(site);
        debug!(
            %url,
            start = %request.start_date,
            end = %request.end_date,
            dimensions = request.dimensions.len(),
            row_limit = request.row_limit,
            "issuing search analytics query"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credential.bearer())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: QueryResponse = response.json().await?;
        debug!(rows = body.rows.len(), "query returned");
        Ok(body.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_identifier_is_percent_encoded() {
        let client = GscClient::new(
            Credential::new("token"),
            "https://api.example.test/webmasters/v3",
        );
        let url = client.query_url("sc-domain:example.com");
        assert_eq!(
            url,
            "https://api.example.test/webmasters/v3/sites/sc-domain%3Aexample.com/searchAnalytics/query"
        );
    }

    #[test]
    fn test_request_serializes_with_provider_field_names() {
        let request = QueryRequest {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            dimensions: vec![Dimension::Query, Dimension::Page],
            row_limit: 25_000,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["startDate"], "2025-06-01");
        assert_eq!(json["rowLimit"], 25_000);
        assert_eq!(json["dimensions"][1], "page");
    }

    #[test]
    fn test_empty_response_body_parses_to_no_rows() {
        let body: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(body.rows.is_empty());
    }
}
