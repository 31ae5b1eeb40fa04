//! HTTP client for the external harvest service.
//!
//! The harvest service is an external collaborator reached over a narrow
//! interface: `GET {base_url}/properties` with `location`, `listing_type`,
//! and `radius` query parameters, returning a JSON array of listing rows.

use std::time::Duration;

use tracing::debug;

use properbot_core::listing::source::ListingSource;
use properbot_types::config::HarvestConfig;
use properbot_types::error::HarvestError;
use properbot_types::listing::{Listing, ListingQuery};

/// How much of an error body to keep in a [`HarvestError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// reqwest-backed listing source for the harvest service.
pub struct HttpListingSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpListingSource {
    /// Create a client from harvest settings.
    pub fn new(config: &HarvestConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ListingSource for HttpListingSource {
    fn name(&self) -> &str {
        "harvest-http"
    }

    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>, HarvestError> {
        if query.location.trim().is_empty() {
            return Err(HarvestError::InvalidQuery(
                "location must not be empty".to_string(),
            ));
        }

        let url = format!("{}/properties", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("location", query.location.as_str()),
                (
                    "listing_type",
                    &query.listing_type_or_default().to_string(),
                ),
                ("radius", &query.radius_or_default().to_string()),
            ])
            .send()
            .await
            .map_err(|e| HarvestError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(MAX_ERROR_BODY);
            return Err(HarvestError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let listings: Vec<Listing> = response
            .json()
            .await
            .map_err(|e| HarvestError::Decode(e.to_string()))?;

        debug!(
            count = listings.len(),
            location = %query.location,
            "Harvest fetch completed"
        );

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_location_rejected_before_network() {
        let source = HttpListingSource::new(&HarvestConfig::default()).unwrap();
        let err = source
            .search(&ListingQuery::for_sale("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidQuery(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = HarvestConfig {
            base_url: "http://harvest.test:9000/".to_string(),
            timeout_secs: 5,
        };
        let source = HttpListingSource::new(&config).unwrap();
        assert_eq!(source.base_url, "http://harvest.test:9000");
    }
}
