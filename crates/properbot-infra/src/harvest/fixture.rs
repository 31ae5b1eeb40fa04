//! Fixture-backed listing source.
//!
//! Serves a fixed row set for tests and offline runs (`--offline` on the
//! CLI). Rows carry a status so the fixture can respect the requested
//! listing type.

use properbot_core::listing::source::ListingSource;
use properbot_types::error::HarvestError;
use properbot_types::listing::{Listing, ListingQuery};

/// In-memory listing source with a fixed row set.
pub struct StaticListingSource {
    listings: Vec<Listing>,
}

impl StaticListingSource {
    /// Create a source over an explicit row set.
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// A small San Mateo data set for demos and offline runs.
    pub fn with_sample_data() -> Self {
        Self::new(sample_listings())
    }
}

impl ListingSource for StaticListingSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>, HarvestError> {
        if query.location.trim().is_empty() {
            return Err(HarvestError::InvalidQuery(
                "location must not be empty".to_string(),
            ));
        }

        let wanted = query.listing_type_or_default().to_string();
        Ok(self
            .listings
            .iter()
            .filter(|l| l.status.as_deref().is_none_or(|s| s == wanted))
            .cloned()
            .collect())
    }
}

/// Fixture rows modeled on typical harvested data.
fn sample_listings() -> Vec<Listing> {
    vec![
        Listing {
            property_url: Some("https://example.com/listing/101".to_string()),
            mls_id: Some("ML101".to_string()),
            status: Some("FOR_SALE".to_string()),
            street: Some("315 Poplar Ave".to_string()),
            city: Some("San Mateo".to_string()),
            state: Some("CA".to_string()),
            zip_code: Some("94401".to_string()),
            style: Some("SINGLE_FAMILY".to_string()),
            beds: Some(3),
            full_baths: Some(2),
            sqft: Some(1540),
            year_built: Some(1948),
            list_price: Some(1_398_000.0),
            price_per_sqft: Some(907.8),
            parking_garage: Some(2),
            days_on_mls: Some(9),
            ..Default::default()
        },
        Listing {
            property_url: Some("https://example.com/listing/102".to_string()),
            mls_id: Some("ML102".to_string()),
            status: Some("FOR_SALE".to_string()),
            street: Some("88 Hobart Ave".to_string()),
            unit: Some("Apt 2".to_string()),
            city: Some("San Mateo".to_string()),
            state: Some("CA".to_string()),
            zip_code: Some("94402".to_string()),
            style: Some("CONDO".to_string()),
            beds: Some(2),
            full_baths: Some(1),
            half_baths: Some(1),
            sqft: Some(980),
            year_built: Some(1974),
            list_price: Some(749_000.0),
            hoa_fee: Some(430.0),
            days_on_mls: Some(21),
            ..Default::default()
        },
        Listing {
            property_url: Some("https://example.com/listing/103".to_string()),
            mls_id: Some("ML103".to_string()),
            status: Some("FOR_SALE".to_string()),
            street: Some("1204 Eldorado St".to_string()),
            city: Some("San Mateo".to_string()),
            state: Some("CA".to_string()),
            zip_code: Some("94403".to_string()),
            style: Some("SINGLE_FAMILY".to_string()),
            beds: Some(4),
            full_baths: Some(3),
            sqft: Some(2210),
            year_built: Some(1989),
            list_price: Some(1_925_000.0),
            parking_garage: Some(2),
            days_on_mls: Some(4),
            ..Default::default()
        },
        Listing {
            property_url: Some("https://example.com/listing/104".to_string()),
            mls_id: Some("ML104".to_string()),
            status: Some("FOR_RENT".to_string()),
            street: Some("405 N Claremont St".to_string()),
            city: Some("San Mateo".to_string()),
            state: Some("CA".to_string()),
            zip_code: Some("94401".to_string()),
            beds: Some(2),
            full_baths: Some(1),
            sqft: Some(890),
            list_price: Some(3_450.0),
            days_on_mls: Some(2),
            ..Default::default()
        },
        Listing {
            property_url: Some("https://example.com/listing/105".to_string()),
            mls_id: Some("ML105".to_string()),
            status: Some("SOLD".to_string()),
            street: Some("720 Edgewater Blvd".to_string()),
            city: Some("San Mateo".to_string()),
            state: Some("CA".to_string()),
            zip_code: Some("94404".to_string()),
            beds: Some(3),
            full_baths: Some(2),
            sqft: Some(1720),
            year_built: Some(2001),
            sold_price: Some(1_610_000.0),
            last_sold_date: Some("2026-06-12".to_string()),
            parking_garage: Some(1),
            ..Default::default()
        },
    ]
}
