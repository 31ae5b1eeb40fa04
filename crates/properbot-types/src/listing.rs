//! Listing schema and structured query types.
//!
//! `Listing` models a single harvested property row; `ListingQuery` is the
//! structured filter set the agent's query planner produces from free text.
//! Both are wire types for the harvest service boundary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Market status of a listing search.
///
/// Serialized in SCREAMING_SNAKE_CASE to match the harvest service's
/// wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    ForSale,
    ForRent,
    Sold,
    Pending,
}

impl Default for ListingType {
    fn default() -> Self {
        ListingType::ForSale
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingType::ForSale => write!(f, "FOR_SALE"),
            ListingType::ForRent => write!(f, "FOR_RENT"),
            ListingType::Sold => write!(f, "SOLD"),
            ListingType::Pending => write!(f, "PENDING"),
        }
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FOR_SALE" => Ok(ListingType::ForSale),
            "FOR_RENT" => Ok(ListingType::ForRent),
            "SOLD" => Ok(ListingType::Sold),
            "PENDING" => Ok(ListingType::Pending),
            other => Err(format!("invalid listing type: '{other}'")),
        }
    }
}

/// A single property row as returned by the harvest service.
///
/// Most fields are optional: harvested rows are sparse and vary by
/// marketplace. Only the address block is reliably present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    // Basic information
    pub property_url: Option<String>,
    pub mls: Option<String>,
    pub mls_id: Option<String>,
    pub status: Option<String>,

    // Address details
    pub street: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    // Property description
    pub style: Option<String>,
    pub beds: Option<u32>,
    pub full_baths: Option<u32>,
    pub half_baths: Option<u32>,
    pub sqft: Option<u32>,
    pub year_built: Option<u32>,
    pub stories: Option<u32>,
    pub lot_sqft: Option<u32>,

    // Listing details
    pub days_on_mls: Option<u32>,
    pub list_price: Option<f64>,
    pub list_date: Option<String>,
    pub sold_price: Option<f64>,
    pub last_sold_date: Option<String>,
    pub price_per_sqft: Option<f64>,
    pub parking_garage: Option<u32>,
    pub hoa_fee: Option<f64>,

    // Location
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // Agent / broker info
    pub agent: Option<String>,
    pub broker: Option<String>,
}

impl Listing {
    /// Single-line street address ("123 Main St Unit 4, San Mateo, CA 94401").
    ///
    /// Missing components are skipped; an entirely empty address yields
    /// "(address unknown)".
    pub fn address_line(&self) -> String {
        let mut first = String::new();
        if let Some(street) = &self.street {
            first.push_str(street);
        }
        if let Some(unit) = &self.unit {
            if !first.is_empty() {
                first.push(' ');
            }
            first.push_str(unit);
        }

        let mut parts = Vec::new();
        if !first.is_empty() {
            parts.push(first);
        }
        if let Some(city) = &self.city {
            parts.push(city.clone());
        }
        let mut tail = String::new();
        if let Some(state) = &self.state {
            tail.push_str(state);
        }
        if let Some(zip) = &self.zip_code {
            if !tail.is_empty() {
                tail.push(' ');
            }
            tail.push_str(zip);
        }
        if !tail.is_empty() {
            parts.push(tail);
        }

        if parts.is_empty() {
            "(address unknown)".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// The effective price of the row: list price, or sold price for
    /// SOLD rows that no longer carry one.
    pub fn price(&self) -> Option<f64> {
        self.list_price.or(self.sold_price)
    }

    /// Total bathroom count (half baths count as 0.5).
    pub fn baths(&self) -> Option<f64> {
        match (self.full_baths, self.half_baths) {
            (None, None) => None,
            (full, half) => {
                Some(f64::from(full.unwrap_or(0)) + f64::from(half.unwrap_or(0)) * 0.5)
            }
        }
    }

    /// Whether the row has at least one garage space.
    pub fn has_garage(&self) -> bool {
        self.parking_garage.is_some_and(|g| g > 0)
    }
}

/// Structured filter set over the property dataset.
///
/// Produced by the query planner from free text and merged across turns:
/// `location`, `listing_type`, and `radius` are forwarded to the harvest
/// service; the remaining attributes filter the harvested rows locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListingQuery {
    /// Location to search, e.g. "San Mateo, CA" or a zip code.
    pub location: String,

    /// Kind of listings to search. Defaults to FOR_SALE when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,

    /// Search radius around the location, in miles. Defaults to 5.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,

    /// Keep only rows priced at or above this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,

    /// Keep only rows priced at or below this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,

    /// Keep only rows with at least this many bedrooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_beds: Option<u32>,

    /// Keep only rows with at least this many bathrooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_baths: Option<f64>,

    /// Keep only rows with at least one garage space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_garage: Option<bool>,

    /// Keep only rows with an HOA fee at or below this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hoa_fee: Option<f64>,
}

/// Default search radius in miles.
pub const DEFAULT_RADIUS_MILES: f64 = 5.0;

impl ListingQuery {
    /// A query for everything currently for sale around a location.
    pub fn for_sale(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            listing_type: Some(ListingType::ForSale),
            radius: None,
            min_price: None,
            max_price: None,
            min_beds: None,
            min_baths: None,
            requires_garage: None,
            max_hoa_fee: None,
        }
    }

    /// Effective listing type (explicit value or FOR_SALE).
    pub fn listing_type_or_default(&self) -> ListingType {
        self.listing_type.unwrap_or_default()
    }

    /// Effective search radius (explicit value or the 5-mile default).
    pub fn radius_or_default(&self) -> f64 {
        self.radius.unwrap_or(DEFAULT_RADIUS_MILES)
    }

    /// Merge a follow-up turn's partial query into this one.
    ///
    /// The refinement's populated fields win; its empty location falls back
    /// to the remembered one. This is what lets "now only the ones with a
    /// garage" refine a prior "houses in San Mateo" search.
    pub fn merge_refinement(&self, refinement: &ListingQuery) -> ListingQuery {
        ListingQuery {
            location: if refinement.location.trim().is_empty() {
                self.location.clone()
            } else {
                refinement.location.clone()
            },
            listing_type: refinement.listing_type.or(self.listing_type),
            radius: refinement.radius.or(self.radius),
            min_price: refinement.min_price.or(self.min_price),
            max_price: refinement.max_price.or(self.max_price),
            min_beds: refinement.min_beds.or(self.min_beds),
            min_baths: refinement.min_baths.or(self.min_baths),
            requires_garage: refinement.requires_garage.or(self.requires_garage),
            max_hoa_fee: refinement.max_hoa_fee.or(self.max_hoa_fee),
        }
    }
}
