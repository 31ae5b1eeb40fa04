//! Deterministic refinement filters over harvested rows.
//!
//! The harvest boundary only understands location, listing type, and
//! radius. Attribute refinements (price range, beds, garage, HOA) are
//! applied here, after the fetch. Rows missing an attribute a filter
//! needs are dropped by that filter: an unknown price cannot satisfy a
//! price cap.

use properbot_types::listing::{Listing, ListingQuery};

/// Apply a query's refinement filters to harvested rows.
///
/// Returns the rows that satisfy every populated filter, preserving the
/// source ordering.
pub fn apply_filters(listings: Vec<Listing>, query: &ListingQuery) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|listing| matches(listing, query))
        .collect()
}

/// Whether a single row satisfies every populated refinement filter.
pub fn matches(listing: &Listing, query: &ListingQuery) -> bool {
    if let Some(min_price) = query.min_price {
        match listing.price() {
            Some(price) if price >= min_price => {}
            _ => return false,
        }
    }

    if let Some(max_price) = query.max_price {
        match listing.price() {
            Some(price) if price <= max_price => {}
            _ => return false,
        }
    }

    if let Some(min_beds) = query.min_beds {
        match listing.beds {
            Some(beds) if beds >= min_beds => {}
            _ => return false,
        }
    }

    if let Some(min_baths) = query.min_baths {
        match listing.baths() {
            Some(baths) if baths >= min_baths => {}
            _ => return false,
        }
    }

    if query.requires_garage == Some(true) && !listing.has_garage() {
        return false;
    }

    if let Some(max_hoa) = query.max_hoa_fee {
        // A row with no HOA fee trivially satisfies an HOA cap.
        if listing.hoa_fee.is_some_and(|fee| fee > max_hoa) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use properbot_types::listing::ListingQuery;

    fn listing(price: Option<f64>, beds: Option<u32>, garage: Option<u32>) -> Listing {
        Listing {
            list_price: price,
            beds,
            parking_garage: garage,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        let query = ListingQuery::for_sale("San Mateo, CA");
        let rows = vec![
            listing(Some(900_000.0), Some(3), None),
            listing(None, None, None),
        ];
        assert_eq!(apply_filters(rows, &query).len(), 2);
    }

    #[test]
    fn test_price_range() {
        let query = ListingQuery {
            min_price: Some(500_000.0),
            max_price: Some(1_000_000.0),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        let rows = vec![
            listing(Some(450_000.0), None, None),
            listing(Some(750_000.0), None, None),
            listing(Some(1_200_000.0), None, None),
            // Unknown price cannot satisfy a price filter
            listing(None, None, None),
        ];
        let kept = apply_filters(rows, &query);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].list_price, Some(750_000.0));
    }

    #[test]
    fn test_price_boundary_inclusive() {
        let query = ListingQuery {
            max_price: Some(1_000_000.0),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        let rows = vec![listing(Some(1_000_000.0), None, None)];
        assert_eq!(apply_filters(rows, &query).len(), 1);
    }

    #[test]
    fn test_min_beds() {
        let query = ListingQuery {
            min_beds: Some(3),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        let rows = vec![
            listing(None, Some(2), None),
            listing(None, Some(3), None),
            listing(None, Some(4), None),
            listing(None, None, None),
        ];
        assert_eq!(apply_filters(rows, &query).len(), 2);
    }

    #[test]
    fn test_min_baths_counts_half_baths() {
        let query = ListingQuery {
            min_baths: Some(2.5),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        let two_and_half = Listing {
            full_baths: Some(2),
            half_baths: Some(1),
            ..Default::default()
        };
        let two = Listing {
            full_baths: Some(2),
            ..Default::default()
        };
        assert!(matches(&two_and_half, &query));
        assert!(!matches(&two, &query));
    }

    #[test]
    fn test_requires_garage() {
        let query = ListingQuery {
            requires_garage: Some(true),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        let rows = vec![
            listing(None, None, Some(2)),
            listing(None, None, Some(0)),
            listing(None, None, None),
        ];
        assert_eq!(apply_filters(rows, &query).len(), 1);
    }

    #[test]
    fn test_garage_false_is_not_a_filter() {
        let query = ListingQuery {
            requires_garage: Some(false),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        let rows = vec![listing(None, None, Some(2)), listing(None, None, None)];
        assert_eq!(apply_filters(rows, &query).len(), 2);
    }

    #[test]
    fn test_max_hoa_missing_fee_passes() {
        let query = ListingQuery {
            max_hoa_fee: Some(300.0),
            ..ListingQuery::for_sale("San Mateo, CA")
        };
        let cheap = Listing {
            hoa_fee: Some(250.0),
            ..Default::default()
        };
        let pricey = Listing {
            hoa_fee: Some(400.0),
            ..Default::default()
        };
        let none = Listing::default();
        assert!(matches(&cheap, &query));
        assert!(!matches(&pricey, &query));
        assert!(matches(&none, &query));
    }
}
