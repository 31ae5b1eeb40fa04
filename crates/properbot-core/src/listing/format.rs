//! Human-readable rendering of listing rows.
//!
//! Tool observations and final answers are plain text: one block per
//! listing, joined under a result-count header.

use properbot_types::listing::{Listing, ListingQuery};

/// Render one listing as a human-readable block.
pub fn format_listing(listing: &Listing) -> String {
    let mut lines = Vec::new();

    lines.push(listing.address_line());

    let mut status_line = Vec::new();
    if let Some(status) = &listing.status {
        status_line.push(status.clone());
    }
    if let Some(price) = listing.price() {
        status_line.push(format_price(price));
    }
    if let Some(ppsf) = listing.price_per_sqft {
        status_line.push(format!("${ppsf:.0}/sqft"));
    }
    if !status_line.is_empty() {
        lines.push(status_line.join(" | "));
    }

    let mut facts = Vec::new();
    if let Some(beds) = listing.beds {
        facts.push(format!("{beds} bd"));
    }
    if let Some(baths) = listing.baths() {
        facts.push(format!("{} ba", trim_float(baths)));
    }
    if let Some(sqft) = listing.sqft {
        facts.push(format!("{sqft} sqft"));
    }
    if let Some(garage) = listing.parking_garage {
        facts.push(format!("{garage}-car garage"));
    }
    if let Some(year) = listing.year_built {
        facts.push(format!("built {year}"));
    }
    if let Some(hoa) = listing.hoa_fee {
        facts.push(format!("HOA ${hoa:.0}/mo"));
    }
    if !facts.is_empty() {
        lines.push(facts.join(" | "));
    }

    if let Some(days) = listing.days_on_mls {
        lines.push(format!("{days} days on market"));
    }

    if let Some(url) = &listing.property_url {
        lines.push(url.clone());
    }

    lines.join("\n")
}

/// Render a result set under a count header.
///
/// `total_matches` is the match count before the `max_results` cap, so the
/// header can say "showing 20 of 57".
pub fn format_results(listings: &[Listing], query: &ListingQuery, total_matches: usize) -> String {
    let listing_type = query.listing_type_or_default();

    if listings.is_empty() {
        return format!(
            "No {} listings matched the search near {}.",
            listing_type, query.location
        );
    }

    let header = if total_matches > listings.len() {
        format!(
            "Showing {} of {} {} listings near {}:",
            listings.len(),
            total_matches,
            listing_type,
            query.location
        )
    } else {
        format!(
            "Found {} {} listings near {}:",
            listings.len(),
            listing_type,
            query.location
        )
    };

    let blocks: Vec<String> = listings.iter().map(format_listing).collect();
    format!("{header}\n\n{}", blocks.join("\n\n"))
}

/// Dollar amount with thousands separators ("$1,250,000").
fn format_price(price: f64) -> String {
    let whole = price.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// "2.5" for 2.5, "2" for 2.0.
fn trim_float(value: f64) -> String {
    if (value - value.trunc()).abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
