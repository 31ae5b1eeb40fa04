//! The home search tool.
//!
//! Queries the listing source for properties around a location, applies the
//! refinement filters locally, records harvested rows in the cache, and
//! renders the observation. Partial follow-up arguments are merged with the
//! remembered query from the conversation state.

use schemars::schema_for;
use tracing::{debug, info_span, warn};
use tracing::Instrument;

use properbot_types::error::ToolError;
use properbot_types::listing::ListingQuery;

use crate::listing::cache::BoxListingCache;
use crate::listing::source::BoxListingSource;
use crate::listing::{filter, format};

use super::{Tool, ToolContext, ToolOutput};

/// Name the model addresses the tool by.
pub const HOME_SEARCH_TOOL_NAME: &str = "home_search";

/// Default cap on listing rows surfaced per search.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Tool that queries real-estate marketplaces for property listings.
pub struct HomeSearchTool {
    source: BoxListingSource,
    cache: Option<BoxListingCache>,
    max_results: usize,
}

impl HomeSearchTool {
    /// Create the tool over a listing source, with an optional row cache.
    pub fn new(source: BoxListingSource, cache: Option<BoxListingCache>) -> Self {
        Self {
            source,
            cache,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Override the result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Validate a merged query before it reaches the source.
    fn validate(query: &ListingQuery) -> Result<(), ToolError> {
        if query.location.trim().is_empty() {
            return Err(ToolError::InvalidArguments {
                tool: HOME_SEARCH_TOOL_NAME.to_string(),
                message: "location is required".to_string(),
            });
        }

        if let Some(radius) = query.radius {
            if !(radius > 0.0) {
                return Err(ToolError::InvalidArguments {
                    tool: HOME_SEARCH_TOOL_NAME.to_string(),
                    message: format!("radius must be positive, got {radius}"),
                });
            }
        }

        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(ToolError::InvalidArguments {
                    tool: HOME_SEARCH_TOOL_NAME.to_string(),
                    message: format!("min_price {min} exceeds max_price {max}"),
                });
            }
        }

        Ok(())
    }
}

impl Tool for HomeSearchTool {
    fn name(&self) -> &str {
        HOME_SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Searches real-estate marketplaces for property listings around a \
         location. Takes a location string (city/state or zip code), an \
         optional listing type (FOR_SALE, FOR_RENT, SOLD, PENDING; defaults \
         to FOR_SALE), an optional radius in miles (defaults to 5), and \
         optional refinement filters: min_price, max_price, min_beds, \
         min_baths, requires_garage, max_hoa_fee. Omitted fields keep their \
         values from the previous search in this conversation."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(schema_for!(ListingQuery)).unwrap_or_default()
    }

    async fn invoke(
        &self,
        input: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let requested: ListingQuery =
            serde_json::from_value(input).map_err(|e| ToolError::InvalidArguments {
                tool: HOME_SEARCH_TOOL_NAME.to_string(),
                message: e.to_string(),
            })?;

        // Fold the remembered query into this turn's partial arguments.
        let query = match &ctx.last_query {
            Some(previous) => previous.merge_refinement(&requested),
            None => requested,
        };

        Self::validate(&query)?;

        let span = info_span!(
            "tool.home_search",
            location = %query.location,
            listing_type = %query.listing_type_or_default(),
            radius = query.radius_or_default(),
        );

        let harvested = self
            .source
            .search(&query)
            .instrument(span)
            .await
            .map_err(|e| ToolError::Failed {
                tool: HOME_SEARCH_TOOL_NAME.to_string(),
                message: e.to_string(),
            })?;

        let total_harvested = harvested.len();
        let matched = filter::apply_filters(harvested, &query);
        let total_matches = matched.len();

        let shown: Vec<_> = matched.into_iter().take(self.max_results).collect();
        debug!(
            harvested = total_harvested,
            matched = total_matches,
            shown = shown.len(),
            "Home search completed"
        );

        // Cache failures must not break the conversation.
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save_listings(&query, &shown).await {
                warn!(error = %e, "Failed to cache harvested listings");
            }
        }

        let observation = format::format_results(&shown, &query, total_matches);

        Ok(ToolOutput {
            observation,
            updated_query: Some(query),
        })
    }
}
