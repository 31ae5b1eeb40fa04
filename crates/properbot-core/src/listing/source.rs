//! ListingSource trait definition.
//!
//! The narrow interface to the external property-data collaborator. Only
//! `location`, `listing_type`, and `radius` cross this boundary; the
//! remaining query attributes are applied locally by `listing::filter`.

use std::future::Future;
use std::pin::Pin;

use properbot_types::error::HarvestError;
use properbot_types::listing::{Listing, ListingQuery};

/// Trait for property-listing data sources.
///
/// Implementations live in properbot-infra (`HttpListingSource` for the
/// harvest service, `StaticListingSource` for fixtures).
pub trait ListingSource: Send + Sync {
    /// Human-readable source name (e.g., "harvest-http").
    fn name(&self) -> &str;

    /// Fetch listings for a query's location / listing type / radius.
    fn search(
        &self,
        query: &ListingQuery,
    ) -> impl Future<Output = Result<Vec<Listing>, HarvestError>> + Send;
}

/// Object-safe version of [`ListingSource`] with boxed futures.
pub trait ListingSourceDyn: Send + Sync {
    fn name(&self) -> &str;

    fn search_boxed<'a>(
        &'a self,
        query: &'a ListingQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Listing>, HarvestError>> + Send + 'a>>;
}

impl<T: ListingSource> ListingSourceDyn for T {
    fn name(&self) -> &str {
        ListingSource::name(self)
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a ListingQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Listing>, HarvestError>> + Send + 'a>> {
        Box::pin(self.search(query))
    }
}

/// Type-erased listing source for runtime selection.
pub struct BoxListingSource {
    inner: Box<dyn ListingSourceDyn + Send + Sync>,
}

impl BoxListingSource {
    /// Wrap a concrete `ListingSource` in a type-erased box.
    pub fn new<T: ListingSource + 'static>(source: T) -> Self {
        Self {
            inner: Box::new(source),
        }
    }

    /// Human-readable source name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Fetch listings for a query.
    pub async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>, HarvestError> {
        self.inner.search_boxed(query).await
    }
}
