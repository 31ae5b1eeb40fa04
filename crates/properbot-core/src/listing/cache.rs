//! ListingCache trait definition.
//!
//! Every harvested row is recorded so past search results survive the
//! conversation that fetched them.

use std::future::Future;
use std::pin::Pin;

use properbot_types::error::RepositoryError;
use properbot_types::listing::{Listing, ListingQuery};

/// Repository trait for persisting harvested listing rows.
///
/// Implementations live in properbot-infra (`SqliteListingCache`).
pub trait ListingCache: Send + Sync {
    /// Record a batch of harvested rows for the query that fetched them.
    fn save_listings(
        &self,
        query: &ListingQuery,
        listings: &[Listing],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Count cached rows.
    fn count_listings(&self) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Object-safe version of [`ListingCache`] with boxed futures.
pub trait ListingCacheDyn: Send + Sync {
    fn save_listings_boxed<'a>(
        &'a self,
        query: &'a ListingQuery,
        listings: &'a [Listing],
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;

    fn count_listings_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<u64, RepositoryError>> + Send + 'a>>;
}

impl<T: ListingCache> ListingCacheDyn for T {
    fn save_listings_boxed<'a>(
        &'a self,
        query: &'a ListingQuery,
        listings: &'a [Listing],
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.save_listings(query, listings))
    }

    fn count_listings_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<u64, RepositoryError>> + Send + 'a>> {
        Box::pin(self.count_listings())
    }
}

/// Type-erased listing cache.
pub struct BoxListingCache {
    inner: Box<dyn ListingCacheDyn + Send + Sync>,
}

impl BoxListingCache {
    /// Wrap a concrete `ListingCache` in a type-erased box.
    pub fn new<T: ListingCache + 'static>(cache: T) -> Self {
        Self {
            inner: Box::new(cache),
        }
    }

    /// Record a batch of harvested rows.
    pub async fn save_listings(
        &self,
        query: &ListingQuery,
        listings: &[Listing],
    ) -> Result<(), RepositoryError> {
        self.inner.save_listings_boxed(query, listings).await
    }

    /// Count cached rows.
    pub async fn count_listings(&self) -> Result<u64, RepositoryError> {
        self.inner.count_listings_boxed().await
    }
}
