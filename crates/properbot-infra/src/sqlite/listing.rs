//! SQLite listing cache implementation.
//!
//! Records every harvested row so past search results outlive the
//! conversation that fetched them.

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use properbot_core::listing::cache::ListingCache;
use properbot_types::error::RepositoryError;
use properbot_types::listing::{Listing, ListingQuery};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ListingCache`.
pub struct SqliteListingCache {
    pool: DatabasePool,
}

impl SqliteListingCache {
    /// Create a new cache backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Cached rows for a location, most recently fetched first.
    pub async fn listings_for_location(
        &self,
        location: &str,
        limit: i64,
    ) -> Result<Vec<Listing>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT listing FROM listing_cache WHERE query_location = ? ORDER BY fetched_at DESC LIMIT ?",
        )
        .bind(location)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in &rows {
            let json: String = row
                .try_get("listing")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let listing: Listing = serde_json::from_str(&json)
                .map_err(|e| RepositoryError::Query(format!("invalid cached listing: {e}")))?;
            listings.push(listing);
        }

        Ok(listings)
    }
}

impl ListingCache for SqliteListingCache {
    async fn save_listings(
        &self,
        query: &ListingQuery,
        listings: &[Listing],
    ) -> Result<(), RepositoryError> {
        let fetched_at = Utc::now().to_rfc3339();
        let listing_type = query.listing_type_or_default().to_string();

        for listing in listings {
            let json = serde_json::to_string(listing)
                .map_err(|e| RepositoryError::Query(format!("serialize listing: {e}")))?;

            sqlx::query(
                r#"INSERT INTO listing_cache (id, query_location, listing_type, property_url, listing, fetched_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(Uuid::now_v7().to_string())
            .bind(&query.location)
            .bind(&listing_type)
            .bind(&listing.property_url)
            .bind(json)
            .bind(&fetched_at)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        Ok(())
    }

    async fn count_listings(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM listing_cache")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_cache() -> (SqliteListingCache, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteListingCache::new(pool), dir)
    }

    fn listing(street: &str) -> Listing {
        Listing {
            street: Some(street.to_string()),
            city: Some("San Mateo".to_string()),
            property_url: Some(format!("https://example.com/{street}")),
            list_price: Some(950_000.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_and_count() {
        let (cache, _dir) = test_cache().await;
        let query = ListingQuery::for_sale("San Mateo, CA");

        cache
            .save_listings(&query, &[listing("1 Elm St"), listing("2 Oak Ave")])
            .await
            .unwrap();

        assert_eq!(cache.count_listings().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_listings_for_location_roundtrip() {
        let (cache, _dir) = test_cache().await;
        let query = ListingQuery::for_sale("San Mateo, CA");
        cache
            .save_listings(&query, &[listing("1 Elm St")])
            .await
            .unwrap();

        let rows = cache
            .listings_for_location("San Mateo, CA", 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].street.as_deref(), Some("1 Elm St"));
        assert_eq!(rows[0].list_price, Some(950_000.0));

        let other = cache
            .listings_for_location("Burlingame, CA", 10)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_save_empty_batch_is_noop() {
        let (cache, _dir) = test_cache().await;
        let query = ListingQuery::for_sale("San Mateo, CA");
        cache.save_listings(&query, &[]).await.unwrap();
        assert_eq!(cache.count_listings().await.unwrap(), 0);
    }
}
