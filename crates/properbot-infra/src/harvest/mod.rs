//! Listing source implementations for the harvest service boundary.

pub mod fixture;
pub mod http;

pub use fixture::StaticListingSource;
pub use http::HttpListingSource;
