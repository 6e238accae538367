//! Content store access.
//!
//! The gallery's documents live in a hosted headless CMS. Handlers talk to
//! it through the `ContentStore` trait so tests can substitute an in-memory
//! store; `SanityClient` is the production implementation.

mod queries;
mod sanity;

pub use sanity::SanityClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Artwork;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Look up a single artwork by its URL slug.
    async fn artwork_by_slug(&self, slug: &str) -> Result<Option<Artwork>>;

    /// Full gallery listing, newest and featured first.
    async fn gallery(&self) -> Result<Vec<Artwork>>;

    /// Featured artworks for the home payload.
    async fn featured(&self) -> Result<Vec<Artwork>>;

    /// The homepage singleton document, if one exists.
    async fn homepage(&self) -> Result<Option<serde_json::Value>>;

    /// Mark an artwork sold, recording the sale timestamp.
    ///
    /// Requires the elevated write credential; the read path never needs it.
    async fn mark_sold(&self, artwork_id: &str, sold_at: DateTime<Utc>) -> Result<()>;
}
