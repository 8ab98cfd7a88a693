//! In-memory cache of the public approved-comment listings.
//! Uses moka for TTL-based caching; any comment write empties it.

use super::store::CommentStore;
use super::PublicComment;
use crate::db::StoreError;
use crate::moderation::feed::{ChangeListener, CommentEvent};
use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Approved comments per article slug.
pub struct PublicListingCache {
    listings: Cache<String, Arc<Vec<PublicComment>>>,
    /// Bumped on every invalidation so a load that raced a write is not cached.
    generation: AtomicU64,
}

impl PublicListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            listings: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(1_000)
                .build(),
            generation: AtomicU64::new(0),
        }
    }

    /// Approved comments for an article, loading from the store on a miss.
    pub async fn get_or_load(
        &self,
        store: &dyn CommentStore,
        article_slug: &str,
    ) -> Result<Arc<Vec<PublicComment>>, StoreError> {
        if let Some(cached) = self.listings.get(article_slug) {
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let listing = Arc::new(store.list_approved(article_slug).await?);
        self.keep_if_current(article_slug, listing.clone(), generation);
        Ok(listing)
    }

    /// Cache a listing loaded at `generation` unless a write has happened
    /// since. Checked again after the insert, since an invalidation can land
    /// between the first check and the insert.
    fn keep_if_current(&self, article_slug: &str, listing: Arc<Vec<PublicComment>>, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        self.listings.insert(article_slug.to_string(), listing);
        if self.generation.load(Ordering::SeqCst) != generation {
            self.listings.invalidate(article_slug);
        }
    }

    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.listings.invalidate_all();
    }
}

impl Default for PublicListingCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ChangeListener for PublicListingCache {
    fn comments_changed(&self, _event: &CommentEvent) {
        // Events carry comment ids, not slugs, so drop every listing.
        self.invalidate_all();
    }
}
