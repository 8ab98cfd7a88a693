//! Operator view over every comment.
//!
//! The console keeps a local copy of the full listing. A change event marks
//! it stale and the next read fetches it again. Single-row mutations go to
//! the store first and only then touch the local copy. Bulk mutations are
//! applied to the local copy tentatively, confirmed by the store, and rolled
//! back if the store call fails.

use super::feed::{ChangeListener, CommentEvent};
use crate::comments::store::{dedup_ids, CommentStore};
use crate::comments::{Comment, CommentStatus};
use crate::db::StoreError;
use futures::lock::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Comments per console page.
pub const PAGE_SIZE: usize = 20;

#[derive(Debug)]
pub enum ConsoleError {
    /// A bulk action was requested with no ids.
    EmptySelection,
    Store(StoreError),
}

impl std::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleError::EmptySelection => write!(f, "No comments selected"),
            ConsoleError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<StoreError> for ConsoleError {
    fn from(e: StoreError) -> Self {
        ConsoleError::Store(e)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    fn matches(&self, status: CommentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == CommentStatus::Pending,
            StatusFilter::Approved => status == CommentStatus::Approved,
            StatusFilter::Rejected => status == CommentStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Approve,
    Reject,
    Pending,
    Delete,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub search: Option<String>,
    /// Zero-based page index.
    #[serde(default)]
    pub page: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListingPage {
    pub comments: Vec<Comment>,
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub pending_count: usize,
}

/// Rows as they were before a tentative bulk change.
struct Tentative {
    previous: Vec<Comment>,
}

pub struct ModerationConsole {
    store: Arc<dyn CommentStore>,
    listing: RwLock<Vec<Comment>>,
    stale: AtomicBool,
    /// Held for the duration of a refetch.
    refresh: Mutex<()>,
}

impl ModerationConsole {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self {
            store,
            listing: RwLock::new(Vec::new()),
            stale: AtomicBool::new(true),
            refresh: Mutex::new(()),
        }
    }

    /// Mark the local listing out of date.
    pub fn invalidate(&self) {
        self.stale.store(true, Ordering::SeqCst);
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// The local listing as currently displayed, without refreshing.
    pub fn snapshot(&self) -> Vec<Comment> {
        self.listing.read().map(|l| l.clone()).unwrap_or_default()
    }

    async fn refresh_if_stale(&self) -> Result<(), StoreError> {
        // A reader arriving mid-fetch waits here instead of reading the old copy.
        let _guard = self.refresh.lock().await;
        if !self.stale.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        match self.store.list_all().await {
            Ok(rows) => {
                if let Ok(mut listing) = self.listing.write() {
                    *listing = rows;
                }
                Ok(())
            }
            Err(e) => {
                self.stale.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Every comment regardless of state, newest first.
    pub async fn list_all(&self) -> Result<Vec<Comment>, ConsoleError> {
        self.refresh_if_stale().await?;
        Ok(self.snapshot())
    }

    /// One page of the listing, filtered by state and a case-insensitive
    /// search over name, content and article slug.
    pub async fn query(&self, query: &ListingQuery) -> Result<ListingPage, ConsoleError> {
        let all = self.list_all().await?;
        let pending_count = all
            .iter()
            .filter(|c| c.status == CommentStatus::Pending)
            .count();

        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let matching: Vec<Comment> = all
            .into_iter()
            .filter(|c| query.status.matches(c.status))
            .filter(|c| match &needle {
                Some(needle) => {
                    c.first_name.to_lowercase().contains(needle)
                        || c.content.to_lowercase().contains(needle)
                        || c.article_slug.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        let total = matching.len();
        let total_pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;
        let comments = matching
            .into_iter()
            .skip(query.page.saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .collect();

        Ok(ListingPage {
            comments,
            page: query.page,
            total,
            total_pages,
            pending_count,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Comment, ConsoleError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn pending_count(&self) -> Result<u64, ConsoleError> {
        Ok(self.store.count_by_status(CommentStatus::Pending).await?)
    }

    /// Move one comment to `status`. The local copy changes only once the
    /// store has accepted the write.
    pub async fn set_status(&self, id: Uuid, status: CommentStatus) -> Result<Comment, ConsoleError> {
        let updated = self.store.set_status(id, status).await?;
        if let Ok(mut listing) = self.listing.write() {
            if let Some(row) = listing.iter_mut().find(|c| c.id == id) {
                *row = updated.clone();
            }
        }
        Ok(updated)
    }

    /// Permanently remove one comment.
    pub async fn delete(&self, id: Uuid) -> Result<(), ConsoleError> {
        self.store.delete(id).await?;
        if let Ok(mut listing) = self.listing.write() {
            listing.retain(|c| c.id != id);
        }
        Ok(())
    }

    pub async fn bulk_set_status(
        &self,
        ids: &[Uuid],
        status: CommentStatus,
    ) -> Result<u64, ConsoleError> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Err(ConsoleError::EmptySelection);
        }

        let tentative = self.apply_tentatively(&ids, |row| row.status = status, false);
        match self.store.bulk_set_status(&ids, status).await {
            Ok(changed) => {
                self.invalidate();
                Ok(changed)
            }
            Err(e) => {
                self.roll_back(tentative);
                Err(e.into())
            }
        }
    }

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, ConsoleError> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Err(ConsoleError::EmptySelection);
        }

        let tentative = self.apply_tentatively(&ids, |_| {}, true);
        match self.store.bulk_delete(&ids).await {
            Ok(removed) => {
                self.invalidate();
                Ok(removed)
            }
            Err(e) => {
                self.roll_back(tentative);
                Err(e.into())
            }
        }
    }

    pub async fn bulk(&self, action: BulkAction, ids: &[Uuid]) -> Result<u64, ConsoleError> {
        match action {
            BulkAction::Approve => self.bulk_set_status(ids, CommentStatus::Approved).await,
            BulkAction::Reject => self.bulk_set_status(ids, CommentStatus::Rejected).await,
            BulkAction::Pending => self.bulk_set_status(ids, CommentStatus::Pending).await,
            BulkAction::Delete => self.bulk_delete(ids).await,
        }
    }

    fn apply_tentatively<F>(&self, ids: &[Uuid], change: F, remove: bool) -> Tentative
    where
        F: Fn(&mut Comment),
    {
        let mut previous = Vec::new();
        if let Ok(mut listing) = self.listing.write() {
            for row in listing.iter_mut().filter(|c| ids.contains(&c.id)) {
                previous.push(row.clone());
                change(row);
            }
            if remove {
                listing.retain(|c| !ids.contains(&c.id));
            }
        }
        Tentative { previous }
    }

    fn roll_back(&self, tentative: Tentative) {
        if let Ok(mut listing) = self.listing.write() {
            for old in tentative.previous {
                match listing.iter_mut().find(|c| c.id == old.id) {
                    Some(row) => *row = old,
                    None => listing.push(old),
                }
            }
            listing.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
    }
}

impl ChangeListener for ModerationConsole {
    fn comments_changed(&self, _event: &CommentEvent) {
        self.invalidate();
    }
}
