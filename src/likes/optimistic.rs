//! Optimistic like button state.
//!
//! A toggle runs in two phases: the displayed state flips at once, then the
//! store's answer either replaces it or, on failure, the pre-toggle state is
//! restored.
//!
//! This is the state a like button client keeps, for embedders driving a
//! [`LikeStore`] directly. The HTTP handlers answer with the settled state
//! and do not go through it.

use super::store::LikeStore;
use super::{LikeState, SessionToken};
use crate::db::StoreError;

/// Proof of a tentative toggle, needed to settle it.
#[derive(Debug)]
#[must_use]
pub struct PendingToggle {
    before: LikeState,
}

#[derive(Debug, Clone)]
pub struct LikeView {
    shown: LikeState,
    in_flight: bool,
}

impl LikeView {
    pub fn new(initial: LikeState) -> Self {
        Self {
            shown: initial,
            in_flight: false,
        }
    }

    pub fn shown(&self) -> LikeState {
        self.shown
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Flip the displayed state ahead of the store. Returns `None` while a
    /// previous toggle is still unsettled.
    pub fn begin_toggle(&mut self) -> Option<PendingToggle> {
        if self.in_flight {
            return None;
        }

        let before = self.shown;
        self.shown = if before.liked {
            LikeState {
                liked: false,
                count: before.count.saturating_sub(1),
            }
        } else {
            LikeState {
                liked: true,
                count: before.count + 1,
            }
        };
        self.in_flight = true;

        Some(PendingToggle { before })
    }

    /// Adopt the store's answer, or restore the pre-toggle state.
    pub fn settle<E>(
        &mut self,
        pending: PendingToggle,
        outcome: Result<LikeState, E>,
    ) -> Result<LikeState, E> {
        self.in_flight = false;
        match outcome {
            Ok(state) => {
                self.shown = state;
                Ok(state)
            }
            Err(e) => {
                self.shown = pending.before;
                Err(e)
            }
        }
    }
}

/// Run one full optimistic toggle against a store.
pub async fn toggle(
    view: &mut LikeView,
    store: &dyn LikeStore,
    article_slug: &str,
    session: SessionToken,
) -> Result<LikeState, StoreError> {
    let pending = match view.begin_toggle() {
        Some(pending) => pending,
        None => return Ok(view.shown()),
    };

    let outcome = store.toggle(article_slug, session).await;
    if let Err(e) = &outcome {
        log::warn!("Like toggle for {} failed, rolling back: {}", article_slug, e);
    }
    view.settle(pending, outcome)
}
