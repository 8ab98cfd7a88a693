//! Anonymous article likes.
//!
//! A like is the pairing of an article slug with a visitor session token.
//! The token is generated by the client and passed explicitly on every call.

pub mod optimistic;
pub mod store;

pub use optimistic::{LikeView, PendingToggle};
pub use store::{DbLikeStore, LikeStore};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-generated identity of an anonymous visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub Uuid);

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether the session likes the article, and how many sessions do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub count: u64,
}
