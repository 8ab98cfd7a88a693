//! Public comment submission and the approved-only read view.
//!
//! Comments enter as `pending` and only become visible to visitors once an
//! operator approves them through the moderation console.

pub mod cache;
pub mod store;
pub mod submission;
pub mod validation;

pub use crate::orm::comments::CommentStatus;
pub use cache::PublicListingCache;
pub use store::{CommentStore, DbCommentStore};
pub use submission::{submit, SubmitError, Submission};
pub use validation::{validate_comment, CommentForm, FieldErrors, ValidComment};

use sea_orm::FromQueryResult;
use serde::Serialize;
use std::str::FromStr;

/// A full comment row, as seen by operators.
pub type Comment = crate::orm::comments::Model;

/// Projection of an approved comment safe to show visitors. The email
/// address is never part of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct PublicComment {
    pub id: uuid::Uuid,
    pub first_name: String,
    pub content: String,
    pub website: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            other => Err(format!("Unknown comment status: {}", other)),
        }
    }
}
