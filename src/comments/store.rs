//! Persistence for comments.
//!
//! Every successful write is announced on the [`ChangeFeed`] so the
//! moderation console and the public listing cache can refresh.

use super::{Comment, CommentStatus, PublicComment, ValidComment};
use crate::db::StoreError;
use crate::moderation::feed::{ChangeFeed, CommentEvent};
use crate::orm::comments;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ActiveEnum, ActiveValue::Set, ConnectionTrait,
    DatabaseConnection, DbErr, PaginatorTrait, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a validated comment in the `pending` state.
    async fn insert(&self, article_slug: &str, comment: ValidComment)
        -> Result<Comment, StoreError>;

    /// Approved comments of one article, newest first.
    async fn list_approved(&self, article_slug: &str) -> Result<Vec<PublicComment>, StoreError>;

    /// Every comment regardless of state, newest first.
    async fn list_all(&self) -> Result<Vec<Comment>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Comment, StoreError>;

    async fn set_status(&self, id: Uuid, status: CommentStatus) -> Result<Comment, StoreError>;

    /// Change the state of every listed comment, or of none if any id is
    /// unknown. Returns the number of rows changed.
    async fn bulk_set_status(&self, ids: &[Uuid], status: CommentStatus)
        -> Result<u64, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Delete every listed comment, or none if any id is unknown.
    async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn count_by_status(&self, status: CommentStatus) -> Result<u64, StoreError>;

    /// The newest `limit` comments regardless of state.
    async fn recent(&self, limit: u64) -> Result<Vec<Comment>, StoreError>;
}

/// Drop repeated ids while keeping the first occurrence order.
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

pub struct DbCommentStore {
    db: DatabaseConnection,
    feed: Arc<ChangeFeed>,
}

impl DbCommentStore {
    pub fn new(db: DatabaseConnection, feed: Arc<ChangeFeed>) -> Self {
        Self { db, feed }
    }

    /// Count how many of `ids` exist, inside the given transaction.
    async fn count_existing<C: ConnectionTrait>(conn: &C, ids: &[Uuid]) -> Result<u64, DbErr> {
        comments::Entity::find()
            .filter(comments::Column::Id.is_in(ids.to_vec()))
            .count(conn)
            .await
            .map(|n| n as u64)
    }
}

#[async_trait]
impl CommentStore for DbCommentStore {
    async fn insert(
        &self,
        article_slug: &str,
        comment: ValidComment,
    ) -> Result<Comment, StoreError> {
        let row = comments::ActiveModel {
            id: Set(Uuid::new_v4()),
            article_slug: Set(article_slug.trim().to_string()),
            first_name: Set(comment.first_name),
            email: Set(comment.email),
            website: Set(comment.website),
            content: Set(comment.content),
            status: Set(CommentStatus::Pending),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await?;

        self.feed.publish(CommentEvent::insert(row.id));
        Ok(row)
    }

    async fn list_approved(&self, article_slug: &str) -> Result<Vec<PublicComment>, StoreError> {
        Ok(comments::Entity::find()
            .select_only()
            .column(comments::Column::Id)
            .column(comments::Column::FirstName)
            .column(comments::Column::Content)
            .column(comments::Column::Website)
            .column(comments::Column::CreatedAt)
            .filter(comments::Column::ArticleSlug.eq(article_slug))
            .filter(comments::Column::Status.eq(CommentStatus::Approved))
            .order_by_desc(comments::Column::CreatedAt)
            .into_model::<PublicComment>()
            .all(&self.db)
            .await?)
    }

    async fn list_all(&self) -> Result<Vec<Comment>, StoreError> {
        Ok(comments::Entity::find()
            .order_by_desc(comments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn get(&self, id: Uuid) -> Result<Comment, StoreError> {
        comments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn set_status(&self, id: Uuid, status: CommentStatus) -> Result<Comment, StoreError> {
        let existing = self.get(id).await?;

        let updated = if existing.status == status {
            existing
        } else {
            let mut active: comments::ActiveModel = existing.into();
            active.status = Set(status);
            active.update(&self.db).await?
        };

        self.feed.publish(CommentEvent::update(vec![id]));
        Ok(updated)
    }

    async fn bulk_set_status(
        &self,
        ids: &[Uuid],
        status: CommentStatus,
    ) -> Result<u64, StoreError> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        if Self::count_existing(&txn, &ids).await? != ids.len() as u64 {
            txn.rollback().await?;
            return Err(StoreError::NotFound);
        }

        let res = comments::Entity::update_many()
            .col_expr(comments::Column::Status, Expr::value(status.to_value()))
            .filter(comments::Column::Id.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        self.feed.publish(CommentEvent::update(ids));
        Ok(res.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let res = comments::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.feed.publish(CommentEvent::delete(vec![id]));
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        if Self::count_existing(&txn, &ids).await? != ids.len() as u64 {
            txn.rollback().await?;
            return Err(StoreError::NotFound);
        }

        let res = comments::Entity::delete_many()
            .filter(comments::Column::Id.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        self.feed.publish(CommentEvent::delete(ids));
        Ok(res.rows_affected)
    }

    async fn count_by_status(&self, status: CommentStatus) -> Result<u64, StoreError> {
        Ok(comments::Entity::find()
            .filter(comments::Column::Status.eq(status))
            .count(&self.db)
            .await? as u64)
    }

    async fn recent(&self, limit: u64) -> Result<Vec<Comment>, StoreError> {
        Ok(comments::Entity::find()
            .order_by_desc(comments::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }
}
