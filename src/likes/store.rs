use super::{LikeState, SessionToken};
use crate::db::StoreError;
use crate::orm::article_likes;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr,
    PaginatorTrait, TransactionTrait,
};

#[async_trait]
pub trait LikeStore: Send + Sync {
    async fn get_state(&self, article_slug: &str, session: SessionToken)
        -> Result<LikeState, StoreError>;

    /// Like if not liked, unlike otherwise. Answers with the state after the
    /// write.
    async fn toggle(&self, article_slug: &str, session: SessionToken)
        -> Result<LikeState, StoreError>;
}

pub struct DbLikeStore {
    db: DatabaseConnection,
}

impl DbLikeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn state_on<C: ConnectionTrait>(
    conn: &C,
    article_slug: &str,
    session: SessionToken,
) -> Result<LikeState, DbErr> {
    let count = article_likes::Entity::find()
        .filter(article_likes::Column::ArticleSlug.eq(article_slug))
        .count(conn)
        .await?;
    let liked = article_likes::Entity::find_by_id((article_slug.to_string(), session.0))
        .one(conn)
        .await?
        .is_some();

    Ok(LikeState {
        liked,
        count: count as u64,
    })
}

#[async_trait]
impl LikeStore for DbLikeStore {
    async fn get_state(
        &self,
        article_slug: &str,
        session: SessionToken,
    ) -> Result<LikeState, StoreError> {
        Ok(state_on(&self.db, article_slug, session).await?)
    }

    async fn toggle(
        &self,
        article_slug: &str,
        session: SessionToken,
    ) -> Result<LikeState, StoreError> {
        let txn = self.db.begin().await?;

        let existing = article_likes::Entity::find_by_id((article_slug.to_string(), session.0))
            .one(&txn)
            .await?;

        match existing {
            Some(like) => {
                article_likes::Entity::delete_by_id((like.article_slug, like.session_id))
                    .exec(&txn)
                    .await?;
            }
            None => {
                article_likes::ActiveModel {
                    article_slug: Set(article_slug.to_string()),
                    session_id: Set(session.0),
                    created_at: Set(Utc::now().naive_utc()),
                }
                .insert(&txn)
                .await?;
            }
        }

        let state = state_on(&txn, article_slug, session).await?;
        txn.commit().await?;
        Ok(state)
    }
}
