//! Blog articles: the published listing for visitors and CRUD for operators.

use crate::comments::FieldErrors;
use crate::db::StoreError;
use crate::orm::articles::{self, PublishStatus};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, DatabaseConnection, FromQueryResult, PaginatorTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub type Article = articles::Model;

/// Article fields without the body, for listings.
#[derive(Clone, Debug, Serialize, FromQueryResult)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: serde_json::Value,
    pub cover_image_url: Option<String>,
    pub cover_image_alt: Option<String>,
    pub published_at: Option<chrono::NaiveDateTime>,
}

/// Lowercase ASCII letters, digits and single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("Slug may only contain lowercase letters, digits and hyphens".into());
        Err(err)
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ArticleInput {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(
        length(max = 200, message = "Slug must be at most 200 characters"),
        custom = "validate_slug"
    )]
    pub slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(url(message = "Please enter a valid URL"))]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub cover_image_alt: Option<String>,
    #[serde(default)]
    #[validate(length(max = 70, message = "Meta title must be at most 70 characters"))]
    pub meta_title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 160, message = "Meta description must be at most 160 characters"))]
    pub meta_description: Option<String>,
    #[serde(default = "default_status")]
    pub status: PublishStatus,
}

fn default_status() -> PublishStatus {
    PublishStatus::Draft
}

impl ArticleInput {
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// Published articles, most recently published first.
pub async fn list_published(db: &DatabaseConnection) -> Result<Vec<ArticleSummary>, StoreError> {
    Ok(articles::Entity::find()
        .select_only()
        .column(articles::Column::Id)
        .column(articles::Column::Title)
        .column(articles::Column::Slug)
        .column(articles::Column::Excerpt)
        .column(articles::Column::Category)
        .column(articles::Column::Tags)
        .column(articles::Column::CoverImageUrl)
        .column(articles::Column::CoverImageAlt)
        .column(articles::Column::PublishedAt)
        .filter(articles::Column::Status.eq(PublishStatus::Published))
        .order_by_desc(articles::Column::PublishedAt)
        .into_model::<ArticleSummary>()
        .all(db)
        .await?)
}

pub async fn get_published(db: &DatabaseConnection, slug: &str) -> Result<Article, StoreError> {
    articles::Entity::find()
        .filter(articles::Column::Slug.eq(slug))
        .filter(articles::Column::Status.eq(PublishStatus::Published))
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn is_published(db: &DatabaseConnection, slug: &str) -> Result<bool, StoreError> {
    match get_published(db, slug).await {
        Ok(_) => Ok(true),
        Err(StoreError::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Every article, newest first.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Article>, StoreError> {
    Ok(articles::Entity::find()
        .order_by_desc(articles::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<Article>, StoreError> {
    Ok(articles::Entity::find()
        .order_by_desc(articles::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn count(db: &DatabaseConnection) -> Result<u64, StoreError> {
    Ok(articles::Entity::find().count(db).await? as u64)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<Article, StoreError> {
    articles::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

async fn ensure_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), StoreError> {
    let mut query = articles::Entity::find().filter(articles::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(articles::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(StoreError::Conflict(format!(
            "An article with slug '{}' already exists",
            slug
        )));
    }
    Ok(())
}

fn apply(active: &mut articles::ActiveModel, input: ArticleInput) {
    active.title = Set(input.title);
    active.slug = Set(input.slug);
    active.content = Set(input.content);
    active.excerpt = Set(input.excerpt);
    active.category = Set(input.category);
    active.tags = Set(serde_json::Value::from(input.tags));
    active.cover_image_url = Set(input.cover_image_url);
    active.cover_image_alt = Set(input.cover_image_alt);
    active.meta_title = Set(input.meta_title);
    active.meta_description = Set(input.meta_description);
    active.status = Set(input.status);
}

pub async fn create(db: &DatabaseConnection, input: ArticleInput) -> Result<Article, StoreError> {
    ensure_slug_free(db, &input.slug, None).await?;

    let now = Utc::now().naive_utc();
    let published_at = (input.status == PublishStatus::Published).then(|| now);
    let mut active = articles::ActiveModel {
        id: Set(Uuid::new_v4()),
        published_at: Set(published_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply(&mut active, input);

    Ok(active.insert(db).await?)
}

/// Replace an article's editable fields. `published_at` is stamped the
/// first time the article is saved as published.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: ArticleInput,
) -> Result<Article, StoreError> {
    let existing = get(db, id).await?;
    ensure_slug_free(db, &input.slug, Some(id)).await?;

    let now = Utc::now().naive_utc();
    let stamp = input.status == PublishStatus::Published && existing.published_at.is_none();
    let mut active: articles::ActiveModel = existing.into();
    apply(&mut active, input);
    if stamp {
        active.published_at = Set(Some(now));
    }
    active.updated_at = Set(now);

    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), StoreError> {
    let res = articles::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Copy an article as a new draft with a unique slug.
pub async fn duplicate(db: &DatabaseConnection, id: Uuid) -> Result<Article, StoreError> {
    let source = get(db, id).await?;
    let now = Utc::now();

    let copy = articles::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(format!("{} (copy)", source.title)),
        slug: Set(format!("{}-copy-{}", source.slug, now.timestamp_millis())),
        content: Set(source.content),
        excerpt: Set(source.excerpt),
        category: Set(source.category),
        tags: Set(source.tags),
        cover_image_url: Set(source.cover_image_url),
        cover_image_alt: Set(source.cover_image_alt),
        meta_title: Set(source.meta_title),
        meta_description: Set(source.meta_description),
        status: Set(PublishStatus::Draft),
        published_at: Set(None),
        created_at: Set(now.naive_utc()),
        updated_at: Set(now.naive_utc()),
    };

    Ok(copy.insert(db).await?)
}
