//! Portfolio projects: the published showcase and CRUD for operators.

use crate::articles::validate_slug;
use crate::comments::FieldErrors;
use crate::db::StoreError;
use crate::orm::articles::PublishStatus;
use crate::orm::projects;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ActiveValue::Set, DatabaseConnection, PaginatorTrait,
    TransactionTrait,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

pub type Project = projects::Model;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(
        length(max = 200, message = "Slug must be at most 200 characters"),
        custom = "validate_slug"
    )]
    pub slug: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Named text sections (challenge, solution, result, ...).
    #[serde(default)]
    pub content: BTreeMap<String, String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    #[validate(url(message = "Please enter a valid URL"))]
    pub external_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_status")]
    pub status: PublishStatus,
    #[serde(default)]
    #[validate(length(max = 70, message = "Meta title must be at most 70 characters"))]
    pub meta_title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 160, message = "Meta description must be at most 160 characters"))]
    pub meta_description: Option<String>,
}

fn default_status() -> PublishStatus {
    PublishStatus::Draft
}

impl ProjectInput {
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

fn sections_to_json(sections: BTreeMap<String, String>) -> serde_json::Value {
    serde_json::Value::Object(
        sections
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect(),
    )
}

/// Published projects in showcase order.
pub async fn list_published(db: &DatabaseConnection) -> Result<Vec<Project>, StoreError> {
    Ok(projects::Entity::find()
        .filter(projects::Column::Status.eq(PublishStatus::Published))
        .order_by_asc(projects::Column::DisplayOrder)
        .order_by_asc(projects::Column::Title)
        .all(db)
        .await?)
}

pub async fn get_published(db: &DatabaseConnection, slug: &str) -> Result<Project, StoreError> {
    projects::Entity::find()
        .filter(projects::Column::Slug.eq(slug))
        .filter(projects::Column::Status.eq(PublishStatus::Published))
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Project>, StoreError> {
    Ok(projects::Entity::find()
        .order_by_asc(projects::Column::DisplayOrder)
        .order_by_desc(projects::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn count(db: &DatabaseConnection) -> Result<u64, StoreError> {
    Ok(projects::Entity::find().count(db).await? as u64)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<Project, StoreError> {
    projects::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

async fn ensure_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), StoreError> {
    let mut query = projects::Entity::find().filter(projects::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(projects::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(StoreError::Conflict(format!(
            "A project with slug '{}' already exists",
            slug
        )));
    }
    Ok(())
}

fn apply(active: &mut projects::ActiveModel, input: ProjectInput) {
    active.title = Set(input.title);
    active.slug = Set(input.slug);
    active.category = Set(input.category);
    active.description = Set(input.description);
    active.content = Set(sections_to_json(input.content));
    active.images = Set(serde_json::Value::from(input.images));
    active.tools = Set(serde_json::Value::from(input.tools));
    active.external_url = Set(input.external_url);
    active.display_order = Set(input.display_order);
    active.status = Set(input.status);
    active.meta_title = Set(input.meta_title);
    active.meta_description = Set(input.meta_description);
}

pub async fn create(db: &DatabaseConnection, input: ProjectInput) -> Result<Project, StoreError> {
    ensure_slug_free(db, &input.slug, None).await?;

    let now = Utc::now().naive_utc();
    let mut active = projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply(&mut active, input);

    Ok(active.insert(db).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: ProjectInput,
) -> Result<Project, StoreError> {
    let existing = get(db, id).await?;
    ensure_slug_free(db, &input.slug, Some(id)).await?;

    let mut active: projects::ActiveModel = existing.into();
    apply(&mut active, input);
    active.updated_at = Set(Utc::now().naive_utc());

    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), StoreError> {
    let res = projects::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Assign `display_order` from the position of each id in `ids`. Nothing
/// changes if any id is unknown.
pub async fn reorder(db: &DatabaseConnection, ids: &[Uuid]) -> Result<(), StoreError> {
    let txn = db.begin().await?;

    for (position, id) in ids.iter().enumerate() {
        let res = projects::Entity::update_many()
            .col_expr(projects::Column::DisplayOrder, Expr::value(position as i32))
            .filter(projects::Column::Id.eq(*id))
            .exec(&txn)
            .await?;

        if res.rows_affected == 0 {
            txn.rollback().await?;
            return Err(StoreError::NotFound);
        }
    }

    txn.commit().await?;
    Ok(())
}
