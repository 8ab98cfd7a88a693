//! SeaORM Entity for projects table

use super::articles::PublishStatus;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON object of section name to text
    pub content: Json,
    /// JSON array of image URLs
    pub images: Json,
    /// JSON array of tool names
    pub tools: Json,
    pub external_url: Option<String>,
    pub display_order: i32,
    pub status: PublishStatus,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
