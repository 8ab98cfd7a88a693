//! Public article endpoints

use super::error::ApiError;
use crate::articles;
use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_articles).service(view_article);
}

#[get("/api/articles")]
async fn list_articles(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(articles::list_published(&db).await?))
}

#[get("/api/articles/{slug}")]
async fn view_article(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(articles::get_published(&db, &path).await?))
}
