//! Public project showcase endpoints

use super::error::ApiError;
use crate::projects;
use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_projects).service(view_project);
}

#[get("/api/projects")]
async fn list_projects(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(projects::list_published(&db).await?))
}

#[get("/api/projects/{slug}")]
async fn view_project(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(projects::get_published(&db, &path).await?))
}
