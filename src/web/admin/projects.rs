use crate::auth::AuthenticatedOperator;
use crate::middleware::csrf::validate_csrf_header;
use crate::projects::{self, ProjectInput};
use crate::web::error::ApiError;
use actix_session::Session;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_projects)
        .service(create_project)
        .service(reorder_projects)
        .service(view_project)
        .service(update_project)
        .service(delete_project);
}

#[derive(Deserialize)]
struct ReorderForm {
    ids: Vec<Uuid>,
}

#[get("/api/admin/projects")]
async fn list_projects(
    _operator: AuthenticatedOperator,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(projects::list_all(&db).await?))
}

#[post("/api/admin/projects")]
async fn create_project(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    form: web::Json<ProjectInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let input = form.into_inner();
    input.check()?;

    let project = projects::create(&db, input).await?;
    log::info!("Project {} created by operator {}", project.id, operator.id);
    Ok(HttpResponse::Created().json(project))
}

/// Set the showcase order from the position of each id
#[post("/api/admin/projects/reorder")]
async fn reorder_projects(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    form: web::Json<ReorderForm>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;

    projects::reorder(&db, &form.ids).await?;
    log::info!(
        "{} project(s) reordered by operator {}",
        form.ids.len(),
        operator.id
    );
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[get("/api/admin/projects/{id}")]
async fn view_project(
    _operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(projects::get(&db, path.into_inner()).await?))
}

#[put("/api/admin/projects/{id}")]
async fn update_project(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    form: web::Json<ProjectInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let input = form.into_inner();
    input.check()?;

    let project = projects::update(&db, path.into_inner(), input).await?;
    log::info!("Project {} updated by operator {}", project.id, operator.id);
    Ok(HttpResponse::Ok().json(project))
}

#[delete("/api/admin/projects/{id}")]
async fn delete_project(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let id = path.into_inner();

    projects::delete(&db, id).await?;
    log::info!("Project {} deleted by operator {}", id, operator.id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
