use crate::articles::{self, ArticleInput};
use crate::auth::AuthenticatedOperator;
use crate::middleware::csrf::validate_csrf_header;
use crate::web::error::ApiError;
use actix_session::Session;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_articles)
        .service(create_article)
        .service(view_article)
        .service(update_article)
        .service(delete_article)
        .service(duplicate_article);
}

#[get("/api/admin/articles")]
async fn list_articles(
    _operator: AuthenticatedOperator,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(articles::list_all(&db).await?))
}

#[post("/api/admin/articles")]
async fn create_article(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    form: web::Json<ArticleInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let input = form.into_inner();
    input.check()?;

    let article = articles::create(&db, input).await?;
    log::info!("Article {} created by operator {}", article.id, operator.id);
    Ok(HttpResponse::Created().json(article))
}

#[get("/api/admin/articles/{id}")]
async fn view_article(
    _operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(articles::get(&db, path.into_inner()).await?))
}

#[put("/api/admin/articles/{id}")]
async fn update_article(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    form: web::Json<ArticleInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let input = form.into_inner();
    input.check()?;

    let article = articles::update(&db, path.into_inner(), input).await?;
    log::info!("Article {} updated by operator {}", article.id, operator.id);
    Ok(HttpResponse::Ok().json(article))
}

#[delete("/api/admin/articles/{id}")]
async fn delete_article(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let id = path.into_inner();

    articles::delete(&db, id).await?;
    log::info!("Article {} deleted by operator {}", id, operator.id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[post("/api/admin/articles/{id}/duplicate")]
async fn duplicate_article(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let id = path.into_inner();

    let copy = articles::duplicate(&db, id).await?;
    log::info!(
        "Article {} duplicated as {} by operator {}",
        id,
        copy.id,
        operator.id
    );
    Ok(HttpResponse::Created().json(copy))
}
