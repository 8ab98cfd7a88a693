//! Moderation endpoints

use crate::auth::AuthenticatedOperator;
use crate::comments::CommentStatus;
use crate::middleware::csrf::validate_csrf_header;
use crate::moderation::{BulkAction, ListingQuery, ModerationConsole};
use crate::web::error::ApiError;
use actix_session::Session;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_comments)
        .service(bulk_comments)
        .service(crate::web::moderation_ws::moderation_ws)
        .service(view_comment)
        .service(set_comment_status)
        .service(delete_comment);
}

#[derive(Deserialize)]
struct StatusForm {
    status: CommentStatus,
}

#[derive(Deserialize)]
struct BulkForm {
    action: BulkAction,
    #[serde(default)]
    ids: Vec<Uuid>,
}

#[get("/api/admin/comments")]
async fn list_comments(
    _operator: AuthenticatedOperator,
    query: web::Query<ListingQuery>,
    console: web::Data<ModerationConsole>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(console.query(&query).await?))
}

#[post("/api/admin/comments/bulk")]
async fn bulk_comments(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    form: web::Json<BulkForm>,
    console: web::Data<ModerationConsole>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;

    let affected = console.bulk(form.action, &form.ids).await?;
    log::info!(
        "Bulk {:?} on {} comment(s) by operator {}",
        form.action,
        affected,
        operator.id
    );

    Ok(HttpResponse::Ok().json(json!({ "success": true, "affected": affected })))
}

#[get("/api/admin/comments/{id}")]
async fn view_comment(
    _operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    console: web::Data<ModerationConsole>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(console.get(path.into_inner()).await?))
}

#[post("/api/admin/comments/{id}/status")]
async fn set_comment_status(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    form: web::Json<StatusForm>,
    console: web::Data<ModerationConsole>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;

    let id = path.into_inner();
    let comment = console.set_status(id, form.status).await?;
    log::info!(
        "Comment {} set to {} by operator {}",
        id,
        form.status,
        operator.id
    );

    Ok(HttpResponse::Ok().json(comment))
}

#[delete("/api/admin/comments/{id}")]
async fn delete_comment(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<Uuid>,
    console: web::Data<ModerationConsole>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;

    let id = path.into_inner();
    console.delete(id).await?;
    log::info!("Comment {} deleted by operator {}", id, operator.id);

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
