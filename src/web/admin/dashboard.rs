use crate::articles;
use crate::auth::AuthenticatedOperator;
use crate::comments::{Comment, CommentStatus, CommentStore};
use crate::projects;
use crate::web::error::ApiError;
use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Serialize;

const RECENT_COMMENTS: u64 = 5;
const RECENT_ARTICLES: u64 = 3;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(view_dashboard);
}

#[derive(Serialize)]
struct Dashboard {
    pending_comments: u64,
    articles: u64,
    projects: u64,
    recent_comments: Vec<Comment>,
    recent_articles: Vec<articles::Article>,
}

#[get("/api/admin/dashboard")]
async fn view_dashboard(
    _operator: AuthenticatedOperator,
    db: web::Data<DatabaseConnection>,
    comments: web::Data<dyn CommentStore>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(Dashboard {
        pending_comments: comments.count_by_status(CommentStatus::Pending).await?,
        articles: articles::count(&db).await?,
        projects: projects::count(&db).await?,
        recent_comments: comments.recent(RECENT_COMMENTS).await?,
        recent_articles: articles::recent(&db, RECENT_ARTICLES).await?,
    }))
}
