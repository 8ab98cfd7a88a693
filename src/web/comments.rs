//! Public comment endpoints

use super::error::ApiError;
use crate::app_config;
use crate::articles;
use crate::comments::{submit, CommentStore, PublicListingCache, Submission};
use crate::ip::client_key;
use crate::rate_limit::check_comment_rate_limit;
use crate::spam;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Serialize;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_comments).service(post_comment);
}

#[derive(Serialize)]
struct SubmitResponse {
    success: bool,
    message: &'static str,
}

/// Approved comments of an article, newest first
#[get("/api/articles/{slug}/comments")]
async fn list_comments(
    path: web::Path<String>,
    store: web::Data<dyn CommentStore>,
    cache: web::Data<PublicListingCache>,
) -> Result<HttpResponse, ApiError> {
    let listing = cache.get_or_load(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(listing.as_ref()))
}

/// Accept a comment for moderation
///
/// Answers 202 for accepted comments and for submissions caught by the
/// decoy field alike.
#[post("/api/articles/{slug}/comments")]
async fn post_comment(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<Submission>,
    store: web::Data<dyn CommentStore>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    check_comment_rate_limit(&client_key(&req))?;

    let accepted = HttpResponse::Accepted().json(SubmitResponse {
        success: true,
        message: "Thank you! Your comment is pending moderation.",
    });

    let submission = body.into_inner();
    if spam::is_tripped(submission.hp_website.as_deref()) {
        log::debug!("Dropped a comment with the decoy field filled in");
        return Ok(accepted);
    }

    let slug = path.into_inner();
    if app_config::comments().require_published_article
        && !articles::is_published(&db, &slug).await?
    {
        return Err(ApiError::NotFound);
    }

    submit(store.get_ref(), &slug, submission).await?;

    Ok(accepted)
}
