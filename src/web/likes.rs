//! Public like endpoints

use super::error::ApiError;
use crate::comments::validation::validate_article_slug;
use crate::ip::client_key;
use crate::likes::{LikeStore, SessionToken};
use crate::rate_limit::check_like_rate_limit;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(get_likes).service(toggle_like);
}

#[derive(Deserialize)]
struct SessionParam {
    session_id: SessionToken,
}

#[get("/api/articles/{slug}/likes")]
async fn get_likes(
    path: web::Path<String>,
    query: web::Query<SessionParam>,
    likes: web::Data<dyn LikeStore>,
) -> Result<HttpResponse, ApiError> {
    validate_article_slug(&path)?;
    let state = likes.get_state(&path, query.session_id).await?;
    Ok(HttpResponse::Ok().json(state))
}

/// Like or unlike, answering with the state after the write
#[post("/api/articles/{slug}/likes")]
async fn toggle_like(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<SessionParam>,
    likes: web::Data<dyn LikeStore>,
) -> Result<HttpResponse, ApiError> {
    check_like_rate_limit(&client_key(&req))?;
    validate_article_slug(&path)?;

    let state = likes.toggle(&path, body.session_id).await?;
    log::debug!(
        "Like toggled on {} by session {}: liked={}",
        path.as_str(),
        body.session_id,
        state.liked
    );
    Ok(HttpResponse::Ok().json(state))
}
