//! Contact form relay endpoint

use super::error::ApiError;
use crate::email::{ContactRequest, Relay};
use crate::ip::client_key;
use crate::rate_limit::check_contact_rate_limit;
use actix_web::{post, web, HttpRequest, HttpResponse};
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(post_contact);
}

#[post("/api/contact")]
async fn post_contact(
    req: HttpRequest,
    body: web::Json<ContactRequest>,
    relay: web::Data<Relay>,
) -> Result<HttpResponse, ApiError> {
    check_contact_rate_limit(&client_key(&req))?;
    relay.send(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
