//! Public settings read endpoint

use super::error::ApiError;
use crate::settings::{SettingCategory, Settings};
use actix_web::{get, web, HttpResponse};

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(view_settings);
}

pub(super) fn parse_category(raw: &str) -> Result<SettingCategory, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

#[get("/api/settings/{category}")]
async fn view_settings(
    path: web::Path<String>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let category = parse_category(&path)?;
    Ok(HttpResponse::Ok().json(settings.all(category)))
}
