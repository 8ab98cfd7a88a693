use crate::auth::AuthenticatedOperator;
use crate::comments::FieldErrors;
use crate::middleware::csrf::validate_csrf_header;
use crate::settings::{validate_entry, Settings};
use crate::web::error::ApiError;
use crate::web::settings::parse_category;
use actix_session::Session;
use actix_web::{delete, put, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(save_settings)
        .service(reset_settings)
        .service(save_setting);
}

#[derive(Deserialize)]
struct ValueForm {
    value: String,
}

/// Upsert every pair of the body, answering with the merged category
#[put("/api/admin/settings/{category}")]
async fn save_settings(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<String>,
    form: web::Json<BTreeMap<String, String>>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let category = parse_category(&path)?;

    let mut errors = FieldErrors::new();
    for (key, value) in form.iter() {
        if let Err(e) = validate_entry(key, value) {
            for (field, message) in e.iter() {
                errors.add(field, message);
            }
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let merged = settings.save_all(&db, category, &form).await?;
    log::info!(
        "{} {} setting(s) saved by operator {}",
        form.len(),
        category.as_str(),
        operator.id
    );
    Ok(HttpResponse::Ok().json(merged))
}

/// Restore a category to the built-in defaults
#[delete("/api/admin/settings/{category}")]
async fn reset_settings(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let category = parse_category(&path)?;

    let removed = settings.reset(&db, category).await?;
    log::info!(
        "{} settings reset by operator {} ({} removed)",
        category.as_str(),
        operator.id,
        removed
    );
    Ok(HttpResponse::Ok().json(json!({ "success": true, "removed": removed })))
}

#[put("/api/admin/settings/{category}/{key}")]
async fn save_setting(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
    path: web::Path<(String, String)>,
    form: web::Json<ValueForm>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    let (category, key) = path.into_inner();
    let category = parse_category(&category)?;
    validate_entry(&key, &form.value)?;

    settings.set(&db, category, &key, &form.value).await?;
    log::info!(
        "Setting '{}.{}' updated by operator {}",
        category.as_str(),
        key,
        operator.id
    );
    Ok(HttpResponse::Ok().json(json!({ "key": key, "value": form.value })))
}
