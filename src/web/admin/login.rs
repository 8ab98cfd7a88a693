use crate::app_config;
use crate::auth::{self, AuthenticatedOperator, LoginOutcome, OperatorInfo, BAD_CREDENTIALS};
use crate::ip::client_key;
use crate::middleware::csrf::{get_or_create_csrf_token, validate_csrf_header};
use crate::rate_limit::{check_login_rate_limit, clear_login_attempts};
use crate::web::error::ApiError;
use actix_session::Session;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(post_login).service(post_logout).service(view_me);
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[post("/api/admin/login")]
async fn post_login(
    req: HttpRequest,
    session: Session,
    form: web::Json<LoginForm>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let ip = client_key(&req);
    check_login_rate_limit(&ip, &form.email)?;

    let security = app_config::security();
    let outcome = auth::login(&db, &form.email, &form.password, &security)
        .await
        .map_err(|e| {
            log::error!("Operator login failed on database error: {}", e);
            ApiError::Internal("Unable to log in right now.")
        })?;

    let operator_id = match outcome {
        LoginOutcome::Success(id) => id,
        LoginOutcome::Locked => {
            log::warn!("Login attempt on locked operator account: {}", form.email);
            return Err(ApiError::Forbidden(
                "Account locked due to too many failed login attempts. Please try again later.",
            ));
        }
        LoginOutcome::BadCredentials => {
            log::debug!("Operator login failure for {}", form.email);
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
        }
    };

    clear_login_attempts(&ip, &form.email);
    let operator = auth::find_operator(&db, operator_id).await?;
    let csrf_token = auth::start_session(&session, operator_id)?;
    log::info!("Operator {} logged in", operator_id);

    Ok(HttpResponse::Ok().json(OperatorInfo {
        id: operator.id,
        email: operator.email,
        csrf_token,
    }))
}

#[post("/api/admin/logout")]
async fn post_logout(
    req: HttpRequest,
    session: Session,
    operator: AuthenticatedOperator,
) -> Result<HttpResponse, ApiError> {
    validate_csrf_header(&req, &session)?;
    auth::end_session(&session);
    log::info!("Operator {} logged out", operator.id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[get("/api/admin/me")]
async fn view_me(
    session: Session,
    operator: AuthenticatedOperator,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let account = match auth::find_operator(&db, operator.id).await {
        Ok(account) => account,
        Err(crate::db::StoreError::NotFound) => {
            // Account removed while the session was alive
            auth::end_session(&session);
            return Err(ApiError::Unauthorized("Authentication required."));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok().json(OperatorInfo {
        id: account.id,
        email: account.email,
        csrf_token: get_or_create_csrf_token(&session)?,
    }))
}
