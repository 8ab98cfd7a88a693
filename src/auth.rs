//! Operator accounts, login with lockout, and the session extractor

use crate::app_config::SecurityConfig;
use crate::db::StoreError;
use crate::middleware::csrf::get_or_create_csrf_token;
use crate::orm::operators;
use crate::web::error::ApiError;
use actix_session::{Session, SessionExt};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use futures::future::{ready, Ready};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, Set};
use serde::Serialize;
use uuid::Uuid;

pub type Operator = operators::Model;

const OPERATOR_SESSION_KEY: &str = "operator_id";

/// Same message for unknown email and wrong password.
pub const BAD_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(Uuid),
    BadCredentials,
    Locked,
}

#[derive(Debug)]
pub enum AuthError {
    Hash(argon2::password_hash::Error),
    Store(StoreError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Hash(e) => write!(f, "Password hashing failed: {}", e),
            AuthError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Store(e)
    }
}

impl From<DbErr> for AuthError {
    fn from(e: DbErr) -> Self {
        AuthError::Store(e.into())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AuthError::Hash(e)
    }
}

fn argon2() -> Argon2<'static> {
    Argon2::default()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("Stored operator password hash is malformed: {}", e);
            false
        }
    }
}

/// Create an operator account. Fails with a conflict if the email is taken.
pub async fn create_operator(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Operator, AuthError> {
    let email = normalize_email(email);
    let taken = operators::Entity::find()
        .filter(operators::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(StoreError::Conflict(format!("operator {} already exists", email)).into());
    }

    let operator = operators::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(password)?),
        failed_login_attempts: Set(0),
        locked_until: Set(None),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await?;

    log::info!("Created operator {} ({})", operator.email, operator.id);
    Ok(operator)
}

pub async fn find_operator(db: &DatabaseConnection, id: Uuid) -> Result<Operator, StoreError> {
    operators::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

/// Check operator credentials, counting failures towards a temporary lock.
pub async fn login(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    security: &SecurityConfig,
) -> Result<LoginOutcome, DbErr> {
    let now = Utc::now().naive_utc();
    let operator = operators::Entity::find()
        .filter(operators::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?;

    let operator = match operator {
        Some(operator) => operator,
        None => return Ok(LoginOutcome::BadCredentials),
    };

    let mut failed_attempts = operator.failed_login_attempts;
    if let Some(locked_until) = operator.locked_until {
        if locked_until > now {
            return Ok(LoginOutcome::Locked);
        }
        // Lock has expired
        failed_attempts = 0;
    }

    if !verify_password(password, &operator.password_hash) {
        let attempts = failed_attempts + 1;
        let mut active: operators::ActiveModel = operator.clone().into();
        active.failed_login_attempts = Set(attempts);
        active.locked_until = Set(None);

        if attempts >= security.max_failed_logins as i32 {
            let lock_until =
                now + chrono::Duration::minutes(security.lockout_duration_minutes as i64);
            active.locked_until = Set(Some(lock_until));
            log::warn!(
                "Operator locked after {} failed login attempts: operator_id={}",
                attempts,
                operator.id
            );
        }

        active.update(db).await?;
        return Ok(LoginOutcome::BadCredentials);
    }

    if operator.failed_login_attempts > 0 || operator.locked_until.is_some() {
        let mut active: operators::ActiveModel = operator.clone().into();
        active.failed_login_attempts = Set(0);
        active.locked_until = Set(None);
        active.update(db).await?;
    }

    Ok(LoginOutcome::Success(operator.id))
}

/// Bind the session to an operator and hand out its CSRF token.
pub fn start_session(session: &Session, operator_id: Uuid) -> Result<String, ApiError> {
    session.renew();
    session.insert(OPERATOR_SESSION_KEY, operator_id)?;
    get_or_create_csrf_token(session)
}

pub fn end_session(session: &Session) {
    session.purge();
}

/// Operator view returned by login and `me`.
#[derive(Debug, Serialize)]
pub struct OperatorInfo {
    pub id: Uuid,
    pub email: String,
    pub csrf_token: String,
}

/// Extractor for admin handlers. Rejects the request with 401 when the
/// session carries no operator.
#[derive(Clone, Copy, Debug)]
pub struct AuthenticatedOperator {
    pub id: Uuid,
}

impl AuthenticatedOperator {
    fn from_session(session: &Session) -> Result<Self, ApiError> {
        match session.get::<Uuid>(OPERATOR_SESSION_KEY)? {
            Some(id) => Ok(Self { id }),
            None => Err(ApiError::Unauthorized("Authentication required.")),
        }
    }
}

impl FromRequest for AuthenticatedOperator {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_session(&req.get_session()))
    }
}
