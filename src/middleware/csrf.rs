/// CSRF (Cross-Site Request Forgery) protection for the admin API
///
/// The token is:
/// - Generated once per operator session
/// - Stored in the session cookie
/// - Handed to the admin client by the login and `me` endpoints
/// - Sent back in the `X-CSRF-Token` header on every state-changing request
///
/// Usage in handlers:
/// ```rust,ignore
/// use crate::middleware::csrf::validate_csrf_header;
///
/// #[delete("/api/admin/comments/{id}")]
/// async fn delete_comment(req: HttpRequest, session: Session) -> Result<HttpResponse, ApiError> {
///     validate_csrf_header(&req, &session)?;
///     // Process request...
/// }
/// ```
use crate::web::error::ApiError;
use actix_session::Session;
use actix_web::HttpRequest;
use rand::{distributions::Alphanumeric, Rng};

pub const CSRF_TOKEN_LENGTH: usize = 32;
pub const CSRF_HEADER: &str = "X-CSRF-Token";
const CSRF_SESSION_KEY: &str = "csrf_token";

/// Generate a new CSRF token
pub fn generate_csrf_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Get or create CSRF token for the current session
pub fn get_or_create_csrf_token(session: &Session) -> Result<String, ApiError> {
    match session.get::<String>(CSRF_SESSION_KEY) {
        Ok(Some(token)) => Ok(token),
        _ => {
            let token = generate_csrf_token();
            session.insert(CSRF_SESSION_KEY, token.clone())?;
            Ok(token)
        }
    }
}

/// Compare a provided token against the one stored in the session
pub fn validate_csrf_token(session: &Session, provided_token: &str) -> Result<(), ApiError> {
    let expected_token = session
        .get::<String>(CSRF_SESSION_KEY)?
        .ok_or(ApiError::Forbidden("CSRF token not found in session"))?;

    if provided_token != expected_token {
        log::warn!("CSRF token validation failed");
        return Err(ApiError::Forbidden("Invalid CSRF token"));
    }

    Ok(())
}

/// Validate the `X-CSRF-Token` header of a state-changing request
///
/// Call this at the beginning of every admin handler that mutates data.
pub fn validate_csrf_header(req: &HttpRequest, session: &Session) -> Result<(), ApiError> {
    let provided = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Forbidden("Missing CSRF token"))?;

    validate_csrf_token(session, provided)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_alphanumeric_and_distinct() {
        let a = generate_csrf_token();
        let b = generate_csrf_token();
        assert_eq!(a.len(), CSRF_TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
