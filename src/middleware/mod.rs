pub mod csrf;

pub use csrf::{get_or_create_csrf_token, validate_csrf_header, CSRF_HEADER};
