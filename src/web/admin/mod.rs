//! Operator-only API
//!
//! Every handler takes an [`AuthenticatedOperator`](crate::auth::AuthenticatedOperator)
//! and every mutation checks the `X-CSRF-Token` header.

mod articles;
mod comments;
mod dashboard;
mod login;
mod projects;
mod settings;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    login::configure(conf);
    dashboard::configure(conf);
    comments::configure(conf);
    articles::configure(conf);
    projects::configure(conf);
    settings::configure(conf);
}
