//! Test fixtures for creating test data and driving the HTTP app
#![allow(dead_code)]

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::App;
use folio::articles::{self, Article, ArticleInput};
use folio::auth;
use folio::email::Relay;
use folio::orm::articles::PublishStatus;
use folio::settings::Settings;
use folio::web::AppServices;
use sea_orm::DatabaseConnection;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const OPERATOR_EMAIL: &str = "owner@example.com";
pub const OPERATOR_PASSWORD: &str = "correct horse battery";

/// A distinct client address per call, so the global rate limiter never
/// couples two tests together.
pub fn unique_ip() -> String {
    static NEXT: AtomicU32 = AtomicU32::new(1);
    let n = NEXT.fetch_add(1, Ordering::SeqCst);
    format!("198.18.{}.{}", (n >> 8) & 0xff, n & 0xff)
}

pub fn test_services(db: &DatabaseConnection) -> AppServices {
    test_services_with_relay(db, Relay::new(mock_relay_config(), "Folio"))
}

pub fn test_services_with_relay(db: &DatabaseConnection, relay: Relay) -> AppServices {
    AppServices::new(
        db.clone(),
        Arc::new(Settings::new()),
        relay,
        Duration::from_secs(30),
    )
}

pub fn mock_relay_config() -> folio::app_config::RelayConfig {
    folio::app_config::RelayConfig {
        mock: true,
        ..Default::default()
    }
}

/// Running server with sessions, mirroring the production wiring.
pub fn start_server(services: &AppServices) -> actix_test::TestServer {
    let services = services.clone();
    actix_test::start(move || {
        let services = services.clone();
        App::new()
            .configure(move |conf| services.register(conf))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[7u8; 64]))
                    .cookie_secure(false)
                    .build(),
            )
            .configure(folio::web::configure)
    })
}

/// Session cookie and CSRF token of a logged-in operator.
pub struct OperatorSession {
    pub cookie: Cookie<'static>,
    pub csrf_token: String,
}

pub async fn create_operator(db: &DatabaseConnection) -> auth::Operator {
    auth::create_operator(db, OPERATOR_EMAIL, OPERATOR_PASSWORD)
        .await
        .expect("Failed to create operator")
}

pub async fn login(srv: &actix_test::TestServer) -> OperatorSession {
    let mut res = srv
        .post("/api/admin/login")
        .insert_header(("x-forwarded-for", unique_ip()))
        .send_json(&serde_json::json!({
            "email": OPERATOR_EMAIL,
            "password": OPERATOR_PASSWORD,
        }))
        .await
        .expect("Login request failed");
    assert!(res.status().is_success(), "login failed: {}", res.status());

    let cookie = res
        .cookies()
        .expect("Unreadable cookies")
        .iter()
        .find(|c| c.name() == "id")
        .expect("No session cookie")
        .clone()
        .into_owned();
    let body: serde_json::Value = res.json().await.expect("Login body is not JSON");

    OperatorSession {
        cookie,
        csrf_token: body["csrf_token"].as_str().unwrap().to_string(),
    }
}

impl OperatorSession {
    /// Authenticated request carrying the CSRF header.
    pub fn request(
        &self,
        srv: &actix_test::TestServer,
        method: actix_web::http::Method,
        path: &str,
    ) -> awc::ClientRequest {
        srv.request(method, srv.url(path))
            .cookie(self.cookie.clone())
            .insert_header(("X-CSRF-Token", self.csrf_token.clone()))
    }
}

pub async fn create_published_article(db: &DatabaseConnection, slug: &str) -> Article {
    articles::create(
        db,
        ArticleInput {
            title: format!("Article {}", slug),
            slug: slug.to_string(),
            content: Some("Body".to_string()),
            excerpt: None,
            category: None,
            tags: vec!["design".to_string()],
            cover_image_url: None,
            cover_image_alt: None,
            meta_title: None,
            meta_description: None,
            status: PublishStatus::Published,
        },
    )
    .await
    .expect("Failed to create article")
}

/// Comment body that passes validation.
pub fn comment_body(first_name: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "first_name": first_name,
        "email": "jo@x.com",
        "content": content,
    })
}

/// Status, `Retry-After` and JSON body of a finished request.
pub struct Reply {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: serde_json::Value,
}

async fn finish(
    res: Result<
        awc::ClientResponse<impl futures::Stream<Item = Result<actix_web::web::Bytes, awc::error::PayloadError>> + Unpin>,
        awc::error::SendRequestError,
    >,
) -> Reply {
    let mut res = res.expect("Request failed");
    let retry_after = res
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = res.body().await.expect("Unreadable body");

    Reply {
        status: res.status().as_u16(),
        retry_after,
        body: serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
    }
}

pub async fn send(req: awc::ClientRequest) -> Reply {
    finish(req.send().await).await
}

pub async fn send_json(req: awc::ClientRequest, body: &serde_json::Value) -> Reply {
    finish(req.send_json(body).await).await
}

pub async fn post_comment(
    srv: &actix_test::TestServer,
    ip: &str,
    slug: &str,
    body: &serde_json::Value,
) -> Reply {
    send_json(
        srv.post(format!("/api/articles/{}/comments", slug))
            .insert_header(("x-forwarded-for", ip.to_string())),
        body,
    )
    .await
}
