/// Integration tests for operator login and account lockout
/// Tests the security feature that locks an operator after too many failed login attempts
mod common;

use actix_web::http::Method;
use chrono::{Duration, Utc};
use common::*;
use folio::app_config::SecurityConfig;
use folio::auth::{self, LoginOutcome};
use folio::orm::operators;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

async fn reload(db: &DatabaseConnection, id: Uuid) -> operators::Model {
    operators::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("Failed to load operator")
        .expect("Operator disappeared")
}

async fn attempt(db: &DatabaseConnection, password: &str) -> LoginOutcome {
    auth::login(db, OPERATOR_EMAIL, password, &SecurityConfig::default())
        .await
        .expect("Login function failed")
}

#[actix_rt::test]
async fn test_failed_login_increments_counter() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let operator = create_operator(&db).await;

    for expected in 1..=2 {
        assert_eq!(attempt(&db, "wrong_password").await, LoginOutcome::BadCredentials);
        assert_eq!(reload(&db, operator.id).await.failed_login_attempts, expected);
    }
}

#[actix_rt::test]
async fn test_unknown_email_looks_like_a_bad_password() {
    let db = setup_test_database().await.expect("Failed to set up database");
    create_operator(&db).await;

    let outcome = auth::login(
        &db,
        "nobody@example.com",
        OPERATOR_PASSWORD,
        &SecurityConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(outcome, LoginOutcome::BadCredentials);
}

#[actix_rt::test]
async fn test_account_locks_after_max_attempts() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let operator = create_operator(&db).await;

    for _ in 1..=4 {
        assert_eq!(attempt(&db, "wrong_password").await, LoginOutcome::BadCredentials);
    }
    assert!(
        reload(&db, operator.id).await.locked_until.is_none(),
        "Account should not be locked after 4 attempts"
    );

    assert_eq!(attempt(&db, "wrong_password").await, LoginOutcome::BadCredentials);
    let row = reload(&db, operator.id).await;
    assert_eq!(row.failed_login_attempts, 5);
    assert!(
        row.locked_until.unwrap() > Utc::now().naive_utc(),
        "Account should be locked after 5 attempts"
    );

    // Even the right password is refused while locked
    assert_eq!(attempt(&db, OPERATOR_PASSWORD).await, LoginOutcome::Locked);
}

#[actix_rt::test]
async fn test_expired_lock_allows_login_and_resets() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let operator = create_operator(&db).await;

    let mut active: operators::ActiveModel = operator.clone().into();
    active.failed_login_attempts = Set(5);
    active.locked_until = Set(Some(Utc::now().naive_utc() - Duration::minutes(1)));
    active.update(&db).await.unwrap();

    assert_eq!(
        attempt(&db, OPERATOR_PASSWORD).await,
        LoginOutcome::Success(operator.id)
    );
    let row = reload(&db, operator.id).await;
    assert_eq!(row.failed_login_attempts, 0);
    assert!(row.locked_until.is_none());
}

#[actix_rt::test]
async fn test_expired_lock_restarts_the_count() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let operator = create_operator(&db).await;

    let mut active: operators::ActiveModel = operator.clone().into();
    active.failed_login_attempts = Set(5);
    active.locked_until = Set(Some(Utc::now().naive_utc() - Duration::minutes(1)));
    active.update(&db).await.unwrap();

    assert_eq!(attempt(&db, "wrong_password").await, LoginOutcome::BadCredentials);
    let row = reload(&db, operator.id).await;
    assert_eq!(row.failed_login_attempts, 1);
    assert!(row.locked_until.is_none());
}

#[actix_rt::test]
async fn test_successful_login_resets_counter() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let operator = create_operator(&db).await;

    for _ in 0..3 {
        attempt(&db, "wrong_password").await;
    }
    assert_eq!(reload(&db, operator.id).await.failed_login_attempts, 3);

    assert_eq!(
        attempt(&db, OPERATOR_PASSWORD).await,
        LoginOutcome::Success(operator.id)
    );
    assert_eq!(reload(&db, operator.id).await.failed_login_attempts, 0);
}

#[actix_rt::test]
async fn test_login_endpoint_status_codes() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;

    let try_login = |password: &'static str| {
        let req = srv
            .post("/api/admin/login")
            .insert_header(("x-forwarded-for", unique_ip()));
        async move {
            send_json(
                req,
                &serde_json::json!({ "email": OPERATOR_EMAIL, "password": password }),
            )
            .await
        }
    };

    for _ in 0..5 {
        let res = try_login("wrong_password").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"], "Invalid email or password.");
    }

    let res = try_login(OPERATOR_PASSWORD).await;
    assert_eq!(res.status, 403);
    assert!(res.body["error"].as_str().unwrap().contains("locked"));
}

#[actix_rt::test]
async fn test_session_lifecycle() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send(session.request(&srv, Method::GET, "/api/admin/me")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["email"], OPERATOR_EMAIL);
    assert_eq!(res.body["csrf_token"], session.csrf_token.as_str());

    let res = send(
        srv.post("/api/admin/logout")
            .cookie(session.cookie.clone()),
    )
    .await;
    assert_eq!(res.status, 403);

    let res = send(session.request(&srv, Method::POST, "/api/admin/logout")).await;
    assert_eq!(res.status, 200);
}
