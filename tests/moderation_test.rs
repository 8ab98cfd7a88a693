/// Integration tests for the moderation console and admin comment endpoints
mod common;

use common::*;
use folio::comments::{validate_comment, CommentForm, CommentStatus, CommentStore, DbCommentStore};
use folio::db::StoreError;
use folio::moderation::{
    BulkAction, ChangeFeed, ConsoleError, ListingQuery, ModerationConsole, StatusFilter,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

struct Harness {
    store: Arc<DbCommentStore>,
    console: Arc<ModerationConsole>,
    _feed: Arc<ChangeFeed>,
}

fn harness(db: &DatabaseConnection) -> Harness {
    let feed = Arc::new(ChangeFeed::new());
    let store = Arc::new(DbCommentStore::new(db.clone(), feed.clone()));
    let console = Arc::new(ModerationConsole::new(store.clone()));
    feed.subscribe(&console);
    Harness {
        store,
        console,
        _feed: feed,
    }
}

async fn add_comment(store: &DbCommentStore, slug: &str, first_name: &str) -> Uuid {
    let comment = validate_comment(&CommentForm {
        first_name: first_name.to_string(),
        email: "jo@x.com".to_string(),
        website: None,
        content: "x".repeat(20),
    })
    .unwrap();
    store.insert(slug, comment).await.unwrap().id
}

#[actix_rt::test]
async fn test_pending_comment_flows_to_public_after_approval() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let h = harness(&db);

    let id = add_comment(&h.store, "a1", "Jo").await;
    assert!(h.store.list_approved("a1").await.unwrap().is_empty());

    let all = h.console.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].status, CommentStatus::Pending);

    h.console
        .set_status(id, CommentStatus::Approved)
        .await
        .unwrap();

    let public = h.store.list_approved("a1").await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, id);
}

#[actix_rt::test]
async fn test_set_status_is_idempotent_and_missing_row_is_not_found() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let h = harness(&db);
    let id = add_comment(&h.store, "a1", "Jo").await;

    for _ in 0..2 {
        let row = h
            .console
            .set_status(id, CommentStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(row.status, CommentStatus::Rejected);
    }

    let missing = h
        .console
        .set_status(Uuid::new_v4(), CommentStatus::Approved)
        .await;
    assert!(matches!(
        missing,
        Err(ConsoleError::Store(StoreError::NotFound))
    ));
}

#[actix_rt::test]
async fn test_store_change_marks_console_stale() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let h = harness(&db);

    h.console.list_all().await.unwrap();
    assert!(!h.console.is_stale());

    // A write from outside the console
    add_comment(&h.store, "a1", "Jo").await;
    assert!(h.console.is_stale());
    assert_eq!(h.console.list_all().await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_bulk_approve_updates_every_row() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let h = harness(&db);
    let a = add_comment(&h.store, "a1", "Jo").await;
    let b = add_comment(&h.store, "a2", "Al").await;

    let changed = h
        .console
        .bulk(BulkAction::Approve, &[a, b, a])
        .await
        .unwrap();
    assert_eq!(changed, 2);

    for id in [a, b] {
        assert_eq!(
            h.store.get(id).await.unwrap().status,
            CommentStatus::Approved
        );
    }
    assert_eq!(h.console.pending_count().await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_bulk_with_unknown_id_changes_nothing() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let h = harness(&db);
    let a = add_comment(&h.store, "a1", "Jo").await;
    h.console.list_all().await.unwrap();

    let result = h
        .console
        .bulk(BulkAction::Approve, &[a, Uuid::new_v4()])
        .await;
    assert!(matches!(
        result,
        Err(ConsoleError::Store(StoreError::NotFound))
    ));
    assert_eq!(h.store.get(a).await.unwrap().status, CommentStatus::Pending);
    // The tentative change was rolled back in the local listing too
    assert_eq!(h.console.snapshot()[0].status, CommentStatus::Pending);

    let result = h.console.bulk(BulkAction::Delete, &[a, Uuid::new_v4()]).await;
    assert!(result.is_err());
    assert!(h.store.get(a).await.is_ok());
    assert_eq!(h.console.snapshot().len(), 1);
}

#[actix_rt::test]
async fn test_delete_removes_comment_from_every_listing() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let h = harness(&db);
    let a = add_comment(&h.store, "a1", "Jo").await;
    let b = add_comment(&h.store, "a1", "Al").await;
    h.console
        .bulk(BulkAction::Approve, &[a, b])
        .await
        .unwrap();

    h.console.delete(a).await.unwrap();
    let removed = h.console.bulk(BulkAction::Delete, &[b]).await.unwrap();
    assert_eq!(removed, 1);

    assert!(h.store.list_approved("a1").await.unwrap().is_empty());
    assert!(h.console.list_all().await.unwrap().is_empty());
    assert!(matches!(h.store.get(a).await, Err(StoreError::NotFound)));
}

#[actix_rt::test]
async fn test_listing_query_filters_and_searches() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let h = harness(&db);
    let jo = add_comment(&h.store, "portfolio-launch", "Jo").await;
    add_comment(&h.store, "a2", "Alex").await;
    h.console
        .set_status(jo, CommentStatus::Approved)
        .await
        .unwrap();

    let page = h
        .console
        .query(&ListingQuery {
            status: StatusFilter::Pending,
            search: None,
            page: 0,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.pending_count, 1);
    assert_eq!(page.comments[0].first_name, "Alex");

    let page = h
        .console
        .query(&ListingQuery {
            status: StatusFilter::All,
            search: Some("LAUNCH".to_string()),
            page: 0,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.comments[0].id, jo);
}

#[actix_rt::test]
async fn test_admin_comments_require_operator() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));

    let res = send(srv.get("/api/admin/comments")).await;
    assert_eq!(res.status, 401);
    assert!(res.body["error"].is_string());
}

#[actix_rt::test]
async fn test_admin_mutation_requires_csrf_header() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let services = test_services(&db);
    let srv = start_server(&services);
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send_json(
        srv.post("/api/admin/comments/bulk")
            .cookie(session.cookie.clone()),
        &serde_json::json!({ "action": "approve", "ids": [Uuid::new_v4()] }),
    )
    .await;
    assert_eq!(res.status, 403);

    let res = send_json(
        srv.post("/api/admin/comments/bulk")
            .cookie(session.cookie.clone())
            .insert_header(("X-CSRF-Token", "wrong")),
        &serde_json::json!({ "action": "approve", "ids": [Uuid::new_v4()] }),
    )
    .await;
    assert_eq!(res.status, 403);
}

#[actix_rt::test]
async fn test_admin_moderation_over_http() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let services = test_services(&db);
    let srv = start_server(&services);
    create_operator(&db).await;
    let session = login(&srv).await;

    let body = comment_body("Jo", &"x".repeat(20));
    let ip = unique_ip();
    post_comment(&srv, &ip, "a1", &body).await;
    post_comment(&srv, &ip, "a1", &body).await;

    let res = send(
        session.request(&srv, actix_web::http::Method::GET, "/api/admin/comments?status=pending"),
    )
    .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["total"], 2);
    assert_eq!(res.body["pending_count"], 2);
    let ids: Vec<String> = res.body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();

    let res = send_json(
        session.request(&srv, actix_web::http::Method::POST, "/api/admin/comments/bulk"),
        &serde_json::json!({ "action": "approve", "ids": [] }),
    )
    .await;
    assert_eq!(res.status, 400);

    let res = send_json(
        session.request(&srv, actix_web::http::Method::POST, "/api/admin/comments/bulk"),
        &serde_json::json!({ "action": "approve", "ids": ids }),
    )
    .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["affected"], 2);

    let res = send(srv.get("/api/articles/a1/comments")).await;
    assert_eq!(res.body.as_array().unwrap().len(), 2);

    let res = send_json(
        session.request(
            &srv,
            actix_web::http::Method::POST,
            &format!("/api/admin/comments/{}/status", ids[0]),
        ),
        &serde_json::json!({ "status": "rejected" }),
    )
    .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "rejected");

    let res = send(session.request(
        &srv,
        actix_web::http::Method::DELETE,
        &format!("/api/admin/comments/{}", ids[1]),
    ))
    .await;
    assert_eq!(res.status, 200);

    let res = send(srv.get("/api/articles/a1/comments")).await;
    assert_eq!(res.body, serde_json::json!([]));

    let res = send(session.request(
        &srv,
        actix_web::http::Method::GET,
        &format!("/api/admin/comments/{}", ids[1]),
    ))
    .await;
    assert_eq!(res.status, 404);

    let res = send(session.request(&srv, actix_web::http::Method::GET, "/api/admin/dashboard")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["pending_comments"], 0);
    assert_eq!(res.body["recent_comments"].as_array().unwrap().len(), 1);
}
