/// Integration tests for anonymous article likes
mod common;

use common::*;
use folio::likes::{optimistic, DbLikeStore, LikeState, LikeStore, LikeView, SessionToken};
use uuid::Uuid;

#[actix_rt::test]
async fn test_toggle_twice_restores_original_state() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let store = DbLikeStore::new(db.clone());
    let session = SessionToken(Uuid::new_v4());

    let before = store.get_state("a1", session).await.unwrap();
    assert_eq!(before, LikeState { liked: false, count: 0 });

    let liked = store.toggle("a1", session).await.unwrap();
    assert_eq!(liked, LikeState { liked: true, count: 1 });

    let after = store.toggle("a1", session).await.unwrap();
    assert_eq!(after, before);
}

#[actix_rt::test]
async fn test_count_spans_sessions_and_articles_are_independent() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let store = DbLikeStore::new(db.clone());
    let first = SessionToken(Uuid::new_v4());
    let second = SessionToken(Uuid::new_v4());

    store.toggle("a1", first).await.unwrap();
    let state = store.toggle("a1", second).await.unwrap();
    assert_eq!(state, LikeState { liked: true, count: 2 });

    let other = store.get_state("a2", first).await.unwrap();
    assert_eq!(other, LikeState { liked: false, count: 0 });

    let state = store.get_state("a1", SessionToken(Uuid::new_v4())).await.unwrap();
    assert_eq!(state, LikeState { liked: false, count: 2 });
}

#[actix_rt::test]
async fn test_optimistic_toggle_settles_on_store_result() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let store = DbLikeStore::new(db.clone());
    let session = SessionToken(Uuid::new_v4());

    let mut view = LikeView::new(store.get_state("a1", session).await.unwrap());
    let state = optimistic::toggle(&mut view, &store, "a1", session)
        .await
        .unwrap();

    assert_eq!(state, LikeState { liked: true, count: 1 });
    assert_eq!(view.shown(), state);
    assert!(!view.in_flight());
}

#[actix_rt::test]
async fn test_like_endpoints() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    let session = Uuid::new_v4();
    let ip = unique_ip();

    let res = send(srv.get(format!("/api/articles/a1/likes?session_id={}", session))).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!({ "liked": false, "count": 0 }));

    let toggle = || async {
        send_json(
            srv.post("/api/articles/a1/likes")
                .insert_header(("x-forwarded-for", ip.clone())),
            &serde_json::json!({ "session_id": session }),
        )
        .await
    };

    let res = toggle().await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!({ "liked": true, "count": 1 }));

    let res = toggle().await;
    assert_eq!(res.body, serde_json::json!({ "liked": false, "count": 0 }));
}

#[actix_rt::test]
async fn test_like_requires_valid_session_token() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));

    let res = send_json(
        srv.post("/api/articles/a1/likes")
            .insert_header(("x-forwarded-for", unique_ip())),
        &serde_json::json!({ "session_id": "not-a-uuid" }),
    )
    .await;
    assert_eq!(res.status, 400);

    let res = send(srv.get("/api/articles/a1/likes")).await;
    assert_eq!(res.status, 400);
}
