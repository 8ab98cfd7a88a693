/// Integration tests for articles, projects and settings management
mod common;

use actix_web::http::Method;
use common::*;
use folio::articles;
use folio::orm::articles::PublishStatus;
use folio::projects::{self, ProjectInput};
use folio::settings::{SettingCategory, Settings};
use std::collections::BTreeMap;
use uuid::Uuid;

fn article_json(title: &str, slug: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "slug": slug,
        "content": "Body text",
        "tags": ["rust", "web"],
        "status": status,
    })
}

fn project_input(title: &str, slug: &str) -> ProjectInput {
    ProjectInput {
        title: title.to_string(),
        slug: slug.to_string(),
        category: Some("branding".to_string()),
        description: None,
        content: BTreeMap::new(),
        images: Vec::new(),
        tools: vec!["Figma".to_string()],
        external_url: None,
        display_order: 0,
        status: PublishStatus::Published,
        meta_title: None,
        meta_description: None,
    }
}

#[actix_rt::test]
async fn test_drafts_are_hidden_from_visitors() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/articles"),
        &article_json("Hello", "hello", "published"),
    )
    .await;
    assert_eq!(res.status, 201);
    assert!(res.body["published_at"].is_string());

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/articles"),
        &article_json("Later", "later", "draft"),
    )
    .await;
    assert_eq!(res.status, 201);
    assert!(res.body["published_at"].is_null());

    let res = send(srv.get("/api/articles")).await;
    let listing = res.body.as_array().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["slug"], "hello");
    assert!(listing[0].get("content").is_none());

    assert_eq!(send(srv.get("/api/articles/hello")).await.status, 200);
    assert_eq!(send(srv.get("/api/articles/later")).await.status, 404);

    let res = send(session.request(&srv, Method::GET, "/api/admin/articles")).await;
    assert_eq!(res.body.as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_article_slug_conflict_and_validation() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/articles"),
        &article_json("One", "same-slug", "draft"),
    )
    .await;
    assert_eq!(res.status, 201);

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/articles"),
        &article_json("Two", "same-slug", "draft"),
    )
    .await;
    assert_eq!(res.status, 409);

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/articles"),
        &article_json("", "Bad Slug", "draft"),
    )
    .await;
    assert_eq!(res.status, 422);
    assert!(res.body["errors"]["title"].is_string());
    assert!(res.body["errors"]["slug"].is_string());
}

#[actix_rt::test]
async fn test_article_duplicate_is_a_draft_copy() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;
    let session = login(&srv).await;
    let source = create_published_article(&db, "original").await;

    let res = send(session.request(
        &srv,
        Method::POST,
        &format!("/api/admin/articles/{}/duplicate", source.id),
    ))
    .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["title"], "Article original (copy)");
    assert_eq!(res.body["status"], "draft");
    assert!(res.body["slug"]
        .as_str()
        .unwrap()
        .starts_with("original-copy-"));
    assert_eq!(res.body["tags"], serde_json::json!(["design"]));

    assert_eq!(articles::count(&db).await.unwrap(), 2);
    assert_eq!(articles::list_published(&db).await.unwrap().len(), 1);

    let res = send(session.request(
        &srv,
        Method::POST,
        &format!("/api/admin/articles/{}/duplicate", Uuid::new_v4()),
    ))
    .await;
    assert_eq!(res.status, 404);
}

#[actix_rt::test]
async fn test_article_update_stamps_first_publication() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/articles"),
        &article_json("Draft", "draft-post", "draft"),
    )
    .await;
    let id = res.body["id"].as_str().unwrap().to_string();

    let res = send_json(
        session.request(&srv, Method::PUT, &format!("/api/admin/articles/{}", id)),
        &article_json("Draft", "draft-post", "published"),
    )
    .await;
    assert_eq!(res.status, 200);
    assert!(res.body["published_at"].is_string());
    assert_eq!(send(srv.get("/api/articles/draft-post")).await.status, 200);

    let res = send(session.request(&srv, Method::DELETE, &format!("/api/admin/articles/{}", id))).await;
    assert_eq!(res.status, 200);
    assert_eq!(send(srv.get("/api/articles/draft-post")).await.status, 404);
}

#[actix_rt::test]
async fn test_project_reorder() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let first = projects::create(&db, project_input("Alpha", "alpha")).await.unwrap();
    let second = projects::create(&db, project_input("Beta", "beta")).await.unwrap();
    let third = projects::create(&db, project_input("Gamma", "gamma")).await.unwrap();

    projects::reorder(&db, &[third.id, first.id, second.id])
        .await
        .unwrap();
    let order: Vec<String> = projects::list_published(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(order, vec!["gamma", "alpha", "beta"]);

    // An unknown id leaves the previous order untouched
    assert!(projects::reorder(&db, &[first.id, Uuid::new_v4()]).await.is_err());
    assert_eq!(projects::get(&db, third.id).await.unwrap().display_order, 0);
    assert_eq!(projects::get(&db, first.id).await.unwrap().display_order, 1);
}

#[actix_rt::test]
async fn test_project_endpoints() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/projects"),
        &serde_json::json!({
            "title": "Rebrand",
            "slug": "rebrand",
            "content": { "challenge": "Old logo", "result": "New logo" },
            "status": "published",
        }),
    )
    .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["content"]["challenge"], "Old logo");
    let id = res.body["id"].as_str().unwrap().to_string();

    let res = send(srv.get("/api/projects/rebrand")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["title"], "Rebrand");

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/projects/reorder"),
        &serde_json::json!({ "ids": [id] }),
    )
    .await;
    assert_eq!(res.status, 200);

    let res = send_json(
        session.request(&srv, Method::POST, "/api/admin/projects/reorder"),
        &serde_json::json!({ "ids": [Uuid::new_v4()] }),
    )
    .await;
    assert_eq!(res.status, 404);
}

#[actix_rt::test]
async fn test_settings_save_all_and_reset() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let services = test_services(&db);
    let srv = start_server(&services);
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send_json(
        session.request(&srv, Method::PUT, "/api/admin/settings/design"),
        &serde_json::json!({ "primary_color": "#ff6600", "font": "Inter" }),
    )
    .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["font"], "Inter");

    let res = send_json(
        session.request(&srv, Method::PUT, "/api/admin/settings/design/font"),
        &serde_json::json!({ "value": "Lora" }),
    )
    .await;
    assert_eq!(res.status, 200);

    let res = send(srv.get("/api/settings/design")).await;
    assert_eq!(
        res.body,
        serde_json::json!({ "font": "Lora", "primary_color": "#ff6600" })
    );

    // The cache and the table agree
    let reloaded = Settings::new();
    reloaded.load_from_database(&db).await.unwrap();
    assert_eq!(
        reloaded.get(SettingCategory::Design, "font").as_deref(),
        Some("Lora")
    );

    let res = send(session.request(&srv, Method::DELETE, "/api/admin/settings/design")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["removed"], 2);
    assert_eq!(send(srv.get("/api/settings/design")).await.body, serde_json::json!({}));
    assert!(services.settings.all(SettingCategory::Design).is_empty());
}

#[actix_rt::test]
async fn test_settings_reject_bad_entries_and_categories() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let srv = start_server(&test_services(&db));
    create_operator(&db).await;
    let session = login(&srv).await;

    let res = send_json(
        session.request(&srv, Method::PUT, "/api/admin/settings/site"),
        &serde_json::json!({ "title": "ok", "hero": "v".repeat(10_001) }),
    )
    .await;
    assert_eq!(res.status, 422);
    assert!(res.body["errors"]["hero"].is_string());
    assert_eq!(send(srv.get("/api/settings/site")).await.body, serde_json::json!({}));

    assert_eq!(send(srv.get("/api/settings/theme")).await.status, 404);
}
