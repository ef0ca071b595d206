//! Admin gate integration tests.
//!
//! Every mutating route must reject requests without the configured key
//! before the handler runs, and public routes must never ask for one.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use cinelinks_core::CatalogStore;

use common::{fixtures, TestFixture, ADMIN_KEY};

fn gated_routes(id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("POST", "/api/v1/catalog".to_string()),
        ("PUT", format!("/api/v1/catalog/{}", id)),
        ("DELETE", format!("/api/v1/catalog/{}", id)),
        ("PATCH", format!("/api/v1/catalog/{}/toggle-active", id)),
        ("PATCH", format!("/api/v1/catalog/{}/toggle-trending", id)),
        ("PATCH", format!("/api/v1/catalog/{}/toggle-featured", id)),
        ("GET", "/api/v1/admin/catalog".to_string()),
        ("GET", "/api/v1/admin/verify".to_string()),
    ]
}

#[tokio::test]
async fn test_gated_routes_reject_missing_key() {
    let fixture = TestFixture::new();
    let entry = fixture.seed(fixtures::new_movie("Guarded"));

    for (method, path) in gated_routes(&entry.id) {
        let response = match method {
            "GET" => fixture.get(&path).await,
            "POST" => fixture.post(&path, json!({})).await,
            "PUT" => fixture.put(&path, json!({})).await,
            "DELETE" => fixture.delete(&path).await,
            "PATCH" => fixture.patch(&path).await,
            other => unreachable!("unexpected method {}", other),
        };

        assert_eq!(
            response.status,
            StatusCode::UNAUTHORIZED,
            "{} {} should be gated",
            method,
            path
        );
        assert_eq!(
            response.body["message"], "Unauthorized: Invalid admin key",
            "{} {}",
            method, path
        );
    }

    // Nothing changed behind the gate
    let stored = fixture.catalog.get(&entry.id).unwrap();
    assert!(stored.is_active);
    assert!(!stored.is_trending);
    assert!(!stored.is_featured);
    assert_eq!(fixture.catalog.count_all().unwrap(), 1);
}

#[tokio::test]
async fn test_gated_routes_reject_wrong_key() {
    let fixture = TestFixture::new();
    let entry = fixture.seed(fixtures::new_movie("Guarded"));

    for (method, path) in gated_routes(&entry.id) {
        let response = fixture.with_key(method, &path, "not-the-key").await;
        assert_eq!(
            response.status,
            StatusCode::UNAUTHORIZED,
            "{} {} should reject a wrong key",
            method,
            path
        );
    }

    assert_eq!(fixture.catalog.count_all().unwrap(), 1);
}

#[tokio::test]
async fn test_key_is_case_sensitive() {
    let fixture = TestFixture::new();
    let response = fixture
        .with_key("GET", "/api/v1/admin/verify", &ADMIN_KEY.to_uppercase())
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_runs_before_validation() {
    let fixture = TestFixture::new();

    // An invalid body without a key is still a 401, not a 400
    let response = fixture
        .post("/api/v1/catalog", json!({ "title": "" }))
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    // Unknown ids behind the gate are 401 without a key, 404 with one
    let response = fixture.delete("/api/v1/catalog/missing").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
    let response = fixture.admin_delete("/api/v1/catalog/missing").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_routes_need_no_key() {
    let fixture = TestFixture::new();
    let entry = fixture.seed(fixtures::new_movie("Open"));

    let paths = [
        "/api/v1/health".to_string(),
        "/api/v1/config".to_string(),
        "/api/v1/catalog".to_string(),
        format!("/api/v1/catalog/{}", entry.id),
        format!("/api/v1/catalog/{}/related", entry.id),
        "/api/v1/catalog/search-suggestions?q=op".to_string(),
        "/api/v1/catalog/meta/filters".to_string(),
        "/api/v1/catalog/meta/stats".to_string(),
    ];

    for path in &paths {
        let response = fixture.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "GET {}", path);
    }

    let response = fixture
        .post_empty(&format!("/api/v1/catalog/{}/download", entry.id))
        .await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_token_accepted() {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let fixture = TestFixture::new();
    let request = Request::builder()
        .uri("/api/v1/admin/verify")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_KEY))
        .body(Body::empty())
        .unwrap();

    let response = fixture.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
