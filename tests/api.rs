//! End-to-end tests driving the router against an in-memory SQLite store.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use locations_api::{config::Settings, routes, state::AppState, store};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret";

async fn app_with_fixture(fixture_path: PathBuf) -> Router {
    // A single connection so every query sees the same :memory: database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    store::ensure_schema(&pool).await.unwrap();
    let settings = Settings {
        database_url: "sqlite::memory:".to_string(),
        seed_secret: TEST_SECRET.to_string(),
        fixture_path,
        bind_addr: "127.0.0.1:0".to_string(),
    };
    routes::router(AppState {
        pool,
        settings: Arc::new(settings),
    })
}

async fn app() -> Router {
    app_with_fixture(PathBuf::from("/nonexistent/db.json")).await
}

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("api-{}-{name}.json", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn location_body(name: &str, loca: &str) -> Value {
    json!({
        "name": name,
        "loca": loca,
        "img": "img.png",
        "desc": format!("{name} description"),
    })
}

#[tokio::test]
async fn root_reports_service_metadata() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["locations"], "/locations");
}

#[tokio::test]
async fn health_reports_connectivity_and_count() {
    let app = app().await;
    send(&app, "POST", "/locations", Some(location_body("A", "X"))).await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["locations_count"], 1);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn create_returns_201_with_unique_ids() {
    let app = app().await;
    let (status, first) = send(&app, "POST", "/locations", Some(location_body("A", "X"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["name"], "A");
    assert_eq!(first["facilities"], Value::Null);

    let (_, second) = send(&app, "POST", "/locations", Some(location_body("B", "Y"))).await;
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn create_with_missing_required_field_gets_envelope_422() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/locations", Some(json!({"name": "A"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status_code"], 422);
    assert_eq!(body["path"], "/locations");
    assert_eq!(body["method"], "POST");
    assert_eq!(body["error_type"], "validation_error");
    assert!(body["detail"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn read_returns_the_exact_record() {
    let app = app().await;
    let (_, created) = send(
        &app,
        "POST",
        "/locations",
        Some(json!({
            "name": "A", "loca": "X", "img": "i", "desc": "d",
            "facilities": "dock", "layout_info": "grid"
        })),
    )
    .await;

    let (status, body) = send(&app, "GET", &format!("/locations/{}", created["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn read_unknown_or_nonpositive_id_is_404() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/locations/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/locations/0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/locations/-5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "not_found");
}

#[tokio::test]
async fn patch_changes_only_named_fields() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/locations", Some(location_body("A", "X"))).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/locations/{id}"),
        Some(json!({"name": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "B");
    assert_eq!(body["loca"], "X");
    assert_eq!(body["desc"], created["desc"]);
}

#[tokio::test]
async fn patch_with_empty_body_is_400() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/locations", Some(location_body("A", "X"))).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/locations/{}", created["id"]),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_input");
}

#[tokio::test]
async fn patch_null_clears_optional_but_not_required_fields() {
    let app = app().await;
    let (_, created) = send(
        &app,
        "POST",
        "/locations",
        Some(json!({
            "name": "A", "loca": "X", "img": "i", "desc": "d", "facilities": "dock"
        })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/locations/{id}"),
        Some(json!({"facilities": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["facilities"], Value::Null);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/locations/{id}"),
        Some(json!({"name": null})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn patch_unknown_id_is_404() {
    let app = app().await;
    let (status, _) = send(&app, "PATCH", "/locations/99", Some(json!({"name": "B"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_read_is_404() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/locations", Some(location_body("A", "X"))).await;
    let uri = format!("/locations/{}", created["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_limit_is_validated_not_clamped() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/locations?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_input");

    let (status, _) = send(&app, "GET", "/locations?limit=101", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/locations?limit=100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().len() <= 100);
}

#[tokio::test]
async fn list_filters_sorts_and_truncates() {
    let app = app().await;
    for (name, loca) in [("Sky Tower", "Aether"), ("Harbor", "Tides"), ("Dunes", "Aether")] {
        send(&app, "POST", "/locations", Some(location_body(name, loca))).await;
    }

    let (_, body) = send(&app, "GET", "/locations?loca=AETHER", None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sky Tower", "Dunes"]);

    let (_, body) = send(&app, "GET", "/locations?search=harbor", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // search matches desc too, AND-combined with loca
    let (_, body) = send(&app, "GET", "/locations?search=DESCRIPTION&loca=tides", None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Harbor"]);

    let (_, body) = send(&app, "GET", "/locations?sort_by=name&order=DESC", None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sky Tower", "Harbor", "Dunes"]);

    // unrecognized sort key keeps insertion order
    let (status, body) = send(&app, "GET", "/locations?sort_by=img", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sky Tower", "Harbor", "Dunes"]);

    let (_, body) = send(&app, "GET", "/locations?limit=2", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn seed_guards_then_loads_then_conflicts() {
    let fixture = write_fixture(
        "seed-flow",
        r#"{"locations": [
            {"name": "A", "loca": "X", "img": "i", "desc": "d"},
            {"name": "B", "locations": "Y", "img": "i", "desc": "d", "Layout": "grid"},
            {"name": "broken"}
        ]}"#,
    );
    let app = app_with_fixture(fixture).await;

    let (status, body) = send(&app, "POST", "/api/seed?secret=wrong", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "forbidden");
    assert_eq!(body["path"], "/api/seed");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/seed?secret={TEST_SECRET}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["attempted"], 3);

    // alias spellings landed on the internal columns
    let (_, body) = send(&app, "GET", "/locations?loca=y", None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "B");
    assert_eq!(rows[0]["layout_info"], "grid");

    // one-shot: second seed refuses and leaves the count unchanged
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/seed?secret={TEST_SECRET}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "conflict");
    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["locations_count"], 2);
}

#[tokio::test]
async fn seed_with_missing_fixture_file_is_500() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/seed?secret={TEST_SECRET}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "data_format_error");
}

#[tokio::test]
async fn reset_requires_secret_and_reports_count() {
    let app = app().await;
    send(&app, "POST", "/locations", Some(location_body("A", "X"))).await;
    send(&app, "POST", "/locations", Some(location_body("B", "Y"))).await;

    let (status, _) = send(&app, "DELETE", "/api/reset?secret=wrong", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/reset?secret={TEST_SECRET}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["locations_count"], 0);
}

#[tokio::test]
async fn unmatched_routes_get_the_error_envelope() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status_code"], 404);
    assert_eq!(body["path"], "/nope");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["error_type"], "not_found");
}
