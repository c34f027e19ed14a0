//! End-to-end tests for the API router over an in-memory store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode},
};
use quarry_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  quarry_api::api_router(Arc::new(store))
}

async fn request(
  app: &Router,
  method: &str,
  path: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let body = match body {
    Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
    None => Body::empty(),
  };
  let request = Request::builder()
    .method(method)
    .uri(path)
    .header("content-type", "application/json")
    .body(body)
    .unwrap();

  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  let json =
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Null);
  (status, json)
}

async fn create_dataset(app: &Router, name: &str, owner: &str) -> String {
  let (status, body) = request(
    app,
    "POST",
    "/datasets",
    Some(json!({ "name": name, "owner": owner })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["data"]["id"].as_str().unwrap().to_owned()
}

const MISSING_ID: &str = "00000000000000000000000000000000";

// ─── Datasets ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_enveloped_dataset() {
  let app = app().await;

  let (status, body) = request(
    &app,
    "POST",
    "/datasets",
    Some(json!({
      "name": "Test Dataset",
      "owner": "test_user",
      "description": "A test dataset",
      "tags": ["test", "sample"],
    })),
  )
  .await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["message"], "dataset created successfully");

  let data = &body["data"];
  assert_eq!(data["name"], "Test Dataset");
  assert_eq!(data["owner"], "test_user");
  assert_eq!(data["is_deleted"], false);

  let id = data["id"].as_str().unwrap();
  assert_eq!(id.len(), 32);
  assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));

  // Timestamps render as RFC 3339 text.
  let created_at = data["created_at"].as_str().unwrap();
  assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
}

#[tokio::test]
async fn duplicate_create_conflicts() {
  let app = app().await;
  create_dataset(&app, "Test Dataset", "test_user").await;

  let (status, body) = request(
    &app,
    "POST",
    "/datasets",
    Some(json!({ "name": "Test Dataset", "owner": "test_user" })),
  )
  .await;

  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn create_with_empty_name_is_bad_request() {
  let app = app().await;

  let (status, body) = request(
    &app,
    "POST",
    "/datasets",
    Some(json!({ "name": "", "owner": "test_user" })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("validation"));
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
  let app = app().await;

  let (status, body) = request(&app, "GET", "/datasets/not-an-id", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "invalid dataset id");
}

#[tokio::test]
async fn get_missing_dataset_is_not_found() {
  let app = app().await;

  let (status, body) =
    request(&app, "GET", &format!("/datasets/{MISSING_ID}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "dataset not found");
}

#[tokio::test]
async fn update_changes_only_provided_fields() {
  let app = app().await;

  let (_, created) = request(
    &app,
    "POST",
    "/datasets",
    Some(json!({
      "name": "sales",
      "owner": "alice",
      "description": "original",
      "tags": ["v1"],
    })),
  )
  .await;
  let id = created["data"]["id"].as_str().unwrap();

  let (status, body) = request(
    &app,
    "PUT",
    &format!("/datasets/{id}"),
    Some(json!({ "description": "Updated description" })),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "dataset updated successfully");
  let data = &body["data"];
  assert_eq!(data["name"], "sales");
  assert_eq!(data["owner"], "alice");
  assert_eq!(data["tags"], json!(["v1"]));
  assert_eq!(data["description"], "Updated description");
}

#[tokio::test]
async fn update_with_null_clears_description() {
  let app = app().await;

  let (_, created) = request(
    &app,
    "POST",
    "/datasets",
    Some(json!({
      "name": "sales",
      "owner": "alice",
      "description": "to be removed",
    })),
  )
  .await;
  let id = created["data"]["id"].as_str().unwrap();

  let (status, body) = request(
    &app,
    "PUT",
    &format!("/datasets/{id}"),
    Some(json!({ "description": null })),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["description"], Value::Null);
}

#[tokio::test]
async fn update_with_empty_body_is_bad_request() {
  let app = app().await;
  let id = create_dataset(&app, "sales", "alice").await;

  let (status, body) =
    request(&app, "PUT", &format!("/datasets/{id}"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("body"));
}

#[tokio::test]
async fn update_missing_dataset_is_not_found() {
  let app = app().await;

  let (status, _) = request(
    &app,
    "PUT",
    &format!("/datasets/{MISSING_ID}"),
    Some(json!({ "description": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_hides_the_dataset_and_is_not_repeatable() {
  let app = app().await;
  let id = create_dataset(&app, "sales", "alice").await;

  let (status, body) =
    request(&app, "DELETE", &format!("/datasets/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["deleted"], true);

  let (status, _) =
    request(&app, "GET", &format!("/datasets/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) =
    request(&app, "DELETE", &format!("/datasets/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_clamps_out_of_range_paging() {
  let app = app().await;
  create_dataset(&app, "sales", "alice").await;

  let (status, body) =
    request(&app, "GET", "/datasets?page=0&limit=500", None).await;

  assert_eq!(status, StatusCode::OK);
  let data = &body["data"];
  assert_eq!(data["page"], 1);
  assert_eq!(data["limit"], 20);
  assert_eq!(data["total"], 1);
  assert_eq!(data["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_filters_by_owner() {
  let app = app().await;
  create_dataset(&app, "a", "alice").await;
  create_dataset(&app, "b", "bob").await;

  let (status, body) =
    request(&app, "GET", "/datasets?owner=alice", None).await;

  assert_eq!(status, StatusCode::OK);
  let items = body["data"]["items"].as_array().unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["owner"], "alice");
}

#[tokio::test]
async fn stats_reports_totals_and_groups() {
  let app = app().await;

  request(
    &app,
    "POST",
    "/datasets",
    Some(json!({ "name": "a", "owner": "alice", "tags": ["etl"] })),
  )
  .await;
  request(
    &app,
    "POST",
    "/datasets",
    Some(json!({ "name": "b", "owner": "alice", "tags": ["etl", "raw"] })),
  )
  .await;

  let (status, body) = request(&app, "GET", "/datasets/stats", None).await;

  assert_eq!(status, StatusCode::OK);
  let data = &body["data"];
  assert_eq!(data["total_datasets"], 2);
  assert_eq!(data["top_owners"][0]["key"], "alice");
  assert_eq!(data["top_owners"][0]["count"], 2);
  assert_eq!(data["top_tags"][0]["key"], "etl");
  assert_eq!(data["top_tags"][0]["count"], 2);
}

// ─── Quality logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn quality_log_for_missing_dataset_is_not_found() {
  let app = app().await;

  let (status, body) = request(
    &app,
    "POST",
    &format!("/datasets/{MISSING_ID}/quality-logs"),
    Some(json!({ "status": "PASS" })),
  )
  .await;

  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn invalid_status_is_rejected() {
  let app = app().await;
  let id = create_dataset(&app, "sales", "alice").await;

  let (status, _) = request(
    &app,
    "POST",
    &format!("/datasets/{id}/quality-logs"),
    Some(json!({ "status": "WARN" })),
  )
  .await;

  assert!(status.is_client_error());
}

#[tokio::test]
async fn quality_summary_and_latest_status() {
  let app = app().await;
  let id = create_dataset(&app, "sales", "alice").await;

  for status in ["PASS", "PASS", "FAIL"] {
    let (code, _) = request(
      &app,
      "POST",
      &format!("/datasets/{id}/quality-logs"),
      Some(json!({ "status": status, "details": "checked" })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);
  }

  let (status, body) =
    request(&app, "GET", &format!("/datasets/{id}/quality-summary"), None)
      .await;
  assert_eq!(status, StatusCode::OK);
  let data = &body["data"];
  assert_eq!(data["total_logs"], 3);
  assert_eq!(data["pass_count"], 2);
  assert_eq!(data["fail_count"], 1);
  let rate = data["pass_rate"].as_f64().unwrap();
  assert!((rate - 66.67).abs() < 0.1);

  let (status, body) =
    request(&app, "GET", &format!("/datasets/{id}/quality-status"), None)
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["status"], "FAIL");
}

#[tokio::test]
async fn latest_status_without_logs_is_not_found() {
  let app = app().await;
  let id = create_dataset(&app, "sales", "alice").await;

  let (status, body) =
    request(&app, "GET", &format!("/datasets/{id}/quality-status"), None)
      .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("no quality logs"));
}

#[tokio::test]
async fn quality_log_pagination() {
  let app = app().await;
  let id = create_dataset(&app, "sales", "alice").await;

  for _ in 0..5 {
    request(
      &app,
      "POST",
      &format!("/datasets/{id}/quality-logs"),
      Some(json!({ "status": "PASS" })),
    )
    .await;
  }

  let (status, body) = request(
    &app,
    "GET",
    &format!("/datasets/{id}/quality-logs?page=1&limit=3"),
    None,
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  let data = &body["data"];
  assert_eq!(data["items"].as_array().unwrap().len(), 3);
  assert_eq!(data["total"], 5);
  assert_eq!(data["total_pages"], 2);
}

#[tokio::test]
async fn logs_remain_listable_after_dataset_deletion() {
  let app = app().await;
  let id = create_dataset(&app, "sales", "alice").await;

  request(
    &app,
    "POST",
    &format!("/datasets/{id}/quality-logs"),
    Some(json!({ "status": "PASS" })),
  )
  .await;
  request(&app, "DELETE", &format!("/datasets/{id}"), None).await;

  let (status, body) =
    request(&app, "GET", &format!("/datasets/{id}/quality-logs"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["total"], 1);

  // But no new logs can be recorded.
  let (status, _) = request(
    &app,
    "POST",
    &format!("/datasets/{id}/quality-logs"),
    Some(json!({ "status": "FAIL" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
