//! Handlers for `/datasets` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/datasets` | Body: [`CreateBody`]; 201, or 409 on a duplicate |
//! | `GET`    | `/datasets` | Optional `?owner=&tag=&page=&limit=` |
//! | `GET`    | `/datasets/stats` | Aggregate statistics |
//! | `GET`    | `/datasets/:id` | 404 if not live |
//! | `PUT`    | `/datasets/:id` | Body: [`UpdateBody`]; absent fields unchanged |
//! | `DELETE` | `/datasets/:id` | Soft delete; 404 if nothing transitioned |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  response::IntoResponse,
};
use quarry_core::{
  RecordId,
  dataset::{Dataset, DatasetPatch, DatasetStats, NewDataset},
  page::{Page, PageRequest},
  store::{CatalogStore, DatasetFilter},
};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::{
  error::ApiError,
  response::{self, Envelope},
};

fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
  RecordId::parse(raw)
    .map_err(|_| ApiError::BadRequest("invalid dataset id".into()))
}

/// Deserialise `Option<Option<T>>` so an explicit JSON null becomes
/// `Some(None)` while an absent field stays `None` (via `#[serde(default)]`).
pub(crate) fn double_option<'de, T, D>(
  deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Deserialize::deserialize(deserializer).map(Some)
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub owner:       String,
  pub description: Option<String>,
  #[serde(default)]
  pub tags:        Vec<String>,
}

/// `POST /datasets`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let dataset = store
    .create_dataset(NewDataset {
      name:        body.name,
      owner:       body.owner,
      description: body.description,
      tags:        body.tags,
    })
    .await?;
  Ok(response::created(dataset, "dataset created successfully"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner: Option<String>,
  pub tag:   Option<String>,
  pub page:  Option<i64>,
  pub limit: Option<i64>,
}

/// `GET /datasets[?owner=...][&tag=...][&page=N][&limit=N]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Page<Dataset>>>, ApiError>
where
  S: CatalogStore,
{
  let page = PageRequest::clamped(
    params.page.unwrap_or(1),
    params.limit.unwrap_or(i64::from(PageRequest::DEFAULT_LIMIT)),
  );
  let filter = DatasetFilter { owner: params.owner, tag: params.tag };

  let result = store.list_datasets(filter, page).await?;
  Ok(response::ok(result))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /datasets/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<Dataset>>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&id)?;
  let dataset = store
    .get_dataset(id)
    .await?
    .ok_or_else(|| ApiError::NotFound("dataset not found".into()))?;
  Ok(response::ok(dataset))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:        Option<String>,
  pub owner:       Option<String>,
  /// `null` clears the description; an absent field leaves it unchanged.
  #[serde(default, deserialize_with = "double_option")]
  pub description: Option<Option<String>>,
  pub tags:        Option<Vec<String>>,
}

/// `PUT /datasets/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Envelope<Dataset>>, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&id)?;
  let patch = DatasetPatch {
    name:        body.name,
    owner:       body.owner,
    description: body.description,
    tags:        body.tags,
  };
  if patch.is_empty() {
    return Err(ApiError::BadRequest("request body is required".into()));
  }

  let dataset = store
    .update_dataset(id, patch)
    .await?
    .ok_or_else(|| ApiError::NotFound("dataset not found".into()))?;
  Ok(response::ok_with(dataset, "dataset updated successfully"))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /datasets/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let id = parse_id(&id)?;
  let deleted = store.delete_dataset(id).await?;
  if !deleted {
    return Err(ApiError::NotFound("dataset not found".into()));
  }
  Ok(response::ok_with(
    json!({ "deleted": true }),
    "dataset deleted successfully",
  ))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /datasets/stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Envelope<DatasetStats>>, ApiError>
where
  S: CatalogStore,
{
  let stats = store.dataset_stats().await?;
  Ok(response::ok(stats))
}
