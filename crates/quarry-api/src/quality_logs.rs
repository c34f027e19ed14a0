//! Handlers for `/datasets/:id/quality-*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/datasets/:id/quality-logs` | Body: [`CreateBody`]; 404 unless the dataset is live |
//! | `GET`  | `/datasets/:id/quality-logs` | Paginated; no liveness check |
//! | `GET`  | `/datasets/:id/quality-summary` | Counts + pass rate |
//! | `GET`  | `/datasets/:id/quality-status` | Latest log; 404 when none |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  response::IntoResponse,
};
use quarry_core::{
  RecordId,
  page::{Page, PageRequest},
  quality::{NewQualityLog, QualityLog, QualityStatus, QualitySummary},
  store::CatalogStore,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  response::{self, Envelope},
};

fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
  RecordId::parse(raw)
    .map_err(|_| ApiError::BadRequest("invalid dataset id".into()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub status:  QualityStatus,
  pub details: Option<String>,
}

/// `POST /datasets/:id/quality-logs`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let dataset_id = parse_id(&id)?;
  let log = store
    .record_quality_log(NewQualityLog {
      dataset_id,
      status: body.status,
      details: body.details,
    })
    .await?;
  Ok(response::created(log, "quality log created successfully"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub page:  Option<i64>,
  pub limit: Option<i64>,
}

/// `GET /datasets/:id/quality-logs[?page=N][&limit=N]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Page<QualityLog>>>, ApiError>
where
  S: CatalogStore,
{
  let dataset_id = parse_id(&id)?;
  let page = PageRequest::clamped(
    params.page.unwrap_or(1),
    params.limit.unwrap_or(i64::from(PageRequest::DEFAULT_LIMIT)),
  );

  let result = store.list_quality_logs(dataset_id, page).await?;
  Ok(response::ok(result))
}

// ─── Summary ──────────────────────────────────────────────────────────────────

/// `GET /datasets/:id/quality-summary`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<QualitySummary>>, ApiError>
where
  S: CatalogStore,
{
  let dataset_id = parse_id(&id)?;
  let summary = store.quality_summary(dataset_id).await?;
  Ok(response::ok(summary))
}

// ─── Latest status ────────────────────────────────────────────────────────────

/// `GET /datasets/:id/quality-status`
pub async fn latest<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<QualityLog>>, ApiError>
where
  S: CatalogStore,
{
  let dataset_id = parse_id(&id)?;
  let log = store.latest_quality_status(dataset_id).await?.ok_or_else(|| {
    ApiError::NotFound("no quality logs found for this dataset".into())
  })?;
  Ok(response::ok(log))
}
