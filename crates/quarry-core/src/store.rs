//! The `CatalogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `quarry-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  Result,
  dataset::{Dataset, DatasetPatch, DatasetStats, NewDataset},
  id::RecordId,
  page::{Page, PageRequest},
  quality::{NewQualityLog, QualityLog, QualitySummary},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filters for [`CatalogStore::list_datasets`]. Both filters combine with
/// the implicit "live records only" predicate.
#[derive(Debug, Clone, Default)]
pub struct DatasetFilter {
  /// Exact owner match.
  pub owner: Option<String>,
  /// Tag membership: the record's tag list must contain this value.
  pub tag:   Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a catalog storage backend.
///
/// Dataset records are mutable but never physically removed — deletion is a
/// soft-delete flag, and every read path sees live records only. Quality
/// logs are append-only.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). Every method
/// surfaces failures as [`crate::Error`] so callers can map failure kinds
/// without knowing the backend.
pub trait CatalogStore: Send + Sync {
  // ── Datasets ──────────────────────────────────────────────────────────

  /// Create and persist a new dataset. The store assigns the identifier
  /// and both timestamps.
  ///
  /// Fails with [`crate::Error::DuplicateDataset`] if a live record with
  /// the same (name, owner) exists — enforced by a storage-layer
  /// uniqueness constraint, so concurrent identical creates cannot both
  /// succeed.
  fn create_dataset(
    &self,
    input: NewDataset,
  ) -> impl Future<Output = Result<Dataset>> + Send + '_;

  /// List live datasets matching `filter`, newest first, paginated.
  fn list_datasets(
    &self,
    filter: DatasetFilter,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Dataset>>> + Send + '_;

  /// Retrieve a dataset by id. Returns `None` if the id is unknown or the
  /// record is soft-deleted.
  fn get_dataset(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Dataset>>> + Send + '_;

  /// Apply a partial update to a live dataset and return the updated
  /// record. `None` if the id does not resolve to a live record.
  ///
  /// Only provided fields change; `updated_at` always refreshes. A name
  /// or owner change re-validates the uniqueness invariant against the
  /// resulting pair.
  fn update_dataset(
    &self,
    id: RecordId,
    patch: DatasetPatch,
  ) -> impl Future<Output = Result<Option<Dataset>>> + Send + '_;

  /// Soft-delete a dataset. Returns whether a live record was actually
  /// transitioned — deleting an already-deleted or unknown id reports
  /// `false`, never an error.
  fn delete_dataset(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Aggregate statistics over the live datasets.
  fn dataset_stats(
    &self,
  ) -> impl Future<Output = Result<DatasetStats>> + Send + '_;

  // ── Quality logs — append-only ────────────────────────────────────────

  /// Record a quality-check outcome. The store assigns the identifier and
  /// timestamp.
  ///
  /// Fails with [`crate::Error::DatasetNotFound`] unless `dataset_id`
  /// resolves to a live dataset at the time of the check.
  fn record_quality_log(
    &self,
    input: NewQualityLog,
  ) -> impl Future<Output = Result<QualityLog>> + Send + '_;

  /// List logs for a dataset id, newest first, paginated. Filters by
  /// value equality only — no liveness check, so logs of a since-deleted
  /// dataset remain listable.
  fn list_quality_logs(
    &self,
    dataset_id: RecordId,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<QualityLog>>> + Send + '_;

  /// Pass/fail aggregate over every log for a dataset id, regardless of
  /// the dataset's liveness.
  fn quality_summary(
    &self,
    dataset_id: RecordId,
  ) -> impl Future<Output = Result<QualitySummary>> + Send + '_;

  /// The most recent log for a dataset id, or `None` if it has no logs.
  /// Timestamp ties resolve to the most recently inserted log.
  fn latest_quality_status(
    &self,
    dataset_id: RecordId,
  ) -> impl Future<Output = Result<Option<QualityLog>>> + Send + '_;
}
