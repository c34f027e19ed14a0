//! JSON REST API for the quarry dataset catalog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`quarry_core::store::CatalogStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(quarry_api::api_router(store.clone()))
//! ```

pub mod datasets;
pub mod error;
pub mod quality_logs;
pub mod response;

use std::sync::Arc;

use axum::{Router, routing::get};
use quarry_core::store::CatalogStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CatalogStore + 'static,
{
  Router::new()
    // Datasets
    .route(
      "/datasets",
      get(datasets::list::<S>).post(datasets::create::<S>),
    )
    .route("/datasets/stats", get(datasets::stats::<S>))
    .route(
      "/datasets/{id}",
      get(datasets::get_one::<S>)
        .put(datasets::update::<S>)
        .delete(datasets::delete::<S>),
    )
    // Quality logs
    .route(
      "/datasets/{id}/quality-logs",
      get(quality_logs::list::<S>).post(quality_logs::create::<S>),
    )
    .route(
      "/datasets/{id}/quality-summary",
      get(quality_logs::summary::<S>),
    )
    .route(
      "/datasets/{id}/quality-status",
      get(quality_logs::latest::<S>),
    )
    .with_state(store)
}
