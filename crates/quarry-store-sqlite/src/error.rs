//! Error type for `quarry-store-sqlite`.

use quarry_core::RecordId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] quarry_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value outside its closed set.
  #[error("column decode error: {0}")]
  Decode(String),

  #[error("dataset not found: {0}")]
  DatasetNotFound(RecordId),

  #[error("dataset {name:?} already exists for owner {owner:?}")]
  DuplicateDataset { name: String, owner: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Collapse into the core error at the trait boundary: domain variants map
/// one-to-one, infrastructure failures become the retryable storage kind.
impl From<Error> for quarry_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      Error::DatasetNotFound(id) => quarry_core::Error::DatasetNotFound(id),
      Error::DuplicateDataset { name, owner } => {
        quarry_core::Error::DuplicateDataset { name, owner }
      }
      Error::Database(e) => quarry_core::Error::Storage(e.to_string()),
      Error::Json(e) => quarry_core::Error::Storage(e.to_string()),
      Error::DateParse(message) | Error::Decode(message) => {
        quarry_core::Error::Storage(message)
      }
    }
  }
}
