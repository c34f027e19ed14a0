//! Error types for `quarry-core`.

use thiserror::Error;

use crate::id::RecordId;

#[derive(Debug, Error)]
pub enum Error {
  /// The string is not a well-formed record identifier. Client input —
  /// never worth retrying.
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("dataset not found: {0}")]
  DatasetNotFound(RecordId),

  /// A live dataset with the same (name, owner) pair already exists.
  #[error("dataset {name:?} already exists for owner {owner:?}")]
  DuplicateDataset { name: String, owner: String },

  /// A field constraint was violated. Raised before any store
  /// interaction, so a failing call never leaves a partial write behind.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The underlying store is unreachable or misbehaving. The only kind a
  /// caller may retry with backoff; the core never retries internally.
  #[error("storage unavailable: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
