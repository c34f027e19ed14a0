//! Dataset records — the named, owned collections the catalog tracks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, id::RecordId};

pub const NAME_MAX: usize = 100;
pub const OWNER_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 500;

/// A catalogued dataset. Soft-deleted records keep their row but are
/// invisible to every read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
  pub id:          RecordId,
  pub name:        String,
  pub owner:       String,
  pub description: Option<String>,
  /// Order-preserving; membership is what the list filter matches on.
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  /// Refreshed on every mutation, including soft-delete.
  pub updated_at:  DateTime<Utc>,
  pub is_deleted:  bool,
}

/// Input to [`crate::store::CatalogStore::create_dataset`].
/// Identifier and timestamps are always set by the store.
#[derive(Debug, Clone)]
pub struct NewDataset {
  pub name:        String,
  pub owner:       String,
  pub description: Option<String>,
  pub tags:        Vec<String>,
}

impl NewDataset {
  pub fn validate(&self) -> Result<()> {
    check_len("name", &self.name, 1, NAME_MAX)?;
    check_len("owner", &self.owner, 1, OWNER_MAX)?;
    if let Some(description) = &self.description {
      check_len("description", description, 0, DESCRIPTION_MAX)?;
    }
    Ok(())
  }
}

/// Partial update for a dataset. `None` always means "leave unchanged".
///
/// `description` is doubly optional: `Some(None)` clears the field, which
/// keeps an explicit null distinct from an absent one.
#[derive(Debug, Clone, Default)]
pub struct DatasetPatch {
  pub name:        Option<String>,
  pub owner:       Option<String>,
  pub description: Option<Option<String>>,
  pub tags:        Option<Vec<String>>,
}

impl DatasetPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.owner.is_none()
      && self.description.is_none()
      && self.tags.is_none()
  }

  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      check_len("name", name, 1, NAME_MAX)?;
    }
    if let Some(owner) = &self.owner {
      check_len("owner", owner, 1, OWNER_MAX)?;
    }
    if let Some(Some(description)) = &self.description {
      check_len("description", description, 0, DESCRIPTION_MAX)?;
    }
    Ok(())
  }
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// One grouped key with its record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCount {
  pub key:   String,
  pub count: u64,
}

/// Aggregate view over the live datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
  pub total_datasets: u64,
  /// At most 5 owners, count descending; equal counts order by owner name.
  pub top_owners:     Vec<KeyCount>,
  /// At most 10 tags, counted per occurrence across live records.
  pub top_tags:       Vec<KeyCount>,
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
  let len = value.chars().count();
  if len < min || len > max {
    return Err(Error::Validation(format!(
      "{field} must be between {min} and {max} characters, got {len}"
    )));
  }
  Ok(())
}
