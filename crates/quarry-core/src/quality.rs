//! Quality logs — one check outcome per dataset, at a point in time.
//!
//! Logs are append-only: nothing in this layer updates or deletes them. The
//! `dataset_id` back-reference is a plain value used for lookup; a log
//! outlives the soft-deletion of its dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, id::RecordId};

pub const DETAILS_MAX: usize = 1000;

/// Outcome of a quality check. Closed set; anything else is rejected at
/// the boundary before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityStatus {
  Pass,
  Fail,
}

/// One recorded quality-check outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityLog {
  pub id:         RecordId,
  /// Weak reference: checked against a live dataset at creation only.
  pub dataset_id: RecordId,
  pub status:     QualityStatus,
  pub details:    Option<String>,
  /// Server-assigned; never changes after creation.
  pub timestamp:  DateTime<Utc>,
}

/// Input to [`crate::store::CatalogStore::record_quality_log`].
#[derive(Debug, Clone)]
pub struct NewQualityLog {
  pub dataset_id: RecordId,
  pub status:     QualityStatus,
  pub details:    Option<String>,
}

impl NewQualityLog {
  pub fn validate(&self) -> Result<()> {
    if let Some(details) = &self.details {
      let len = details.chars().count();
      if len > DETAILS_MAX {
        return Err(Error::Validation(format!(
          "details must be at most {DETAILS_MAX} characters, got {len}"
        )));
      }
    }
    Ok(())
  }
}

/// Pass/fail aggregate over every log recorded for one dataset id,
/// regardless of the dataset's liveness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySummary {
  pub total_logs: u64,
  pub pass_count: u64,
  pub fail_count: u64,
  /// `pass_count / total_logs * 100`; 0.0 when there are no logs.
  pub pass_rate:  f64,
}

impl QualitySummary {
  pub fn from_counts(pass_count: u64, fail_count: u64) -> Self {
    let total_logs = pass_count + fail_count;
    let pass_rate = if total_logs > 0 {
      pass_count as f64 / total_logs as f64 * 100.0
    } else {
      0.0
    };
    Self { total_logs, pass_count, fail_count, pass_rate }
  }
}
