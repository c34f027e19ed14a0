//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings at fixed microsecond width so
//! lexicographic order equals chronological order. Tags are stored as a
//! compact JSON array. Identifiers are stored as 32-char lowercase hex.

use chrono::{DateTime, SecondsFormat, Utc};
use quarry_core::{
  RecordId,
  dataset::Dataset,
  quality::{QualityLog, QualityStatus},
};

use crate::{Error, Result};

// ─── RecordId ────────────────────────────────────────────────────────────────

pub fn encode_id(id: RecordId) -> String { id.to_string() }

pub fn decode_id(s: &str) -> Result<RecordId> { Ok(RecordId::parse(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── QualityStatus ───────────────────────────────────────────────────────────

pub fn encode_status(status: QualityStatus) -> &'static str {
  match status {
    QualityStatus::Pass => "PASS",
    QualityStatus::Fail => "FAIL",
  }
}

pub fn decode_status(s: &str) -> Result<QualityStatus> {
  match s {
    "PASS" => Ok(QualityStatus::Pass),
    "FAIL" => Ok(QualityStatus::Fail),
    other => Err(Error::Decode(format!("unknown quality status: {other:?}"))),
  }
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `datasets` row.
pub struct RawDataset {
  pub dataset_id:  String,
  pub name:        String,
  pub owner:       String,
  pub description: Option<String>,
  pub tags:        String,
  pub created_at:  String,
  pub updated_at:  String,
  pub is_deleted:  bool,
}

impl RawDataset {
  pub fn into_dataset(self) -> Result<Dataset> {
    Ok(Dataset {
      id:          decode_id(&self.dataset_id)?,
      name:        self.name,
      owner:       self.owner,
      description: self.description,
      tags:        decode_tags(&self.tags)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      is_deleted:  self.is_deleted,
    })
  }
}

/// Raw strings read directly from a `quality_logs` row.
pub struct RawQualityLog {
  pub log_id:     String,
  pub dataset_id: String,
  pub status:     String,
  pub details:    Option<String>,
  pub timestamp:  String,
}

impl RawQualityLog {
  pub fn into_log(self) -> Result<QualityLog> {
    Ok(QualityLog {
      id:         decode_id(&self.log_id)?,
      dataset_id: decode_id(&self.dataset_id)?,
      status:     decode_status(&self.status)?,
      details:    self.details,
      timestamp:  decode_dt(&self.timestamp)?,
    })
  }
}
