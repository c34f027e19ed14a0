//! [`SqliteStore`] — the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use quarry_core::{
  RecordId,
  dataset::{Dataset, DatasetPatch, DatasetStats, KeyCount, NewDataset},
  page::{Page, PageRequest},
  quality::{NewQualityLog, QualityLog, QualitySummary, QualityStatus},
  store::{CatalogStore, DatasetFilter},
};

use crate::{
  Error, Result,
  encode::{
    RawDataset, RawQualityLog, decode_status, encode_dt, encode_id,
    encode_status, encode_tags,
  },
  schema::SCHEMA,
};

const DATASET_COLUMNS: &str =
  "dataset_id, name, owner, description, tags, created_at, updated_at, \
   is_deleted";

const LOG_COLUMNS: &str = "log_id, dataset_id, status, details, timestamp";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn dataset_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDataset> {
  Ok(RawDataset {
    dataset_id:  row.get(0)?,
    name:        row.get(1)?,
    owner:       row.get(2)?,
    description: row.get(3)?,
    tags:        row.get(4)?,
    created_at:  row.get(5)?,
    updated_at:  row.get(6)?,
    is_deleted:  row.get(7)?,
  })
}

fn log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawQualityLog> {
  Ok(RawQualityLog {
    log_id:     row.get(0)?,
    dataset_id: row.get(1)?,
    status:     row.get(2)?,
    details:    row.get(3)?,
    timestamp:  row.get(4)?,
  })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

fn reject_zero_limit(page: PageRequest) -> Result<()> {
  if page.limit == 0 {
    return Err(Error::Core(quarry_core::Error::Validation(
      "limit must be at least 1".into(),
    )));
  }
  Ok(())
}

enum UpdateOutcome {
  Updated(RawDataset),
  Missing,
  Duplicate,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }

  // ── Datasets ──────────────────────────────────────────────────────────────

  async fn insert_dataset(&self, input: NewDataset) -> Result<Dataset> {
    input.validate()?;

    let now = Utc::now();
    let dataset = Dataset {
      id:          RecordId::generate(),
      name:        input.name,
      owner:       input.owner,
      description: input.description,
      tags:        input.tags,
      created_at:  now,
      updated_at:  now,
      is_deleted:  false,
    };

    let id_str = encode_id(dataset.id);
    let name = dataset.name.clone();
    let owner = dataset.owner.clone();
    let description = dataset.description.clone();
    let tags_str = encode_tags(&dataset.tags)?;
    let at_str = encode_dt(now);

    let inserted = self
      .conn
      .call(move |conn| {
        // Advisory pre-check for the friendly early exit; the partial
        // unique index is the authoritative guard.
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM datasets
             WHERE name = ?1 AND owner = ?2 AND is_deleted = 0",
            rusqlite::params![name, owner],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if exists {
          return Ok(false);
        }

        match conn.execute(
          "INSERT INTO datasets (
             dataset_id, name, owner, description, tags,
             created_at, updated_at, is_deleted
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
          rusqlite::params![
            id_str,
            name,
            owner,
            description,
            tags_str,
            at_str,
            at_str,
          ],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateDataset {
        name:  dataset.name,
        owner: dataset.owner,
      });
    }

    tracing::debug!(id = %dataset.id, owner = %dataset.owner, "dataset created");
    Ok(dataset)
  }

  async fn query_datasets(
    &self,
    filter: DatasetFilter,
    page: PageRequest,
  ) -> Result<Page<Dataset>> {
    reject_zero_limit(page)?;

    let owner = filter.owner;
    let tag = filter.tag;
    let limit = i64::from(page.limit);
    let offset = page.offset() as i64;

    let (total, raws) = self
      .conn
      .call(move |conn| {
        let mut clauses = vec!["is_deleted = 0".to_owned()];
        let mut args: Vec<Value> = Vec::new();

        if let Some(owner) = owner {
          args.push(Value::Text(owner));
          clauses.push(format!("owner = ?{}", args.len()));
        }
        if let Some(tag) = tag {
          args.push(Value::Text(tag));
          clauses.push(format!(
            "EXISTS (SELECT 1 FROM json_each(datasets.tags)
                     WHERE json_each.value = ?{})",
            args.len()
          ));
        }
        let where_clause = clauses.join(" AND ");

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM datasets WHERE {where_clause}"),
          rusqlite::params_from_iter(args.iter()),
          |row| row.get(0),
        )?;

        args.push(Value::Integer(limit));
        let limit_pos = args.len();
        args.push(Value::Integer(offset));
        let offset_pos = args.len();

        // rowid ascending keeps equal timestamps in insertion order.
        let sql = format!(
          "SELECT {DATASET_COLUMNS} FROM datasets WHERE {where_clause}
           ORDER BY created_at DESC, rowid ASC
           LIMIT ?{limit_pos} OFFSET ?{offset_pos}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params_from_iter(args.iter()), dataset_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, raws))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawDataset::into_dataset)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(items, total as u64, page))
  }

  async fn fetch_dataset(&self, id: RecordId) -> Result<Option<Dataset>> {
    let id_str = encode_id(id);

    let raw: Option<RawDataset> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DATASET_COLUMNS} FROM datasets
                 WHERE dataset_id = ?1 AND is_deleted = 0"
              ),
              rusqlite::params![id_str],
              dataset_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDataset::into_dataset).transpose()
  }

  async fn apply_patch(
    &self,
    id: RecordId,
    patch: DatasetPatch,
  ) -> Result<Option<Dataset>> {
    patch.validate()?;

    let Some(current) = self.fetch_dataset(id).await? else {
      return Ok(None);
    };

    let resulting_name =
      patch.name.clone().unwrap_or_else(|| current.name.clone());
    let resulting_owner =
      patch.owner.clone().unwrap_or_else(|| current.owner.clone());
    // Re-validate uniqueness whenever the pair can change; the unique
    // index still backs this up under concurrency.
    let recheck = patch.name.is_some() || patch.owner.is_some();

    let id_str = encode_id(id);
    let now_str = encode_dt(Utc::now());

    let mut sets = vec!["updated_at = ?1".to_owned()];
    let mut args: Vec<Value> = vec![Value::Text(now_str)];
    if let Some(name) = patch.name {
      args.push(Value::Text(name));
      sets.push(format!("name = ?{}", args.len()));
    }
    if let Some(owner) = patch.owner {
      args.push(Value::Text(owner));
      sets.push(format!("owner = ?{}", args.len()));
    }
    if let Some(description) = patch.description {
      args.push(match description {
        Some(d) => Value::Text(d),
        None => Value::Null,
      });
      sets.push(format!("description = ?{}", args.len()));
    }
    if let Some(tags) = patch.tags {
      args.push(Value::Text(encode_tags(&tags)?));
      sets.push(format!("tags = ?{}", args.len()));
    }

    let check_name = resulting_name.clone();
    let check_owner = resulting_owner.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        if recheck {
          let clash: bool = conn
            .query_row(
              "SELECT 1 FROM datasets
               WHERE name = ?1 AND owner = ?2 AND is_deleted = 0
                 AND dataset_id != ?3",
              rusqlite::params![check_name, check_owner, id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if clash {
            return Ok(UpdateOutcome::Duplicate);
          }
        }

        args.push(Value::Text(id_str.clone()));
        let id_pos = args.len();
        let sql = format!(
          "UPDATE datasets SET {} WHERE dataset_id = ?{id_pos} AND is_deleted = 0",
          sets.join(", ")
        );
        let changed =
          match conn.execute(&sql, rusqlite::params_from_iter(args.iter())) {
            Ok(n) => n,
            Err(e) if is_unique_violation(&e) => {
              return Ok(UpdateOutcome::Duplicate);
            }
            Err(e) => return Err(e.into()),
          };
        if changed == 0 {
          return Ok(UpdateOutcome::Missing);
        }

        let raw = conn.query_row(
          &format!(
            "SELECT {DATASET_COLUMNS} FROM datasets WHERE dataset_id = ?1"
          ),
          rusqlite::params![id_str],
          dataset_row,
        )?;
        Ok(UpdateOutcome::Updated(raw))
      })
      .await?;

    match outcome {
      UpdateOutcome::Updated(raw) => Ok(Some(raw.into_dataset()?)),
      UpdateOutcome::Missing => Ok(None),
      UpdateOutcome::Duplicate => Err(Error::DuplicateDataset {
        name:  resulting_name,
        owner: resulting_owner,
      }),
    }
  }

  async fn mark_deleted(&self, id: RecordId) -> Result<bool> {
    let id_str = encode_id(id);
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE datasets SET is_deleted = 1, updated_at = ?1
           WHERE dataset_id = ?2 AND is_deleted = 0",
          rusqlite::params![now_str, id_str],
        )?)
      })
      .await?;

    if changed > 0 {
      tracing::debug!(id = %id, "dataset soft-deleted");
    }
    Ok(changed > 0)
  }

  async fn aggregate_stats(&self) -> Result<DatasetStats> {
    let (total, owners, tags) = self
      .conn
      .call(|conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM datasets WHERE is_deleted = 0",
          [],
          |row| row.get(0),
        )?;

        // Equal counts order by key so the result is reproducible.
        let mut stmt = conn.prepare(
          "SELECT owner, COUNT(*) AS n FROM datasets
           WHERE is_deleted = 0
           GROUP BY owner ORDER BY n DESC, owner ASC LIMIT 5",
        )?;
        let owners = stmt
          .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        // One count per tag occurrence: a tag listed twice on one record
        // counts twice.
        let mut stmt = conn.prepare(
          "SELECT json_each.value, COUNT(*) AS n
           FROM datasets, json_each(datasets.tags)
           WHERE datasets.is_deleted = 0
           GROUP BY json_each.value ORDER BY n DESC, json_each.value ASC
           LIMIT 10",
        )?;
        let tags = stmt
          .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, owners, tags))
      })
      .await?;

    Ok(DatasetStats {
      total_datasets: total as u64,
      top_owners:     owners
        .into_iter()
        .map(|(key, count)| KeyCount { key, count: count as u64 })
        .collect(),
      top_tags:       tags
        .into_iter()
        .map(|(key, count)| KeyCount { key, count: count as u64 })
        .collect(),
    })
  }

  // ── Quality logs ──────────────────────────────────────────────────────────

  async fn insert_log(&self, input: NewQualityLog) -> Result<QualityLog> {
    input.validate()?;

    let log = QualityLog {
      id:         RecordId::generate(),
      dataset_id: input.dataset_id,
      status:     input.status,
      details:    input.details,
      timestamp:  Utc::now(),
    };

    let log_id_str = encode_id(log.id);
    let dataset_id_str = encode_id(log.dataset_id);
    let status_str = encode_status(log.status);
    let details = log.details.clone();
    let at_str = encode_dt(log.timestamp);

    // Liveness check and insert run back-to-back on the store's single
    // connection. A racing soft-delete on another handle can still land in
    // between; last check wins.
    let inserted = self
      .conn
      .call(move |conn| {
        let live: bool = conn
          .query_row(
            "SELECT 1 FROM datasets
             WHERE dataset_id = ?1 AND is_deleted = 0",
            rusqlite::params![dataset_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !live {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO quality_logs (
             log_id, dataset_id, status, details, timestamp
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            log_id_str,
            dataset_id_str,
            status_str,
            details,
            at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::DatasetNotFound(log.dataset_id));
    }

    tracing::debug!(
      id = %log.id,
      dataset_id = %log.dataset_id,
      status = status_str,
      "quality log recorded"
    );
    Ok(log)
  }

  async fn query_logs(
    &self,
    dataset_id: RecordId,
    page: PageRequest,
  ) -> Result<Page<QualityLog>> {
    reject_zero_limit(page)?;

    let id_str = encode_id(dataset_id);
    let limit = i64::from(page.limit);
    let offset = page.offset() as i64;

    let (total, raws) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM quality_logs WHERE dataset_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;

        // rowid descending: equal timestamps surface most-recent first,
        // consistent with latest_quality_status.
        let mut stmt = conn.prepare(&format!(
          "SELECT {LOG_COLUMNS} FROM quality_logs WHERE dataset_id = ?1
           ORDER BY timestamp DESC, rowid DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![id_str, limit, offset], log_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, raws))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawQualityLog::into_log)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(items, total as u64, page))
  }

  async fn summarize_logs(
    &self,
    dataset_id: RecordId,
  ) -> Result<QualitySummary> {
    let id_str = encode_id(dataset_id);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT status, COUNT(*) FROM quality_logs
           WHERE dataset_id = ?1 GROUP BY status",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut pass_count = 0u64;
    let mut fail_count = 0u64;
    for (status, count) in rows {
      match decode_status(&status)? {
        QualityStatus::Pass => pass_count = count as u64,
        QualityStatus::Fail => fail_count = count as u64,
      }
    }

    Ok(QualitySummary::from_counts(pass_count, fail_count))
  }

  async fn latest_log(
    &self,
    dataset_id: RecordId,
  ) -> Result<Option<QualityLog>> {
    let id_str = encode_id(dataset_id);

    let raw: Option<RawQualityLog> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {LOG_COLUMNS} FROM quality_logs
                 WHERE dataset_id = ?1
                 ORDER BY timestamp DESC, rowid DESC LIMIT 1"
              ),
              rusqlite::params![id_str],
              log_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawQualityLog::into_log).transpose()
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  async fn create_dataset(
    &self,
    input: NewDataset,
  ) -> quarry_core::Result<Dataset> {
    self.insert_dataset(input).await.map_err(Into::into)
  }

  async fn list_datasets(
    &self,
    filter: DatasetFilter,
    page: PageRequest,
  ) -> quarry_core::Result<Page<Dataset>> {
    self.query_datasets(filter, page).await.map_err(Into::into)
  }

  async fn get_dataset(
    &self,
    id: RecordId,
  ) -> quarry_core::Result<Option<Dataset>> {
    self.fetch_dataset(id).await.map_err(Into::into)
  }

  async fn update_dataset(
    &self,
    id: RecordId,
    patch: DatasetPatch,
  ) -> quarry_core::Result<Option<Dataset>> {
    self.apply_patch(id, patch).await.map_err(Into::into)
  }

  async fn delete_dataset(&self, id: RecordId) -> quarry_core::Result<bool> {
    self.mark_deleted(id).await.map_err(Into::into)
  }

  async fn dataset_stats(&self) -> quarry_core::Result<DatasetStats> {
    self.aggregate_stats().await.map_err(Into::into)
  }

  async fn record_quality_log(
    &self,
    input: NewQualityLog,
  ) -> quarry_core::Result<QualityLog> {
    self.insert_log(input).await.map_err(Into::into)
  }

  async fn list_quality_logs(
    &self,
    dataset_id: RecordId,
    page: PageRequest,
  ) -> quarry_core::Result<Page<QualityLog>> {
    self.query_logs(dataset_id, page).await.map_err(Into::into)
  }

  async fn quality_summary(
    &self,
    dataset_id: RecordId,
  ) -> quarry_core::Result<QualitySummary> {
    self.summarize_logs(dataset_id).await.map_err(Into::into)
  }

  async fn latest_quality_status(
    &self,
    dataset_id: RecordId,
  ) -> quarry_core::Result<Option<QualityLog>> {
    self.latest_log(dataset_id).await.map_err(Into::into)
  }
}
