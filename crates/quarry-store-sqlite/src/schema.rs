//! SQL schema for the quarry SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS datasets (
    dataset_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    owner       TEXT NOT NULL,
    description TEXT,
    tags        TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    created_at  TEXT NOT NULL,               -- RFC 3339 UTC; server-assigned
    updated_at  TEXT NOT NULL,
    is_deleted  INTEGER NOT NULL DEFAULT 0
);

-- The authoritative (name, owner) uniqueness guard, scoped to live rows.
-- Soft-deleted rows fall outside the predicate, so their pair is reusable.
CREATE UNIQUE INDEX IF NOT EXISTS datasets_live_name_owner
    ON datasets(name, owner) WHERE is_deleted = 0;

CREATE INDEX IF NOT EXISTS datasets_name_idx    ON datasets(name);
CREATE INDEX IF NOT EXISTS datasets_owner_idx   ON datasets(owner);
CREATE INDEX IF NOT EXISTS datasets_deleted_idx ON datasets(is_deleted);
CREATE INDEX IF NOT EXISTS datasets_created_idx ON datasets(created_at);

-- Quality logs are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- dataset_id is a weak reference: checked at insert time, no FK.
CREATE TABLE IF NOT EXISTS quality_logs (
    log_id     TEXT PRIMARY KEY,
    dataset_id TEXT NOT NULL,
    status     TEXT NOT NULL,    -- 'PASS' | 'FAIL'
    details    TEXT,
    timestamp  TEXT NOT NULL     -- RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS quality_logs_dataset_idx   ON quality_logs(dataset_id);
CREATE INDEX IF NOT EXISTS quality_logs_timestamp_idx ON quality_logs(timestamp);
CREATE INDEX IF NOT EXISTS quality_logs_dataset_ts_idx
    ON quality_logs(dataset_id, timestamp);

PRAGMA user_version = 1;
";
