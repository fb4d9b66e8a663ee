//! SQL schema for the RSVP SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Insert-only. No UPDATE or DELETE is ever issued against this table.
-- `response` is validated by the intake path, not here.
CREATE TABLE IF NOT EXISTS rsvps (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    response    TEXT NOT NULL,             -- 'yes' | 'no' | 'maybe'
    guests      INTEGER NOT NULL DEFAULT 1,
    message     TEXT,                      -- NULL when not supplied
    created_at  TEXT NOT NULL              -- RFC 3339 UTC, fixed width; store-assigned
);

CREATE INDEX IF NOT EXISTS rsvps_created_idx ON rsvps(created_at);

PRAGMA user_version = 1;
";
