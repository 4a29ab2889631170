//! SQL schema for the Docket SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cases (
    cin               TEXT PRIMARY KEY,
    defendant_name    TEXT NOT NULL,
    defendant_address TEXT NOT NULL,
    crime_type        TEXT NOT NULL,
    crime_date        TEXT NOT NULL,   -- YYYY-MM-DD
    crime_location    TEXT NOT NULL,
    arresting_officer TEXT NOT NULL,
    arrest_date       TEXT NOT NULL,   -- YYYY-MM-DD
    status            TEXT NOT NULL DEFAULT 'PENDING',
    case_description  TEXT NOT NULL DEFAULT '',
    created_at        TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

-- One row per scheduled appearance. Past rows are history and are never
-- deleted; the only DELETE on this table frees a case's active booking.
CREATE TABLE IF NOT EXISTS hearings (
    cin          TEXT NOT NULL REFERENCES cases(cin),
    hearing_date TEXT NOT NULL,        -- YYYY-MM-DD
    scheduled_at TEXT NOT NULL,
    PRIMARY KEY (cin, hearing_date)
);

-- Strictly append-only. No UPDATE is ever issued against this table.
CREATE TABLE IF NOT EXISTS summaries (
    summary_id TEXT PRIMARY KEY,
    cin        TEXT NOT NULL REFERENCES cases(cin),
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bills (
    bill_id   TEXT PRIMARY KEY,
    cin       TEXT NOT NULL REFERENCES cases(cin),
    amount    INTEGER NOT NULL,
    paid      INTEGER NOT NULL DEFAULT 0,
    issued_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS hearings_date_idx ON hearings(hearing_date);
CREATE INDEX IF NOT EXISTS summaries_cin_idx ON summaries(cin);
CREATE INDEX IF NOT EXISTS bills_cin_idx     ON bills(cin);

PRAGMA user_version = 1;
";
