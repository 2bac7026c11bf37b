//! SQL schema for the selection ledger.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for later migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Selections are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS selections (
    selection_id  TEXT PRIMARY KEY,
    student_id    TEXT NOT NULL,
    session_id    TEXT NOT NULL,
    meta_id       TEXT NOT NULL,
    subject_id    TEXT NOT NULL,
    version       INTEGER NOT NULL CHECK (version >= 1),
    parent_id     TEXT REFERENCES selections(selection_id),   -- lineage root
    previous_id   TEXT REFERENCES selections(selection_id),   -- prior version
    created_by    TEXT NOT NULL,
    change_reason TEXT,
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    UNIQUE (student_id, session_id, meta_id, version)
);

-- A selection taken out of the active set, optionally by a newer version.
CREATE TABLE IF NOT EXISTS deprecations (
    deprecation_id TEXT PRIMARY KEY,
    selection_id   TEXT NOT NULL REFERENCES selections(selection_id),
    superseded_by  TEXT REFERENCES selections(selection_id),
    reason         TEXT,
    recorded_at    TEXT NOT NULL,
    UNIQUE (selection_id),
    CHECK  (superseded_by IS NULL OR selection_id != superseded_by)
);

CREATE INDEX IF NOT EXISTS selections_student_idx ON selections(student_id, session_id);
CREATE INDEX IF NOT EXISTS selections_parent_idx  ON selections(parent_id);

PRAGMA user_version = 1;
";
