//! SQL schema for the incident store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Fixed lookup, filled from `IncidentStatus::ALL` at startup; display
-- order follows `sequence`, not the name.
CREATE TABLE IF NOT EXISTS incident_status (
    name     TEXT PRIMARY KEY,
    sequence INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS incidents (
    incident_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    one_liner    TEXT    NOT NULL DEFAULT '',
    description  TEXT    NOT NULL DEFAULT '',
    is_incident  INTEGER NOT NULL DEFAULT 0,
    is_racial    INTEGER NOT NULL DEFAULT 0,
    is_bullying  INTEGER NOT NULL DEFAULT 0,
    is_concern   INTEGER NOT NULL DEFAULT 0,
    other_type   TEXT    NOT NULL DEFAULT '',
    logged_on    TEXT    NOT NULL,             -- YYYY-MM-DD
    status       TEXT    NOT NULL DEFAULT 'Open'
                         REFERENCES incident_status(name),
    action_taken TEXT    NOT NULL DEFAULT ''
);

-- Pupils are shared across incidents and never deleted.
CREATE TABLE IF NOT EXISTS pupils (
    pupil_id INTEGER PRIMARY KEY,
    name     TEXT NOT NULL UNIQUE
);

-- One row per (incident, pupil); uniqueness is maintained by reconciliation.
-- association_id doubles as the display order.
CREATE TABLE IF NOT EXISTS incident_pupils (
    association_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    incident_id         INTEGER NOT NULL
                        REFERENCES incidents(incident_id) ON DELETE CASCADE,
    pupil_id            INTEGER NOT NULL REFERENCES pupils(pupil_id),
    statement           BLOB,
    statement_extension TEXT     -- NULL exactly when statement is NULL
);

CREATE TABLE IF NOT EXISTS attachments (
    attachment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    incident_id   INTEGER NOT NULL
                  REFERENCES incidents(incident_id) ON DELETE CASCADE,
    filename      TEXT NOT NULL,
    data          BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS incident_pupils_incident_idx
    ON incident_pupils(incident_id);
CREATE INDEX IF NOT EXISTS attachments_incident_idx
    ON attachments(incident_id);

PRAGMA user_version = 1;
";
