//! SQL schema for the exam scheduler's SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS exam_periods (
    period_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    semester    TEXT NOT NULL,
    start_date  TEXT NOT NULL,   -- YYYY-MM-DD
    end_date    TEXT NOT NULL,   -- YYYY-MM-DD, inclusive
    CHECK (start_date <= end_date)
);

-- Catalog tables. The engine reads these as a snapshot; it never writes them
-- on the commit path.
CREATE TABLE IF NOT EXISTS subjects (
    code        TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    instructor  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sections (
    section_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    section_name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS rooms (
    room_label  TEXT PRIMARY KEY COLLATE NOCASE,
    capacity    INTEGER
);

CREATE TABLE IF NOT EXISTS time_slots (
    slot_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    slot_label  TEXT NOT NULL UNIQUE
);

-- Committed assignments. Deleting a period deletes its exams.
CREATE TABLE IF NOT EXISTS exams (
    exam_id        TEXT PRIMARY KEY,
    period_id      INTEGER NOT NULL
                   REFERENCES exam_periods(period_id) ON DELETE CASCADE,
    subject_code   TEXT NOT NULL,
    subject_title  TEXT NOT NULL,
    section_id     INTEGER NOT NULL,
    instructor     TEXT NOT NULL,
    exam_date      TEXT NOT NULL,   -- YYYY-MM-DD
    exam_slot      TEXT NOT NULL,   -- catalog label, compared exactly
    proctor        TEXT NOT NULL,
    room           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS exams_period_idx ON exams(period_id, exam_date);
CREATE INDEX IF NOT EXISTS exams_date_idx   ON exams(exam_date);

PRAGMA user_version = 1;
";
