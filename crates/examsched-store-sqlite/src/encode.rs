//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, which sorts and compares correctly as
//! text. UUIDs are stored as hyphenated lowercase strings.

use chrono::NaiveDate;
use examsched_core::{assignment::ExamAssignment, catalog::ExamPeriod};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAssignment::from_row`].
pub const EXAM_COLUMNS: &str = "exam_id, period_id, subject_code, subject_title, section_id,
   instructor, exam_date, exam_slot, proctor, room";

/// Raw values read directly from an `exams` row.
pub struct RawAssignment {
  pub exam_id:       String,
  pub period_id:     i64,
  pub subject_code:  String,
  pub subject_title: String,
  pub section_id:    i64,
  pub instructor:    String,
  pub exam_date:     String,
  pub exam_slot:     String,
  pub proctor:       String,
  pub room:          String,
}

impl RawAssignment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      exam_id:       row.get(0)?,
      period_id:     row.get(1)?,
      subject_code:  row.get(2)?,
      subject_title: row.get(3)?,
      section_id:    row.get(4)?,
      instructor:    row.get(5)?,
      exam_date:     row.get(6)?,
      exam_slot:     row.get(7)?,
      proctor:       row.get(8)?,
      room:          row.get(9)?,
    })
  }

  pub fn into_assignment(self) -> Result<ExamAssignment> {
    Ok(ExamAssignment {
      id:            decode_uuid(&self.exam_id)?,
      period_id:     self.period_id,
      subject_code:  self.subject_code,
      subject_title: self.subject_title,
      section_id:    self.section_id,
      instructor:    self.instructor,
      exam_date:     decode_date(&self.exam_date)?,
      exam_slot:     self.exam_slot,
      proctor:       self.proctor,
      room:          self.room,
    })
  }
}

/// Raw values read directly from an `exam_periods` row.
pub struct RawPeriod {
  pub period_id:  i64,
  pub semester:   String,
  pub start_date: String,
  pub end_date:   String,
}

impl RawPeriod {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      period_id:  row.get(0)?,
      semester:   row.get(1)?,
      start_date: row.get(2)?,
      end_date:   row.get(3)?,
    })
  }

  pub fn into_period(self) -> Result<ExamPeriod> {
    Ok(ExamPeriod {
      period_id:  self.period_id,
      semester:   self.semester,
      start_date: decode_date(&self.start_date)?,
      end_date:   decode_date(&self.end_date)?,
    })
  }
}
