//! Exam assignments, the unit of scheduling.
//!
//! An assignment places one subject section's exam at a date, a catalog slot,
//! a room, and under a proctor, within a single exam period. Assignments have
//! a store-generated identity; no natural key exists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Identifies an exam period. All conflict checks are scoped to one period.
pub type PeriodId = i64;

/// Identifies a class section (a cohort sitting an exam).
pub type SectionId = i64;

/// Identifies a committed assignment.
pub type AssignmentId = Uuid;

// ─── Sitting ─────────────────────────────────────────────────────────────────

/// Read access to the fields the conflict rules compare.
///
/// Implemented by committed assignments and by candidates, so the evaluator
/// and the commit guards treat both the same way.
pub trait Sitting {
  fn period_id(&self) -> PeriodId;
  fn subject_code(&self) -> &str;
  fn subject_title(&self) -> &str;
  fn section_id(&self) -> SectionId;
  fn instructor(&self) -> &str;
  fn exam_date(&self) -> NaiveDate;
  fn exam_slot(&self) -> &str;
  fn proctor(&self) -> &str;
  fn room(&self) -> &str;
}

// ─── ExamAssignment ──────────────────────────────────────────────────────────

/// A committed exam assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAssignment {
  pub id:            AssignmentId,
  pub period_id:     PeriodId,
  pub subject_code:  String,
  pub subject_title: String,
  pub section_id:    SectionId,
  /// The faculty member who owns the exam (one per subject offering).
  pub instructor:    String,
  pub exam_date:     NaiveDate,
  /// A slot label from the admin-curated catalog, e.g. `"7:30-9:30 AM"`.
  pub exam_slot:     String,
  pub proctor:       String,
  pub room:          String,
}

impl ExamAssignment {
  /// Build a committed assignment from a candidate and a fresh id.
  pub fn from_new(id: AssignmentId, input: NewAssignment) -> Self {
    Self {
      id,
      period_id: input.period_id,
      subject_code: input.subject_code,
      subject_title: input.subject_title,
      section_id: input.section_id,
      instructor: input.instructor,
      exam_date: input.exam_date,
      exam_slot: input.exam_slot,
      proctor: input.proctor,
      room: input.room,
    }
  }

  /// The candidate this assignment would become after `patch` is applied.
  /// Subject, section, and instructor are carried over unchanged.
  pub fn patched(&self, patch: &AssignmentPatch) -> NewAssignment {
    NewAssignment {
      period_id:     self.period_id,
      subject_code:  self.subject_code.clone(),
      subject_title: self.subject_title.clone(),
      section_id:    self.section_id,
      instructor:    self.instructor.clone(),
      exam_date:     patch.exam_date.unwrap_or(self.exam_date),
      exam_slot:     patch
        .exam_slot
        .clone()
        .unwrap_or_else(|| self.exam_slot.clone()),
      proctor:       patch
        .proctor
        .clone()
        .unwrap_or_else(|| self.proctor.clone()),
      room:          patch.room.clone().unwrap_or_else(|| self.room.clone()),
    }
  }
}

// ─── NewAssignment ───────────────────────────────────────────────────────────

/// A candidate assignment: everything but the id, which the store assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssignment {
  pub period_id:     PeriodId,
  pub subject_code:  String,
  pub subject_title: String,
  pub section_id:    SectionId,
  pub instructor:    String,
  pub exam_date:     NaiveDate,
  pub exam_slot:     String,
  pub proctor:       String,
  pub room:          String,
}

// ─── AssignmentPatch ─────────────────────────────────────────────────────────

/// The fields an edit may change. Subject and section are immutable once an
/// assignment exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPatch {
  pub exam_date: Option<NaiveDate>,
  pub exam_slot: Option<String>,
  pub proctor:   Option<String>,
  pub room:      Option<String>,
}

impl AssignmentPatch {
  pub fn is_empty(&self) -> bool {
    self.exam_date.is_none()
      && self.exam_slot.is_none()
      && self.proctor.is_none()
      && self.room.is_none()
  }
}

// ─── AssignmentQuery ─────────────────────────────────────────────────────────

/// Filters for [`crate::scheduler::Scheduler::search`]. Unset fields match
/// everything; text fields compare case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentQuery {
  pub subject_code: Option<String>,
  pub section_id:   Option<SectionId>,
  pub instructor:   Option<String>,
  pub room:         Option<String>,
  pub proctor:      Option<String>,
}

impl AssignmentQuery {
  pub fn matches(&self, a: &impl Sitting) -> bool {
    fn text(filter: &Option<String>, value: &str) -> bool {
      filter
        .as_deref()
        .is_none_or(|f| f.eq_ignore_ascii_case(value))
    }

    text(&self.subject_code, a.subject_code())
      && self.section_id.is_none_or(|s| s == a.section_id())
      && text(&self.instructor, a.instructor())
      && text(&self.room, a.room())
      && text(&self.proctor, a.proctor())
  }
}

// ─── Sitting impls ───────────────────────────────────────────────────────────

macro_rules! impl_sitting {
  ($ty:ty) => {
    impl Sitting for $ty {
      fn period_id(&self) -> PeriodId { self.period_id }

      fn subject_code(&self) -> &str { &self.subject_code }

      fn subject_title(&self) -> &str { &self.subject_title }

      fn section_id(&self) -> SectionId { self.section_id }

      fn instructor(&self) -> &str { &self.instructor }

      fn exam_date(&self) -> NaiveDate { self.exam_date }

      fn exam_slot(&self) -> &str { &self.exam_slot }

      fn proctor(&self) -> &str { &self.proctor }

      fn room(&self) -> &str { &self.room }
    }
  };
}

impl_sitting!(ExamAssignment);
impl_sitting!(NewAssignment);

#[cfg(test)]
mod tests {
  use super::*;

  fn committed() -> ExamAssignment {
    ExamAssignment {
      id:            Uuid::new_v4(),
      period_id:     1,
      subject_code:  "CPEP 311A".into(),
      subject_title: "Data Structures".into(),
      section_id:    1,
      instructor:    "Prof. Cruz".into(),
      exam_date:     NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
      exam_slot:     "7:30-9:30 AM".into(),
      proctor:       "Cruz".into(),
      room:          "Room 101".into(),
    }
  }

  #[test]
  fn patched_keeps_subject_and_section() {
    let a = committed();
    let patch = AssignmentPatch {
      room: Some("Room 105".into()),
      ..Default::default()
    };

    let candidate = a.patched(&patch);
    assert_eq!(candidate.room, "Room 105");
    assert_eq!(candidate.subject_code, a.subject_code);
    assert_eq!(candidate.section_id, a.section_id);
    assert_eq!(candidate.exam_slot, a.exam_slot);
  }

  #[test]
  fn patched_takes_date_and_proctor() {
    let a = committed();
    let patch = AssignmentPatch {
      exam_date: NaiveDate::from_ymd_opt(2026, 3, 11),
      proctor: Some("Reyes".into()),
      ..Default::default()
    };

    let candidate = a.patched(&patch);
    assert_eq!(candidate.exam_date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
    assert_eq!(candidate.proctor, "Reyes");
    assert_eq!(candidate.room, a.room);
    assert_eq!(candidate.instructor, a.instructor);
  }

  #[test]
  fn query_is_case_insensitive() {
    let a = committed();
    let q = AssignmentQuery {
      room: Some("ROOM 101".into()),
      subject_code: Some("cpep 311a".into()),
      ..Default::default()
    };
    assert!(q.matches(&a));

    let miss = AssignmentQuery {
      section_id: Some(2),
      ..Default::default()
    };
    assert!(!miss.matches(&a));
    assert!(AssignmentQuery::default().matches(&a));
  }
}
