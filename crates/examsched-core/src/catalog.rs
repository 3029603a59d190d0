//! Read-only catalog lookups: periods, subjects, sections, rooms, and slots.
//!
//! The catalog is owned by whoever administers the exam office (usually the
//! storage backend) and handed to the [`Scheduler`](crate::scheduler::Scheduler)
//! as an immutable snapshot. Candidates are validated against it before any
//! conflict rule runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  assignment::{PeriodId, SectionId, Sitting},
  error::ValidationError,
};

// ─── Entries ─────────────────────────────────────────────────────────────────

/// An admin-defined date range that scopes all conflict checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPeriod {
  pub period_id:  PeriodId,
  /// Free-text label, e.g. `"2nd Semester 2025"`.
  pub semester:   String,
  pub start_date: NaiveDate,
  /// Inclusive.
  pub end_date:   NaiveDate,
}

impl ExamPeriod {
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date <= self.end_date
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub code:       String,
  pub title:      String,
  pub instructor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
  pub section_id: SectionId,
  pub name:       String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
  pub label:    String,
  pub capacity: Option<u32>,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// An immutable snapshot of the scheduling catalog.
///
/// An empty `subjects`, `rooms`, or `slots` list means that list is not
/// curated and is not checked. Periods and sections are always checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
  pub periods:  Vec<ExamPeriod>,
  pub subjects: Vec<Subject>,
  pub sections: Vec<Section>,
  pub rooms:    Vec<Room>,
  pub slots:    Vec<String>,
}

impl Catalog {
  pub fn period(&self, id: PeriodId) -> Option<&ExamPeriod> {
    self.periods.iter().find(|p| p.period_id == id)
  }

  pub fn section(&self, id: SectionId) -> Option<&Section> {
    self.sections.iter().find(|s| s.section_id == id)
  }

  /// Subject lookup by code and title, ignoring case.
  pub fn subject(&self, code: &str, title: &str) -> Option<&Subject> {
    self.subjects.iter().find(|s| {
      s.code.eq_ignore_ascii_case(code) && s.title.eq_ignore_ascii_case(title)
    })
  }

  /// Room lookup ignoring case, matching how room conflicts compare.
  pub fn room(&self, label: &str) -> Option<&Room> {
    self.rooms.iter().find(|r| r.label.eq_ignore_ascii_case(label))
  }

  /// Slot lookup. Slots are matched exactly.
  pub fn has_slot(&self, label: &str) -> bool {
    self.slots.iter().any(|s| s == label)
  }

  /// Drop a deleted period. Returns whether it was present.
  pub fn remove_period(&mut self, id: PeriodId) -> bool {
    let before = self.periods.len();
    self.periods.retain(|p| p.period_id != id);
    self.periods.len() != before
  }

  /// Reject a malformed candidate before the conflict rules see it.
  pub fn validate(&self, candidate: &impl Sitting) -> Result<()> {
    self.check(candidate, true)
  }

  /// [`Catalog::validate`] without the subject lookup, for edits. An edit
  /// cannot change the subject, so a row whose subject title has since been
  /// renamed in the catalog can still be moved.
  pub fn validate_placement(&self, candidate: &impl Sitting) -> Result<()> {
    self.check(candidate, false)
  }

  fn check(&self, candidate: &impl Sitting, subject: bool) -> Result<()> {
    let required = [
      ("subject_code", candidate.subject_code()),
      ("subject_title", candidate.subject_title()),
      ("instructor", candidate.instructor()),
      ("exam_slot", candidate.exam_slot()),
      ("proctor", candidate.proctor()),
      ("room", candidate.room()),
    ];
    if let Some(&(field, _)) = required.iter().find(|(_, v)| v.trim().is_empty())
    {
      return Err(ValidationError::MissingField(field).into());
    }

    let period = self
      .period(candidate.period_id())
      .ok_or(Error::PeriodNotFound(candidate.period_id()))?;
    if self.section(candidate.section_id()).is_none() {
      return Err(Error::SectionNotFound(candidate.section_id()));
    }

    if !self.slots.is_empty() && !self.has_slot(candidate.exam_slot()) {
      return Err(
        ValidationError::UnknownSlot(candidate.exam_slot().to_owned()).into(),
      );
    }
    if !self.rooms.is_empty() && self.room(candidate.room()).is_none() {
      return Err(ValidationError::UnknownRoom(candidate.room().to_owned()).into());
    }
    if subject
      && !self.subjects.is_empty()
      && self
        .subject(candidate.subject_code(), candidate.subject_title())
        .is_none()
    {
      return Err(
        ValidationError::UnknownSubject {
          code:  candidate.subject_code().to_owned(),
          title: candidate.subject_title().to_owned(),
        }
        .into(),
      );
    }

    if !period.contains(candidate.exam_date()) {
      return Err(
        ValidationError::DateOutsidePeriod {
          date:   candidate.exam_date(),
          period: period.period_id,
          start:  period.start_date,
          end:    period.end_date,
        }
        .into(),
      );
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assignment::NewAssignment;

  fn date(m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, m, d).unwrap() }

  fn catalog() -> Catalog {
    Catalog {
      periods:  vec![ExamPeriod {
        period_id:  1,
        semester:   "2nd Semester 2025".into(),
        start_date: date(3, 1),
        end_date:   date(3, 15),
      }],
      subjects: vec![Subject {
        code:       "CPEP 311A".into(),
        title:      "Data Structures".into(),
        instructor: "Prof. Cruz".into(),
      }],
      sections: vec![Section { section_id: 1, name: "BSCE 3A".into() }],
      rooms:    vec![Room { label: "Room 101".into(), capacity: Some(40) }],
      slots:    vec!["7:30-9:30 AM".into(), "10:00-12:00 PM".into()],
    }
  }

  fn candidate() -> NewAssignment {
    NewAssignment {
      period_id:     1,
      subject_code:  "CPEP 311A".into(),
      subject_title: "Data Structures".into(),
      section_id:    1,
      instructor:    "Prof. Cruz".into(),
      exam_date:     date(3, 10),
      exam_slot:     "7:30-9:30 AM".into(),
      proctor:       "Cruz".into(),
      room:          "room 101".into(),
    }
  }

  #[test]
  fn well_formed_candidate_passes() {
    catalog().validate(&candidate()).unwrap();
  }

  #[test]
  fn blank_field_is_missing() {
    let mut c = candidate();
    c.proctor = "   ".into();
    let err = catalog().validate(&c).unwrap_err();
    assert!(matches!(
      err,
      Error::Validation(ValidationError::MissingField("proctor"))
    ));
  }

  #[test]
  fn unknown_references_are_rejected() {
    let cat = catalog();

    let mut c = candidate();
    c.period_id = 9;
    assert!(matches!(cat.validate(&c), Err(Error::PeriodNotFound(9))));

    let mut c = candidate();
    c.section_id = 4;
    assert!(matches!(cat.validate(&c), Err(Error::SectionNotFound(4))));

    let mut c = candidate();
    c.exam_slot = "7:30-9:30 am".into();
    assert!(matches!(
      cat.validate(&c),
      Err(Error::Validation(ValidationError::UnknownSlot(_)))
    ));

    let mut c = candidate();
    c.room = "Auditorium".into();
    assert!(matches!(
      cat.validate(&c),
      Err(Error::Validation(ValidationError::UnknownRoom(_)))
    ));

    let mut c = candidate();
    c.subject_title = "Algorithms".into();
    assert!(matches!(
      cat.validate(&c),
      Err(Error::Validation(ValidationError::UnknownSubject { .. }))
    ));
  }

  #[test]
  fn date_must_fall_inside_period() {
    let mut c = candidate();
    c.exam_date = date(3, 16);
    assert!(matches!(
      catalog().validate(&c),
      Err(Error::Validation(ValidationError::DateOutsidePeriod { period: 1, .. }))
    ));

    c.exam_date = date(3, 15);
    catalog().validate(&c).unwrap();
  }

  #[test]
  fn uncurated_lists_are_not_checked() {
    let mut cat = catalog();
    cat.rooms.clear();
    cat.slots.clear();
    cat.subjects.clear();

    let mut c = candidate();
    c.room = "Gym".into();
    c.exam_slot = "anytime".into();
    c.subject_code = "NEW 100".into();
    cat.validate(&c).unwrap();
  }

  #[test]
  fn placement_check_skips_the_subject() {
    let mut c = candidate();
    c.subject_title = "Data Structures and Algorithms".into();
    catalog().validate_placement(&c).unwrap();

    c.room = "Auditorium".into();
    assert!(matches!(
      catalog().validate_placement(&c),
      Err(Error::Validation(ValidationError::UnknownRoom(_)))
    ));
  }

  #[test]
  fn removed_period_no_longer_validates() {
    let mut cat = catalog();
    assert!(cat.remove_period(1));
    assert!(!cat.remove_period(1));
    assert!(matches!(cat.validate(&candidate()), Err(Error::PeriodNotFound(1))));
  }
}
