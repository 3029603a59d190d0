//! Duplicate and overbooking guards applied at commit time.
//!
//! These sit on top of the four conflict rules and are not part of the
//! pairwise scan. They run in order, and the first one to fail rejects the
//! commit:
//!
//! 1. one exam per `(period, subject_code, subject_title)`;
//! 2. no identical `(subject, section, slot, proctor, room)` in the period;
//! 3. no identical tuple in the same ISO week, across all periods.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use uuid::Uuid;

use crate::{
  assignment::{ExamAssignment, Sitting},
  error::Rejection,
};

fn same_subject(a: &impl Sitting, b: &impl Sitting) -> bool {
  a.subject_code().eq_ignore_ascii_case(b.subject_code())
    && a.subject_title().eq_ignore_ascii_case(b.subject_title())
}

/// The `(subject, section, exam_slot, proctor, room)` tuple the duplicate
/// guards compare.
fn same_booking(a: &impl Sitting, b: &impl Sitting) -> bool {
  same_subject(a, b)
    && a.section_id() == b.section_id()
    && a.exam_slot() == b.exam_slot()
    && a.proctor().eq_ignore_ascii_case(b.proctor())
    && a.room().eq_ignore_ascii_case(b.room())
}

fn others<'a>(
  existing: &'a [ExamAssignment],
  exclude_id: Option<Uuid>,
) -> impl Iterator<Item = &'a ExamAssignment> {
  existing.iter().filter(move |a| Some(a.id) != exclude_id)
}

/// One exam per subject per period. `exclude_id` is the row being edited.
pub fn one_exam_per_subject(
  period: &[ExamAssignment],
  candidate: &impl Sitting,
  exclude_id: Option<Uuid>,
) -> Result<(), Rejection> {
  match others(period, exclude_id)
    .find(|a| a.period_id == candidate.period_id() && same_subject(*a, candidate))
  {
    Some(existing) => Err(Rejection::SubjectAlreadyScheduled { existing: existing.id }),
    None => Ok(()),
  }
}

/// No identical booking anywhere in the candidate's period.
///
/// A duplicate booking always shares the subject too, so inside
/// [`check_all`] [`one_exam_per_subject`] rejects it first and
/// [`Rejection::Duplicate`] never reaches a commit or edit. Callers running
/// this guard on its own still see it.
pub fn no_duplicate_in_period(
  period: &[ExamAssignment],
  candidate: &impl Sitting,
  exclude_id: Option<Uuid>,
) -> Result<(), Rejection> {
  match others(period, exclude_id)
    .find(|a| a.period_id == candidate.period_id() && same_booking(*a, candidate))
  {
    Some(existing) => Err(Rejection::Duplicate { existing: existing.id }),
    None => Ok(()),
  }
}

/// Monday and Sunday of the ISO week containing `date`.
pub fn iso_week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
  let week = date.iso_week();
  let monday = NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
    .unwrap_or(date);
  let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(date);
  (monday, sunday)
}

/// No identical booking in the same ISO week as the candidate, in any period.
/// `nearby` may hold assignments outside the week; they are ignored.
pub fn no_duplicate_in_week(
  nearby: &[ExamAssignment],
  candidate: &impl Sitting,
  exclude_id: Option<Uuid>,
) -> Result<(), Rejection> {
  let week = candidate.exam_date().iso_week();
  match others(nearby, exclude_id)
    .find(|a| a.exam_date.iso_week() == week && same_booking(*a, candidate))
  {
    Some(existing) => Err(Rejection::DuplicateInWeek {
      existing: existing.id,
      iso_year: week.year(),
      iso_week: week.week(),
    }),
    None => Ok(()),
  }
}

/// Run all three guards in order.
///
/// Within one period the subject guard shadows the period duplicate guard,
/// so the rejections seen here are [`Rejection::SubjectAlreadyScheduled`]
/// and, across periods, [`Rejection::DuplicateInWeek`].
pub fn check_all(
  period: &[ExamAssignment],
  same_week: &[ExamAssignment],
  candidate: &impl Sitting,
  exclude_id: Option<Uuid>,
) -> Result<(), Rejection> {
  one_exam_per_subject(period, candidate, exclude_id)?;
  no_duplicate_in_period(period, candidate, exclude_id)?;
  no_duplicate_in_week(same_week, candidate, exclude_id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assignment::NewAssignment;

  fn date(m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, m, d).unwrap() }

  fn committed(period_id: i64, subject: &str, exam_date: NaiveDate) -> ExamAssignment {
    ExamAssignment {
      id: Uuid::new_v4(),
      period_id,
      subject_code: subject.into(),
      subject_title: "Data Structures".into(),
      section_id: 1,
      instructor: "Prof. Cruz".into(),
      exam_date,
      exam_slot: "7:30-9:30 AM".into(),
      proctor: "Cruz".into(),
      room: "Room 101".into(),
    }
  }

  fn candidate(period_id: i64, subject: &str, exam_date: NaiveDate) -> NewAssignment {
    let c = committed(period_id, subject, exam_date);
    NewAssignment {
      period_id,
      subject_code: c.subject_code,
      subject_title: c.subject_title,
      section_id: c.section_id,
      instructor: c.instructor,
      exam_date,
      exam_slot: c.exam_slot,
      proctor: c.proctor,
      room: c.room,
    }
  }

  #[test]
  fn second_exam_for_subject_is_rejected() {
    let existing = committed(1, "CPEP 311A", date(3, 10));
    let mut c = candidate(1, "cpep 311a", date(3, 12));
    c.room = "Room 105".into();

    let err = one_exam_per_subject(std::slice::from_ref(&existing), &c, None)
      .unwrap_err();
    assert_eq!(err, Rejection::SubjectAlreadyScheduled { existing: existing.id });

    // Editing that very row is allowed.
    one_exam_per_subject(std::slice::from_ref(&existing), &c, Some(existing.id))
      .unwrap();

    // A different period is a different exam.
    let other_period = candidate(2, "CPEP 311A", date(3, 12));
    one_exam_per_subject(std::slice::from_ref(&existing), &other_period, None)
      .unwrap();
  }

  #[test]
  fn identical_booking_in_period_is_a_duplicate() {
    let existing = committed(1, "CPEP 311A", date(3, 10));
    let c = candidate(1, "CPEP 311A", date(3, 14));

    let err = no_duplicate_in_period(std::slice::from_ref(&existing), &c, None)
      .unwrap_err();
    assert_eq!(err, Rejection::Duplicate { existing: existing.id });

    let mut moved = c.clone();
    moved.proctor = "Reyes".into();
    no_duplicate_in_period(std::slice::from_ref(&existing), &moved, None).unwrap();
  }

  #[test]
  fn week_guard_spans_periods_but_not_weeks() {
    // 2026-03-09 is a Monday; 2026-03-15 the Sunday of the same ISO week.
    let existing = committed(1, "CPEP 311A", date(3, 9));

    let same_week = candidate(2, "CPEP 311A", date(3, 15));
    let err = no_duplicate_in_week(std::slice::from_ref(&existing), &same_week, None)
      .unwrap_err();
    assert!(matches!(
      err,
      Rejection::DuplicateInWeek { iso_year: 2026, iso_week: 11, .. }
    ));

    let next_week = candidate(2, "CPEP 311A", date(3, 16));
    no_duplicate_in_week(std::slice::from_ref(&existing), &next_week, None).unwrap();
  }

  #[test]
  fn guards_run_in_order() {
    let existing = committed(1, "CPEP 311A", date(3, 10));
    let c = candidate(1, "CPEP 311A", date(3, 10));
    let all = std::slice::from_ref(&existing);

    // Subject uniqueness fires before the duplicate checks.
    assert!(matches!(
      check_all(all, all, &c, None),
      Err(Rejection::SubjectAlreadyScheduled { .. })
    ));
    check_all(all, all, &c, Some(existing.id)).unwrap();

    // An identical booking on another day of the period is still reported
    // as a second exam for the subject, never as a bare duplicate.
    let later = candidate(1, "CPEP 311A", date(3, 12));
    assert!(matches!(
      check_all(all, all, &later, None),
      Err(Rejection::SubjectAlreadyScheduled { .. })
    ));

    // Across periods only the week guard can fire.
    let other_period = candidate(2, "CPEP 311A", date(3, 11));
    assert!(matches!(
      check_all(&[], all, &other_period, None),
      Err(Rejection::DuplicateInWeek { .. })
    ));
  }

  #[test]
  fn week_bounds_handle_year_boundaries() {
    // 2027-01-01 is a Friday in ISO week 2026-W53.
    let (mon, sun) = iso_week_bounds(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    assert_eq!(mon, date(12, 28));
    assert_eq!(sun, NaiveDate::from_ymd_opt(2027, 1, 3).unwrap());

    let (mon, sun) = iso_week_bounds(date(3, 11));
    assert_eq!((mon, sun), (date(3, 9), date(3, 15)));
  }
}
