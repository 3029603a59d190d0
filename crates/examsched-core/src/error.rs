//! Error types for `examsched-core`.
//!
//! Conflicts are not errors: the evaluator returns them as data, and a commit
//! blocked by them is a successful [`Commit::Blocked`](crate::scheduler::Commit)
//! outcome. Errors cover missing records, malformed candidates, guard
//! rejections, and storage failures.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::assignment::{AssignmentId, PeriodId, SectionId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("assignment not found: {0}")]
  AssignmentNotFound(AssignmentId),

  #[error("exam period not found: {0}")]
  PeriodNotFound(PeriodId),

  #[error("section not found: {0}")]
  SectionNotFound(SectionId),

  #[error("invalid candidate: {0}")]
  Validation(#[from] ValidationError),

  #[error("rejected: {0}")]
  Rejected(#[from] Rejection),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

/// A candidate that cannot be evaluated at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("missing required field `{0}`")]
  MissingField(&'static str),

  #[error("unknown slot label {0:?}")]
  UnknownSlot(String),

  #[error("unknown room {0:?}")]
  UnknownRoom(String),

  #[error("unknown subject {code:?} ({title:?})")]
  UnknownSubject { code: String, title: String },

  #[error("candidate belongs to period {found}, not {expected}")]
  PeriodMismatch { expected: PeriodId, found: PeriodId },

  #[error("exam date {date} is outside period {period} ({start} to {end})")]
  DateOutsidePeriod {
    date:   NaiveDate,
    period: PeriodId,
    start:  NaiveDate,
    end:    NaiveDate,
  },
}

/// A commit refused by one of the duplicate or overbooking guards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("subject already has an exam in this period (assignment {existing})")]
  SubjectAlreadyScheduled { existing: Uuid },

  #[error("identical assignment already exists in this period ({existing})")]
  Duplicate { existing: Uuid },

  #[error(
    "identical assignment already exists in ISO week {iso_year}-W{iso_week:02} ({existing})"
  )]
  DuplicateInWeek {
    existing: Uuid,
    iso_year: i32,
    iso_week: u32,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
