//! The `AssignmentStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `examsched-store-sqlite`). The [`Scheduler`](crate::scheduler::Scheduler)
//! and the binaries depend on this abstraction, not on any concrete backend.
//!
//! The store does not validate or conflict-check anything: `insert` always
//! succeeds unless the storage itself fails. Validation belongs to the
//! catalog, the guards, and the evaluator.

use std::future::Future;

use chrono::NaiveDate;

use crate::assignment::{
  AssignmentId, AssignmentPatch, ExamAssignment, NewAssignment, PeriodId,
};

/// Abstraction over an exam assignment store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait AssignmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Persist a new assignment under a freshly generated id.
  fn insert(
    &self,
    input: NewAssignment,
  ) -> impl Future<Output = Result<ExamAssignment, Self::Error>> + Send + '_;

  /// Change the date, slot, proctor, or room of an existing assignment and
  /// return the updated row. Returns `None` if `id` does not exist.
  fn update(
    &self,
    id: AssignmentId,
    patch: AssignmentPatch,
  ) -> impl Future<Output = Result<Option<ExamAssignment>, Self::Error>> + Send + '_;

  /// Remove an assignment. Returns `false` if `id` does not exist.
  fn delete(
    &self,
    id: AssignmentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete an exam period together with every assignment in it. Returns the
  /// number of assignments removed, or `None` if the period does not exist.
  fn delete_period(
    &self,
    period_id: PeriodId,
  ) -> impl Future<Output = Result<Option<usize>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve one assignment. Returns `None` if not found.
  fn get(
    &self,
    id: AssignmentId,
  ) -> impl Future<Output = Result<Option<ExamAssignment>, Self::Error>> + Send + '_;

  /// All assignments in `period_id`, optionally only those owned by
  /// `instructor` (exact match).
  ///
  /// Ordered by `exam_date`, then the slot's time of day (see
  /// [`crate::slot::sort_key`]), then `subject_code`; `section_id` and `id`
  /// break any remaining ties.
  fn list<'a>(
    &'a self,
    period_id: PeriodId,
    instructor: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<ExamAssignment>, Self::Error>> + Send + 'a;

  /// All assignments in any period whose `exam_date` lies in `[from, to]`,
  /// in the same order as [`AssignmentStore::list`].
  fn list_between(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<ExamAssignment>, Self::Error>> + Send + '_;
}

/// Sort assignments into the order [`AssignmentStore::list`] promises.
/// Backends that cannot order slot labels chronologically in their query
/// language call this on the fetched rows.
pub fn sort_assignments(rows: &mut [ExamAssignment]) {
  rows.sort_by(|a, b| {
    a.exam_date
      .cmp(&b.exam_date)
      .then_with(|| {
        crate::slot::sort_key(&a.exam_slot).cmp(&crate::slot::sort_key(&b.exam_slot))
      })
      .then_with(|| a.subject_code.cmp(&b.subject_code))
      .then_with(|| a.section_id.cmp(&b.section_id))
      .then_with(|| a.id.cmp(&b.id))
  });
}
