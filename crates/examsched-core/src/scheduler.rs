//! [`Scheduler`]: the commit path over an [`AssignmentStore`].
//!
//! A commit validates the candidate against the [`Catalog`], then, holding
//! the candidate period's commit lock, runs the duplicate guards and the
//! candidate conflict check before writing. The lock serialises writers to
//! one period within this process; a second process sharing the same backing
//! store can still race, and the next [`Scheduler::detect_all`] surfaces
//! anything such a race lets through.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  assignment::{
    AssignmentId, AssignmentPatch, AssignmentQuery, ExamAssignment, NewAssignment,
    PeriodId, Sitting,
  },
  catalog::Catalog,
  conflict::{self, CandidateConflict, ConflictReport},
  error::ValidationError,
  guard,
  store::AssignmentStore,
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of a commit or an edit that passed validation and the guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Commit {
  /// Written. `advisories` holds non-blocking (instructor) hits.
  Committed {
    assignment: ExamAssignment,
    advisories: Vec<CandidateConflict>,
  },
  /// Not written: at least one room, proctor, or section collision.
  Blocked { conflicts: Vec<CandidateConflict> },
}

impl Commit {
  pub fn is_committed(&self) -> bool { matches!(self, Self::Committed { .. }) }

  pub fn assignment(&self) -> Option<&ExamAssignment> {
    match self {
      Self::Committed { assignment, .. } => Some(assignment),
      Self::Blocked { .. } => None,
    }
  }
}

// ─── Commit locks ────────────────────────────────────────────────────────────

#[derive(Default)]
struct PeriodLocks(Mutex<HashMap<PeriodId, Arc<tokio::sync::Mutex<()>>>>);

impl PeriodLocks {
  fn for_period(&self, period_id: PeriodId) -> Arc<tokio::sync::Mutex<()>> {
    let mut map = self.0.lock().unwrap_or_else(PoisonError::into_inner);
    map.entry(period_id).or_default().clone()
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

pub struct Scheduler<S> {
  store:   Arc<S>,
  catalog: RwLock<Arc<Catalog>>,
  locks:   PeriodLocks,
}

impl<S: AssignmentStore> Scheduler<S> {
  pub fn new(store: Arc<S>, catalog: Arc<Catalog>) -> Self {
    Self { store, catalog: RwLock::new(catalog), locks: PeriodLocks::default() }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// The current catalog snapshot. Deleting a period through
  /// [`Scheduler::remove_period`] replaces it.
  pub fn catalog(&self) -> Arc<Catalog> {
    self.catalog.read().unwrap_or_else(PoisonError::into_inner).clone()
  }

  fn forget_period(&self, period_id: PeriodId) {
    let mut current = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
    let mut next = Catalog::clone(&current);
    if next.remove_period(period_id) {
      *current = Arc::new(next);
    }
  }

  fn require_period(&self, period_id: PeriodId) -> Result<()> {
    match self.catalog().period(period_id) {
      Some(_) => Ok(()),
      None => Err(Error::PeriodNotFound(period_id)),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get(&self, id: AssignmentId) -> Result<ExamAssignment> {
    self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AssignmentNotFound(id))
  }

  pub async fn list(
    &self,
    period_id: PeriodId,
    instructor: Option<&str>,
  ) -> Result<Vec<ExamAssignment>> {
    self.require_period(period_id)?;
    self.store.list(period_id, instructor).await.map_err(Error::store)
  }

  /// Assignments in `period_id` matching every filter set in `query`.
  pub async fn search(
    &self,
    period_id: PeriodId,
    query: &AssignmentQuery,
  ) -> Result<Vec<ExamAssignment>> {
    let mut rows = self.list(period_id, None).await?;
    rows.retain(|a| query.matches(a));
    Ok(rows)
  }

  // ── Evaluation ────────────────────────────────────────────────────────

  /// Pairwise scan of every committed assignment in `period_id`.
  pub async fn detect_all(&self, period_id: PeriodId) -> Result<ConflictReport> {
    let rows = self.list(period_id, None).await?;
    let report = conflict::detect_all(&rows);
    debug!(
      period_id,
      assignments = rows.len(),
      room = report.room_conflicts.len(),
      proctor = report.proctor_conflicts.len(),
      instructor = report.instructor_conflicts.len(),
      section = report.section_conflicts.len(),
      "detected conflicts"
    );
    Ok(report)
  }

  /// Every committed assignment in `period_id` the candidate collides with.
  /// `exclude_id` skips the row being edited.
  pub async fn check_candidate(
    &self,
    period_id: PeriodId,
    candidate: &impl Sitting,
    exclude_id: Option<AssignmentId>,
  ) -> Result<Vec<CandidateConflict>> {
    if candidate.period_id() != period_id {
      return Err(
        ValidationError::PeriodMismatch {
          expected: period_id,
          found:    candidate.period_id(),
        }
        .into(),
      );
    }
    let rows = self.list(period_id, None).await?;
    let hits = conflict::check_candidate(&rows, candidate, exclude_id);
    debug!(period_id, hits = hits.len(), "checked candidate");
    Ok(hits)
  }

  /// Guards, then the candidate check. The caller holds the period lock.
  async fn screen(
    &self,
    candidate: &NewAssignment,
    exclude_id: Option<AssignmentId>,
  ) -> Result<Vec<CandidateConflict>> {
    let period = self
      .store
      .list(candidate.period_id, None)
      .await
      .map_err(Error::store)?;
    let (monday, sunday) = guard::iso_week_bounds(candidate.exam_date);
    let same_week = self
      .store
      .list_between(monday, sunday)
      .await
      .map_err(Error::store)?;

    if let Err(rejection) = guard::check_all(&period, &same_week, candidate, exclude_id) {
      warn!(
        period_id = candidate.period_id,
        subject = %candidate.subject_code,
        %rejection,
        "commit rejected"
      );
      return Err(rejection.into());
    }

    let hits = conflict::check_candidate(&period, candidate, exclude_id);
    debug!(period_id = candidate.period_id, hits = hits.len(), "screened candidate");
    Ok(hits)
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Validate, guard, check, and (if nothing blocks) insert `candidate`.
  pub async fn commit(&self, candidate: NewAssignment) -> Result<Commit> {
    self.catalog().validate(&candidate)?;

    let lock = self.locks.for_period(candidate.period_id);
    let _held = lock.lock().await;
    // The period may have been deleted while we waited.
    self.require_period(candidate.period_id)?;

    let hits = self.screen(&candidate, None).await?;
    if conflict::any_blocking(&hits) {
      warn!(
        period_id = candidate.period_id,
        subject = %candidate.subject_code,
        conflicts = hits.len(),
        "commit blocked"
      );
      return Ok(Commit::Blocked { conflicts: hits });
    }

    let assignment = self.store.insert(candidate).await.map_err(Error::store)?;
    info!(
      id = %assignment.id,
      period_id = assignment.period_id,
      subject = %assignment.subject_code,
      date = %assignment.exam_date,
      slot = %assignment.exam_slot,
      room = %assignment.room,
      advisories = hits.len(),
      "exam committed"
    );
    Ok(Commit::Committed { assignment, advisories: hits })
  }

  /// Change the date, slot, proctor, or room of an existing assignment,
  /// re-checking it against everything but its own pre-edit row.
  pub async fn edit(&self, id: AssignmentId, patch: AssignmentPatch) -> Result<Commit> {
    let period_id = self.get(id).await?.period_id;

    let lock = self.locks.for_period(period_id);
    let _held = lock.lock().await;

    // Re-read under the lock so the candidate reflects the committed row.
    let current = self.get(id).await?;
    let candidate = current.patched(&patch);
    self.catalog().validate_placement(&candidate)?;

    let hits = self.screen(&candidate, Some(id)).await?;
    if conflict::any_blocking(&hits) {
      warn!(%id, conflicts = hits.len(), "edit blocked");
      return Ok(Commit::Blocked { conflicts: hits });
    }

    let assignment = self
      .store
      .update(id, patch)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AssignmentNotFound(id))?;
    info!(
      %id,
      date = %assignment.exam_date,
      slot = %assignment.exam_slot,
      proctor = %assignment.proctor,
      room = %assignment.room,
      "exam edited"
    );
    Ok(Commit::Committed { assignment, advisories: hits })
  }

  /// Remove an assignment.
  pub async fn remove(&self, id: AssignmentId) -> Result<ExamAssignment> {
    let existing = self.get(id).await?;

    let lock = self.locks.for_period(existing.period_id);
    let _held = lock.lock().await;

    if !self.store.delete(id).await.map_err(Error::store)? {
      return Err(Error::AssignmentNotFound(id));
    }
    info!(%id, subject = %existing.subject_code, "exam removed");
    Ok(existing)
  }

  /// Delete a period and every assignment in it.
  pub async fn remove_period(&self, period_id: PeriodId) -> Result<usize> {
    let lock = self.locks.for_period(period_id);
    let _held = lock.lock().await;
    self.require_period(period_id)?;

    let removed = self
      .store
      .delete_period(period_id)
      .await
      .map_err(Error::store)?;
    // Gone from the store either way; stop treating it as schedulable.
    self.forget_period(period_id);

    let removed = removed.ok_or(Error::PeriodNotFound(period_id))?;
    info!(period_id, removed, "exam period deleted");
    Ok(removed)
  }
}
