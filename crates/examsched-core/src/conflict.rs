//! The conflict evaluator.
//!
//! Pure functions over a snapshot of committed assignments. Nothing is cached
//! between calls; callers re-evaluate after every mutation.
//!
//! Two assignments *share a sitting* when they belong to the same period and
//! have the same `exam_date` and byte-identical `exam_slot`. Within a shared
//! sitting:
//!
//! | Rule | [`detect_all`] flags | [`check_candidate`] flags |
//! |------|----------------------|---------------------------|
//! | `room` | same room (ignoring case) | same room |
//! | `proctor` | same proctor (ignoring case) | same proctor |
//! | `instructor` | **same** instructor | **different** instructor |
//! | `section` | same `section_id` | same `section_id` |
//!
//! The instructor rule is deliberately asymmetric. The pairwise scan looks for
//! an instructor double-booked against themself; the candidate check tells the
//! scheduling instructor that someone else is also examining in that sitting,
//! which is advisory only (see [`ConflictRule::is_blocking`]).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::assignment::{ExamAssignment, Sitting};

// ─── Rules ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConflictRule {
  Room,
  Proctor,
  Instructor,
  Section,
}

impl ConflictRule {
  /// Evaluation and reporting order.
  pub const ALL: [Self; 4] =
    [Self::Room, Self::Proctor, Self::Instructor, Self::Section];

  /// Whether a candidate hit under this rule should stop a commit. Only the
  /// instructor rule is advisory.
  pub fn is_blocking(self) -> bool { !matches!(self, Self::Instructor) }

  /// The pairwise rule used by [`detect_all`].
  fn pairwise(self, a: &impl Sitting, b: &impl Sitting) -> bool {
    match self {
      Self::Room => a.room().eq_ignore_ascii_case(b.room()),
      Self::Proctor => a.proctor().eq_ignore_ascii_case(b.proctor()),
      Self::Instructor => a.instructor().eq_ignore_ascii_case(b.instructor()),
      Self::Section => a.section_id() == b.section_id(),
    }
  }

  /// The candidate rule used by [`check_candidate`].
  fn against_candidate(self, existing: &impl Sitting, candidate: &impl Sitting) -> bool {
    match self {
      Self::Instructor => !existing
        .instructor()
        .eq_ignore_ascii_case(candidate.instructor()),
      other => other.pairwise(existing, candidate),
    }
  }
}

fn shares_sitting(a: &impl Sitting, b: &impl Sitting) -> bool {
  a.period_id() == b.period_id()
    && a.exam_date() == b.exam_date()
    && a.exam_slot() == b.exam_slot()
}

// ─── Pairwise scan ───────────────────────────────────────────────────────────

/// Two committed assignments that collide under `rule`. `first` precedes
/// `second` in the scanned order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPair {
  pub rule:   ConflictRule,
  pub first:  ExamAssignment,
  pub second: ExamAssignment,
}

impl ConflictPair {
  /// Whether this pair is `{a, b}` in either order.
  pub fn involves(&self, a: Uuid, b: Uuid) -> bool {
    (self.first.id == a && self.second.id == b)
      || (self.first.id == b && self.second.id == a)
  }
}

/// Every collision in a period, grouped by rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
  pub room_conflicts:       Vec<ConflictPair>,
  pub proctor_conflicts:    Vec<ConflictPair>,
  pub instructor_conflicts: Vec<ConflictPair>,
  pub section_conflicts:    Vec<ConflictPair>,
}

impl ConflictReport {
  pub fn get(&self, rule: ConflictRule) -> &[ConflictPair] {
    match rule {
      ConflictRule::Room => &self.room_conflicts,
      ConflictRule::Proctor => &self.proctor_conflicts,
      ConflictRule::Instructor => &self.instructor_conflicts,
      ConflictRule::Section => &self.section_conflicts,
    }
  }

  fn get_mut(&mut self, rule: ConflictRule) -> &mut Vec<ConflictPair> {
    match rule {
      ConflictRule::Room => &mut self.room_conflicts,
      ConflictRule::Proctor => &mut self.proctor_conflicts,
      ConflictRule::Instructor => &mut self.instructor_conflicts,
      ConflictRule::Section => &mut self.section_conflicts,
    }
  }

  /// All pairs with their rule, in rule order.
  pub fn iter(&self) -> impl Iterator<Item = (ConflictRule, &ConflictPair)> {
    ConflictRule::ALL
      .into_iter()
      .flat_map(move |rule| self.get(rule).iter().map(move |p| (rule, p)))
  }

  pub fn len(&self) -> usize { ConflictRule::ALL.iter().map(|r| self.get(*r).len()).sum() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Scan every unordered pair of `assignments` once and record each rule the
/// pair violates. Pairs from different periods never collide.
///
/// O(N²) in the number of assignments, which is fine for the tens to low
/// hundreds of exams in one period.
pub fn detect_all(assignments: &[ExamAssignment]) -> ConflictReport {
  let mut report = ConflictReport::default();

  for (i, a) in assignments.iter().enumerate() {
    for b in &assignments[i + 1..] {
      if !shares_sitting(a, b) {
        continue;
      }
      for rule in ConflictRule::ALL {
        if rule.pairwise(a, b) {
          report.get_mut(rule).push(ConflictPair {
            rule,
            first:  a.clone(),
            second: b.clone(),
          });
        }
      }
    }
  }

  report
}

// ─── Candidate check ─────────────────────────────────────────────────────────

/// A committed assignment a candidate collides with, and under which rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateConflict {
  pub rule:     ConflictRule,
  pub existing: ExamAssignment,
}

/// Report every committed assignment `candidate` collides with.
///
/// `exclude_id` skips one committed assignment, normally the row being edited,
/// so an edit never collides with its own pre-edit state. Results are in the
/// order of `existing`, then in [`ConflictRule::ALL`] order.
pub fn check_candidate(
  existing: &[ExamAssignment],
  candidate: &impl Sitting,
  exclude_id: Option<Uuid>,
) -> Vec<CandidateConflict> {
  existing
    .iter()
    .filter(|a| Some(a.id) != exclude_id)
    .filter(|a| shares_sitting(*a, candidate))
    .flat_map(|a| {
      ConflictRule::ALL
        .into_iter()
        .filter(|rule| rule.against_candidate(a, candidate))
        .map(|rule| CandidateConflict { rule, existing: a.clone() })
    })
    .collect()
}

/// Whether any hit in `conflicts` should stop a commit.
pub fn any_blocking(conflicts: &[CandidateConflict]) -> bool {
  conflicts.iter().any(|c| c.rule.is_blocking())
}
