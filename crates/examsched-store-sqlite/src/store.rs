//! [`SqliteStore`]: the SQLite implementation of [`AssignmentStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use examsched_core::{
  assignment::{AssignmentPatch, ExamAssignment, NewAssignment, PeriodId},
  catalog::{Catalog, ExamPeriod, Room, Section, Subject},
  store::{AssignmentStore, sort_assignments},
};

use crate::{
  Error, Result,
  encode::{EXAM_COLUMNS, RawAssignment, RawPeriod, encode_date, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An exam assignment store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a query returning exam rows, then decode and order them.
  async fn query_exams<P>(&self, sql: String, params: P) -> Result<Vec<ExamAssignment>>
  where
    P: rusqlite::Params + Send + 'static,
  {
    let raws: Vec<RawAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params, RawAssignment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut rows = raws
      .into_iter()
      .map(RawAssignment::into_assignment)
      .collect::<Result<Vec<_>>>()?;
    sort_assignments(&mut rows);
    Ok(rows)
  }

  // ── Catalog maintenance ───────────────────────────────────────────────────

  /// Create an exam period and return it with its assigned id.
  pub async fn add_period(
    &self,
    semester: impl Into<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
  ) -> Result<ExamPeriod> {
    let semester = semester.into();
    let sem = semester.clone();
    let start = encode_date(start_date);
    let end = encode_date(end_date);

    let period_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO exam_periods (semester, start_date, end_date) VALUES (?1, ?2, ?3)",
          rusqlite::params![sem, start, end],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ExamPeriod { period_id, semester, start_date, end_date })
  }

  pub async fn list_periods(&self) -> Result<Vec<ExamPeriod>> {
    let raws: Vec<RawPeriod> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT period_id, semester, start_date, end_date
           FROM exam_periods ORDER BY start_date, period_id",
        )?;
        let rows = stmt
          .query_map([], RawPeriod::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPeriod::into_period).collect()
  }

  /// Add or replace a subject, keyed by its code.
  pub async fn add_subject(&self, subject: Subject) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (code, title, instructor) VALUES (?1, ?2, ?3)
           ON CONFLICT(code) DO UPDATE
             SET title = excluded.title, instructor = excluded.instructor",
          rusqlite::params![subject.code, subject.title, subject.instructor],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Add a section by name, or return the existing one with that name.
  pub async fn add_section(&self, name: impl Into<String>) -> Result<Section> {
    let name = name.into();
    let n = name.clone();

    let section_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO sections (section_name) VALUES (?1)",
          rusqlite::params![n],
        )?;
        Ok(conn.query_row(
          "SELECT section_id FROM sections WHERE section_name = ?1",
          rusqlite::params![n],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(Section { section_id, name })
  }

  /// Add a room; an existing room with the same label (ignoring case) is
  /// left unchanged.
  pub async fn add_room(&self, room: Room) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO rooms (room_label, capacity) VALUES (?1, ?2)",
          rusqlite::params![room.label, room.capacity],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_slot(&self, label: impl Into<String>) -> Result<()> {
    let label = label.into();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO time_slots (slot_label) VALUES (?1)",
          rusqlite::params![label],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Snapshot every catalog table.
  pub async fn load_catalog(&self) -> Result<Catalog> {
    let periods = self.list_periods().await?;

    let (subjects, sections, rooms, mut slots) = self
      .conn
      .call(|conn| {
        let subjects = conn
          .prepare("SELECT code, title, instructor FROM subjects ORDER BY code")?
          .query_map([], |r| {
            Ok(Subject {
              code:       r.get(0)?,
              title:      r.get(1)?,
              instructor: r.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let sections = conn
          .prepare("SELECT section_id, section_name FROM sections ORDER BY section_id")?
          .query_map([], |r| Ok(Section { section_id: r.get(0)?, name: r.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let rooms = conn
          .prepare("SELECT room_label, capacity FROM rooms ORDER BY room_label")?
          .query_map([], |r| Ok(Room { label: r.get(0)?, capacity: r.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let slots = conn
          .prepare("SELECT slot_label FROM time_slots")?
          .query_map([], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((subjects, sections, rooms, slots))
      })
      .await?;

    slots.sort_by(|a, b| {
      examsched_core::slot::sort_key(a).cmp(&examsched_core::slot::sort_key(b))
    });

    Ok(Catalog { periods, subjects, sections, rooms, slots })
  }
}

// ─── AssignmentStore impl ────────────────────────────────────────────────────

impl AssignmentStore for SqliteStore {
  type Error = Error;

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn insert(&self, input: NewAssignment) -> Result<ExamAssignment> {
    let assignment = ExamAssignment::from_new(Uuid::new_v4(), input);

    let id_str   = encode_uuid(assignment.id);
    let date_str = encode_date(assignment.exam_date);
    let a        = assignment.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO exams (
             exam_id, period_id, subject_code, subject_title, section_id,
             instructor, exam_date, exam_slot, proctor, room
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            a.period_id,
            a.subject_code,
            a.subject_title,
            a.section_id,
            a.instructor,
            date_str,
            a.exam_slot,
            a.proctor,
            a.room,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(assignment)
  }

  async fn update(&self, id: Uuid, patch: AssignmentPatch) -> Result<Option<ExamAssignment>> {
    let id_str   = encode_uuid(id);
    let date_str = patch.exam_date.map(encode_date);
    let sql      = format!("SELECT {EXAM_COLUMNS} FROM exams WHERE exam_id = ?1");

    let raw: Option<RawAssignment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE exams SET
             exam_date = COALESCE(?2, exam_date),
             exam_slot = COALESCE(?3, exam_slot),
             proctor   = COALESCE(?4, proctor),
             room      = COALESCE(?5, room)
           WHERE exam_id = ?1",
          rusqlite::params![id_str, date_str, patch.exam_slot, patch.proctor, patch.room],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let row = tx
          .query_row(&sql, rusqlite::params![id_str], RawAssignment::from_row)
          .optional()?;
        tx.commit()?;
        Ok(row)
      })
      .await?;

    raw.map(RawAssignment::into_assignment).transpose()
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM exams WHERE exam_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn delete_period(&self, period_id: PeriodId) -> Result<Option<usize>> {
    let removed: Option<usize> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exams: i64 = tx.query_row(
          "SELECT COUNT(*) FROM exams WHERE period_id = ?1",
          rusqlite::params![period_id],
          |r| r.get(0),
        )?;
        let deleted = tx.execute(
          "DELETE FROM exam_periods WHERE period_id = ?1",
          rusqlite::params![period_id],
        )?;
        if deleted == 0 {
          return Ok(None);
        }
        tx.commit()?;
        Ok(Some(exams as usize))
      })
      .await?;

    Ok(removed)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: Uuid) -> Result<Option<ExamAssignment>> {
    let id_str = encode_uuid(id);
    let sql    = format!("SELECT {EXAM_COLUMNS} FROM exams WHERE exam_id = ?1");

    let raw: Option<RawAssignment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str], RawAssignment::from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawAssignment::into_assignment).transpose()
  }

  async fn list(
    &self,
    period_id:  PeriodId,
    instructor: Option<&str>,
  ) -> Result<Vec<ExamAssignment>> {
    let sql = format!(
      "SELECT {EXAM_COLUMNS} FROM exams
       WHERE period_id = ?1 AND (?2 IS NULL OR instructor = ?2)"
    );
    let instructor = instructor.map(str::to_owned);
    self.query_exams(sql, (period_id, instructor)).await
  }

  async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ExamAssignment>> {
    let sql = format!(
      "SELECT {EXAM_COLUMNS} FROM exams WHERE exam_date BETWEEN ?1 AND ?2"
    );
    self
      .query_exams(sql, (encode_date(from), encode_date(to)))
      .await
  }
}
