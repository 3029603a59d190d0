//! Command execution. Each command is a thin wrapper over the store or the
//! [`Scheduler`]; output is JSON on stdout.

use std::{io::Write as _, sync::Arc};

use anyhow::{Context as _, Result, anyhow, bail};
use examsched_core::{
  assignment::{AssignmentPatch, AssignmentQuery, NewAssignment, PeriodId},
  catalog::{Room, Subject},
  scheduler::{Commit, Scheduler},
};
use examsched_store_sqlite::SqliteStore;
use serde::Serialize;
use serde_json::json;

use crate::{CandidateArgs, CatalogCommand, Command, PeriodCommand, config::CliConfig};

/// Everything a command needs: configuration, the store, and a scheduler
/// over a catalog snapshot taken at startup.
pub struct Context {
  cfg:       CliConfig,
  store:     Arc<SqliteStore>,
  scheduler: Scheduler<SqliteStore>,
}

impl Context {
  pub async fn open(cfg: CliConfig) -> Result<Self> {
    let store = SqliteStore::open(&cfg.store_path)
      .await
      .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
    let catalog = store.load_catalog().await.context("failed to load catalog")?;
    let store = Arc::new(store);
    let scheduler = Scheduler::new(store.clone(), Arc::new(catalog));
    Ok(Self { cfg, store, scheduler })
  }

  fn period(&self, flag: Option<PeriodId>) -> Result<PeriodId> { self.cfg.period(flag) }

  /// Fill `title` and `instructor` from the catalog when not given.
  fn candidate(&self, args: CandidateArgs) -> Result<NewAssignment> {
    let period_id = self.period(args.period)?;
    let catalog = self.scheduler.catalog();
    let subject = catalog
      .subjects
      .iter()
      .find(|s| s.code.eq_ignore_ascii_case(&args.code));

    let title = match (args.title, subject) {
      (Some(t), _) => t,
      (None, Some(s)) => s.title.clone(),
      (None, None) => bail!("subject {:?} is not in the catalog; pass --title", args.code),
    };
    let instructor = match (args.instructor, subject) {
      (Some(i), _) => i,
      (None, Some(s)) => s.instructor.clone(),
      (None, None) => {
        bail!("subject {:?} is not in the catalog; pass --instructor", args.code)
      }
    };

    Ok(NewAssignment {
      period_id,
      subject_code: args.code,
      subject_title: title,
      section_id: args.section,
      instructor,
      exam_date: args.date,
      exam_slot: args.slot,
      proctor: args.proctor,
      room: args.room,
    })
  }

  /// Print a commit outcome together with a fresh scan of its period, which
  /// surfaces anything a concurrent writer slipped in.
  async fn report_commit(&self, period_id: PeriodId, outcome: Commit) -> Result<()> {
    let audit = self.scheduler.detect_all(period_id).await?;
    if !audit.is_empty() {
      tracing::warn!(period_id, conflicts = audit.len(), "period has conflicts after commit");
    }
    print_json(&json!({ "commit": outcome, "audit": audit }))
  }
}

fn print_json(value: &impl Serialize) -> Result<()> {
  let mut out = std::io::stdout().lock();
  serde_json::to_writer_pretty(&mut out, value).context("writing output")?;
  writeln!(out)?;
  Ok(())
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
  match command {
    Command::Init => print_json(&json!({ "store_path": ctx.cfg.store_path })),

    Command::Period(cmd) => run_period(ctx, cmd).await,

    Command::Catalog(cmd) => run_catalog(ctx, cmd).await,

    Command::Add(args) => {
      let candidate = ctx.candidate(args)?;
      let period_id = candidate.period_id;
      let outcome = ctx.scheduler.commit(candidate).await?;
      ctx.report_commit(period_id, outcome).await
    }

    Command::Edit { id, date, slot, proctor, room } => {
      let patch = AssignmentPatch { exam_date: date, exam_slot: slot, proctor, room };
      if patch.is_empty() {
        bail!("nothing to change: pass at least one of --date, --slot, --proctor, --room");
      }
      let outcome = ctx.scheduler.edit(id, patch).await?;
      let period_id = match outcome.assignment() {
        Some(a) => a.period_id,
        None => ctx.scheduler.get(id).await?.period_id,
      };
      ctx.report_commit(period_id, outcome).await
    }

    Command::Remove { id } => print_json(&ctx.scheduler.remove(id).await?),

    Command::List { period, instructor } => {
      let period_id = ctx.period(period)?;
      print_json(&ctx.scheduler.list(period_id, instructor.as_deref()).await?)
    }

    Command::Find { period, code, section, instructor, room, proctor } => {
      let period_id = ctx.period(period)?;
      let query = AssignmentQuery {
        subject_code: code,
        section_id: section,
        instructor,
        room,
        proctor,
      };
      print_json(&ctx.scheduler.search(period_id, &query).await?)
    }

    Command::Check { candidate, exclude } => {
      let candidate = ctx.candidate(candidate)?;
      ctx.scheduler.catalog().validate(&candidate)?;
      let hits = ctx
        .scheduler
        .check_candidate(candidate.period_id, &candidate, exclude)
        .await?;
      print_json(&hits)
    }

    Command::Conflicts { period } => {
      let period_id = ctx.period(period)?;
      print_json(&ctx.scheduler.detect_all(period_id).await?)
    }

    Command::Export { period, out } => {
      let period_id = ctx.period(period)?;
      let rows = ctx.scheduler.list(period_id, None).await?;
      let file = std::fs::File::create(&out)
        .with_context(|| format!("creating {}", out.display()))?;
      serde_json::to_writer_pretty(file, &rows)
        .with_context(|| format!("writing {}", out.display()))?;
      tracing::info!(period_id, exams = rows.len(), path = %out.display(), "exported");
      print_json(&json!({ "exported": rows.len(), "path": out }))
    }
  }
}

async fn run_period(ctx: &Context, cmd: PeriodCommand) -> Result<()> {
  match cmd {
    PeriodCommand::Add { semester, start, end } => {
      if start > end {
        return Err(anyhow!("period starts ({start}) after it ends ({end})"));
      }
      print_json(&ctx.store.add_period(semester, start, end).await?)
    }
    PeriodCommand::List => print_json(&ctx.store.list_periods().await?),
    PeriodCommand::Remove { id } => {
      let removed = ctx.scheduler.remove_period(id).await?;
      print_json(&json!({ "period_id": id, "assignments_removed": removed }))
    }
  }
}

async fn run_catalog(ctx: &Context, cmd: CatalogCommand) -> Result<()> {
  match cmd {
    CatalogCommand::AddSubject { code, title, instructor } => {
      let subject = Subject { code, title, instructor };
      ctx.store.add_subject(subject.clone()).await?;
      print_json(&subject)
    }
    CatalogCommand::AddSection { name } => print_json(&ctx.store.add_section(name).await?),
    CatalogCommand::AddRoom { label, capacity } => {
      let room = Room { label, capacity };
      ctx.store.add_room(room.clone()).await?;
      print_json(&room)
    }
    CatalogCommand::AddSlot { label } => {
      ctx.store.add_slot(label.clone()).await?;
      print_json(&json!({ "slot": label }))
    }
    CatalogCommand::Show => print_json(&ctx.store.load_catalog().await?),
  }
}
