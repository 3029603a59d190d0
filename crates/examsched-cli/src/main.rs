//! `examsched`: command-line front end for the exam slot scheduler.
//!
//! Every command prints JSON to stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! examsched period add --semester "2nd Semester 2025" --start 2026-03-01 --end 2026-03-15
//! examsched add --period 1 --code "CPEP 311A" --section 1 \
//!   --date 2026-03-10 --slot "7:30-9:30 AM" --proctor Cruz --room "Room 101"
//! examsched conflicts --period 1
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use examsched_core::assignment::{PeriodId, SectionId};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::CliConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Exam slot scheduling and conflict checks")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "examsched.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path` from the config.
  #[arg(long, env = "EXAMSCHED_STORE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the database schema and print the store path.
  Init,

  /// Manage exam periods.
  #[command(subcommand)]
  Period(PeriodCommand),

  /// Manage the subject, section, room, and slot catalog.
  #[command(subcommand)]
  Catalog(CatalogCommand),

  /// Validate, check, and commit a new exam assignment.
  Add(CandidateArgs),

  /// Change the date, slot, proctor, or room of an assignment.
  Edit {
    id: Uuid,
    #[arg(long)]
    date:    Option<NaiveDate>,
    #[arg(long)]
    slot:    Option<String>,
    #[arg(long)]
    proctor: Option<String>,
    #[arg(long)]
    room:    Option<String>,
  },

  /// Remove an assignment.
  Remove { id: Uuid },

  /// List a period's assignments in chronological order.
  List {
    #[arg(long)]
    period:     Option<PeriodId>,
    #[arg(long)]
    instructor: Option<String>,
  },

  /// Search a period's assignments (case-insensitive).
  Find {
    #[arg(long)]
    period:     Option<PeriodId>,
    #[arg(long)]
    code:       Option<String>,
    #[arg(long)]
    section:    Option<SectionId>,
    #[arg(long)]
    instructor: Option<String>,
    #[arg(long)]
    room:       Option<String>,
    #[arg(long)]
    proctor:    Option<String>,
  },

  /// Report what a candidate would collide with, without committing it.
  Check {
    #[command(flatten)]
    candidate: CandidateArgs,
    /// Ignore this assignment (the one being edited).
    #[arg(long)]
    exclude:   Option<Uuid>,
  },

  /// Pairwise conflict scan over a whole period.
  Conflicts {
    #[arg(long)]
    period: Option<PeriodId>,
  },

  /// Write a period's assignments to a JSON file.
  Export {
    #[arg(long)]
    period: Option<PeriodId>,
    #[arg(long, value_name = "FILE")]
    out:    PathBuf,
  },
}

#[derive(Subcommand, Debug)]
enum PeriodCommand {
  Add {
    #[arg(long)]
    semester: String,
    #[arg(long)]
    start:    NaiveDate,
    #[arg(long)]
    end:      NaiveDate,
  },
  List,
  /// Delete a period and every assignment in it.
  Remove { id: PeriodId },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
  AddSubject {
    #[arg(long)]
    code:       String,
    #[arg(long)]
    title:      String,
    #[arg(long)]
    instructor: String,
  },
  AddSection { name: String },
  AddRoom {
    label:    String,
    #[arg(long)]
    capacity: Option<u32>,
  },
  AddSlot { label: String },
  Show,
}

/// The fields of a candidate assignment. `title` and `instructor` default to
/// the catalog entry for `code`.
#[derive(Args, Debug, Clone)]
struct CandidateArgs {
  #[arg(long)]
  period:     Option<PeriodId>,
  #[arg(long)]
  code:       String,
  #[arg(long)]
  title:      Option<String>,
  #[arg(long)]
  section:    SectionId,
  #[arg(long)]
  instructor: Option<String>,
  #[arg(long)]
  date:       NaiveDate,
  #[arg(long)]
  slot:       String,
  #[arg(long)]
  proctor:    String,
  #[arg(long)]
  room:       String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing on stderr so stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = CliConfig::load(&cli.config)?;
  if let Some(store) = cli.store {
    cfg.store_path = store;
  }

  let ctx = commands::Context::open(cfg)
    .await
    .context("failed to open the exam store")?;
  commands::run(&ctx, cli.command).await
}
