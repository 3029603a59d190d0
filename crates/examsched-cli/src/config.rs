//! Runtime configuration: defaults, then an optional TOML file, then
//! `EXAMSCHED_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use examsched_core::assignment::PeriodId;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path:     PathBuf,
  /// Period used when a command is not given `--period`.
  #[serde(default)]
  pub current_period: Option<PeriodId>,
}

impl CliConfig {
  pub fn load(file: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "exam_scheduler.db")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("EXAMSCHED"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut cfg: CliConfig = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  /// The explicit `--period`, or the configured current period.
  pub fn period(&self, flag: Option<PeriodId>) -> Result<PeriodId> {
    flag.or(self.current_period).context(
      "no exam period selected: pass --period or set current_period in the config",
    )
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
