//! `academy` — command-line access to the academy store.
//!
//! # Usage
//!
//! ```text
//! academy campus add --name Gent --street Straat --number 1 --postal-code 9000 --municipality Gent
//! academy instructor add --first Ann --last Peeters --salary 2400 --email ann@academy.be --gender woman --campus Gent
//! academy instructor raise --id 1 --percentage 10
//! academy --config ~/.config/academy/academy.toml instructor list
//! ```

mod commands;

use std::path::{Path, PathBuf};

use academy_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, Printer};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "academy", author, version, about = "Campuses, instructors and courses")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "academy.toml")]
  config: PathBuf,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Settings read from the config file and `ACADEMY_*` variables.
#[derive(Debug, Deserialize)]
struct StoreConfig {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("academy.db") }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("ACADEMY"))
    .build()
    .context("failed to read config file")?;

  let store_cfg: StoreConfig = settings
    .try_deserialize()
    .context("failed to deserialise StoreConfig")?;

  let store_path = expand_tilde(&store_cfg.store_path);
  tracing::debug!(path = %store_path.display(), "opening store");

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let session = store.session();
  let result = commands::run(&session, cli.command, Printer { json: cli.json }).await;
  session.close();
  result
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
