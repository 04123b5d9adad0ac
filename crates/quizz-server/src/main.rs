//! quizz-server binary.
//!
//! Layers `config.toml` (or `--config <file>`) with `QUIZZ_*` environment
//! variables, opens the SQLite store and serves the JSON API.
//!
//! Account passwords are stored as argon2 PHC strings; print one with
//!
//! ```text
//! quizz-server --hash-password
//! ```

use std::{
  io::{self, BufRead as _, Write as _},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use quizz_core::{id::UserId, store::QuizStore as _};
use quizz_server::{AppState, ServerConfig, auth::hash_password, grader::HttpGrader};
use quizz_store_sqlite::SqliteStore;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Quizz API server")]
struct Cli {
  /// TOML configuration file; missing is fine when env vars cover it.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Read a password from stdin, print its argon2 hash and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  if cli.hash_password {
    return print_password_hash();
  }

  let cfg = load_config(&cli.config)?;
  serve(cfg).await
}

/// `QUIZZ_PORT=8080`, `QUIZZ_GRADER__API_KEY=…` and so on override the file.
fn load_config(path: &Path) -> Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("QUIZZ")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .with_context(|| format!("loading configuration from {}", path.display()))?
    .try_deserialize()
    .context("invalid server configuration")
}

async fn serve(cfg: ServerConfig) -> Result<()> {
  if cfg.accounts.is_empty() {
    warn!("no accounts configured; every request will be rejected");
  }
  if cfg.grader.api_key.is_empty() {
    warn!("no grader api key configured; written answers will be graded incorrect");
  }

  let path = expand_home(&cfg.store_path);
  let store = SqliteStore::open(&path)
    .await
    .with_context(|| format!("opening store {}", path.display()))?;
  for account in &cfg.accounts {
    store
      .ensure_user(UserId(account.username.clone()), account.display_name.clone())
      .await
      .with_context(|| format!("registering account {}", account.username))?;
  }

  let grader = HttpGrader::new(&cfg.grader).context("building grader client")?;
  let app = quizz_server::router(AppState {
    store:  Arc::new(store),
    grader: Arc::new(grader),
    auth:   Arc::new(cfg.auth()),
  });

  let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port))
    .await
    .with_context(|| format!("binding {}:{}", cfg.host, cfg.port))?;
  info!(address = %listener.local_addr()?, store = %path.display(), "quizz-server listening");

  axum::serve(listener, app).await.context("server stopped")
}

fn print_password_hash() -> Result<()> {
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;

  let hash = hash_password(line.trim_end_matches(['\n', '\r']))
    .map_err(|e| anyhow::anyhow!("hashing password: {e}"))?;
  println!("{hash}");
  Ok(())
}

/// `~/quizz.db` → `$HOME/quizz.db`; other paths are returned unchanged.
fn expand_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
