//! `quizz`: command-line client for the Quizz API.
//!
//! # Usage
//!
//! ```text
//! quizz --url http://localhost:3000 --user alice --password secret list
//! quizz --config ~/.config/quizz/config.toml take 3
//! ```

mod client;
mod take;

use std::{
  io,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use quizz_core::{
  id::QuizId,
  quiz::{NewQuiz, QuestionContent, QuizUpdate},
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quizz", about = "Command-line client for Quizz")]
struct Args {
  /// TOML config file; flags and env vars take precedence.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the quizz server (default: http://localhost:3000).
  #[arg(long, env = "QUIZZ_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "QUIZZ_USER")]
  user: Option<String>,

  /// Password for HTTP Basic auth.
  #[arg(long, env = "QUIZZ_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List your quizzes.
  List,
  /// Print a quiz with its questions and answers.
  Show { id: i64 },
  /// Create a quiz from a JSON file.
  Create { file: PathBuf },
  /// Print a quiz as an editable JSON payload for `update`.
  Export { id: i64 },
  /// Replace a quiz with the contents of a JSON file.
  Update { id: i64, file: PathBuf },
  /// Delete one of your quizzes.
  Delete { id: i64 },
  /// Take a quiz interactively and save the result.
  Take { id: i64 },
  /// Show dashboard numbers and daily activity.
  Metrics,
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Optional TOML file with `url`, `username` and `password`.
#[derive(Deserialize, Default)]
struct ConfigFile {
  url:      Option<String>,
  username: Option<String>,
  password: Option<String>,
}

impl ConfigFile {
  fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
  }
}

/// A flag (or its env var) wins over the file; blank values count as unset.
fn pick(flag: Option<String>, file: Option<String>) -> Option<String> {
  flag.into_iter().chain(file).find(|v| !v.trim().is_empty())
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file = match &args.config {
    Some(path) => ConfigFile::load(path)?,
    None => ConfigFile::default(),
  };
  let api_config = ApiConfig {
    base_url: pick(args.url, file.url).unwrap_or_else(|| "http://localhost:3000".into()),
    username: pick(args.user, file.username).unwrap_or_default(),
    password: pick(args.password, file.password).unwrap_or_default(),
  };

  let client = ApiClient::new(api_config).context("failed to build HTTP client")?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::List => {
      let quizzes = client.list_quizzes().await?;
      if quizzes.is_empty() {
        println!("No quizzes yet.");
      }
      for q in quizzes {
        println!("{:>5}  {}  ({} questions)", q.id, q.name, q.question_count);
      }
    }

    Command::Show { id } => {
      let quiz = client.get_quiz(QuizId(id)).await?;
      println!("{}", quiz.name);
      if let Some(d) = &quiz.description {
        println!("{d}");
      }
      for q in &quiz.questions {
        println!("\n{}. [{}] {}", q.order + 1, q.content.kind(), q.question_text);
        if let QuestionContent::Listen { audio_text, .. } = &q.content {
          println!("   audio: {audio_text}");
        }
        for a in q.content.answers() {
          let mark = if a.is_correct { "*" } else { " " };
          println!("   {mark} {}", a.answer_text);
        }
      }
    }

    Command::Create { file } => {
      let quiz: NewQuiz = read_json(&file)?;
      let id = client.create_quiz(&quiz).await?;
      println!("Created quiz {id}");
    }

    Command::Export { id } => {
      let quiz = client.get_quiz(QuizId(id)).await?;
      println!("{}", serde_json::to_string_pretty(&QuizUpdate::from(&quiz))?);
    }

    Command::Update { id, file } => {
      let update: QuizUpdate = read_json(&file)?;
      client.update_quiz(QuizId(id), &update).await?;
      println!("Updated quiz {id}");
    }

    Command::Delete { id } => {
      client.delete_quiz(QuizId(id)).await?;
      println!("Deleted quiz {id}");
    }

    Command::Take { id } => {
      let quiz = client.get_quiz(QuizId(id)).await?;
      let stdin = io::stdin();
      let submission =
        take::run(&quiz, client, &mut stdin.lock(), &mut io::stdout()).await?;
      if let Some(submission) = submission {
        let sid = client
          .save_submission(quiz.id, &submission)
          .await
          .context("saving your answers")?;
        println!("Saved as submission {sid}");
      }
    }

    Command::Metrics => {
      let m = client.metrics().await?;
      println!("Quizzes:     {}", m.quiz_count);
      println!("Questions:   {}", m.question_count);
      println!("Submissions: {}", m.submission_count);
      match m.average_score {
        Some(avg) => println!("Avg. score:  {avg:.2}"),
        None => println!("Avg. score:  -"),
      }
      let days = client.activity().await?;
      if !days.is_empty() {
        println!();
      }
      for day in days {
        println!("{}  {}", day.date, "#".repeat(day.submissions as usize));
      }
    }
  }
  Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
