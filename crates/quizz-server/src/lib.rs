//! HTTP server for Quizz.
//!
//! Wraps the JSON API from `quizz-api` with HTTP Basic authentication,
//! request tracing and the production grader.

pub mod auth;
pub mod error;
pub mod grader;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use quizz_core::{grade::Grader, store::QuizStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, Credential, require_auth};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `QUIZZ_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub accounts:   Vec<AccountConfig>,
  #[serde(default)]
  pub grader:     GraderConfig,
}

#[derive(Deserialize, Clone)]
pub struct AccountConfig {
  pub username:      String,
  pub password_hash: String,
  pub display_name:  Option<String>,
}

/// Settings of the OpenAI-compatible grading endpoint.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct GraderConfig {
  pub base_url:     String,
  pub api_key:      String,
  pub model:        String,
  pub timeout_secs: u64,
}

impl Default for GraderConfig {
  fn default() -> Self {
    Self {
      base_url:     "https://api.openai.com/v1".into(),
      api_key:      String::new(),
      model:        "gpt-4o".into(),
      timeout_secs: 20,
    }
  }
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 3000 }

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      accounts: self
        .accounts
        .iter()
        .map(|a| Credential {
          username:      a.username.clone(),
          password_hash: a.password_hash.clone(),
        })
        .collect(),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Everything the router needs.
pub struct AppState<S, G> {
  pub store:  Arc<S>,
  pub grader: Arc<G>,
  pub auth:   Arc<AuthConfig>,
}

impl<S, G> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      grader: Arc::clone(&self.grader),
      auth:   Arc::clone(&self.auth),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router: `/api/*` behind Basic auth, with
/// request tracing on everything.
pub fn router<S, G>(state: AppState<S, G>) -> Router
where
  S: QuizStore + 'static,
  G: Grader + 'static,
{
  let api = quizz_api::api_router(state.store, state.grader)
    .layer(middleware::from_fn_with_state(state.auth, require_auth));

  Router::new().nest("/api", api).layer(TraceLayer::new_for_http())
}
