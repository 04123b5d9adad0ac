//! JSON REST API for Quizz.
//!
//! Exposes an axum [`Router`] backed by any [`quizz_core::store::QuizStore`]
//! and [`quizz_core::grade::Grader`]. Authentication, TLS and transport
//! concerns are the caller's responsibility: every handler expects the
//! authenticated [`quizz_core::id::Principal`] as a request extension.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quizz_api::api_router(store.clone(), grader.clone()))
//! ```

pub mod dashboard;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod quizzes;
pub mod submissions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use quizz_core::{grade::Grader, store::QuizStore};

pub use error::ApiError;

/// Shared state of the API handlers.
pub struct ApiState<S, G> {
  pub store:  Arc<S>,
  pub grader: Arc<G>,
}

// Derived `Clone` would require `S: Clone + G: Clone`.
impl<S, G> Clone for ApiState<S, G> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), grader: Arc::clone(&self.grader) }
  }
}

/// Build a fully-materialised API router for `store` and `grader`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(store: Arc<S>, grader: Arc<G>) -> Router<()>
where
  S: QuizStore + 'static,
  G: Grader + 'static,
{
  Router::new()
    // Quizzes
    .route("/quizzes", get(quizzes::list::<S, G>).post(quizzes::create::<S, G>))
    .route(
      "/quizzes/{id}",
      get(quizzes::get_one::<S, G>)
        .put(quizzes::update::<S, G>)
        .delete(quizzes::delete_one::<S, G>),
    )
    // Submissions
    .route("/quizzes/{id}/submissions", post(submissions::create::<S, G>))
    .route("/submissions/{id}", get(submissions::get_one::<S, G>))
    // Dashboard
    .route("/metrics", get(dashboard::metrics::<S, G>))
    .route("/activity", get(dashboard::activity::<S, G>))
    // Grading
    .route("/evaluate", post(evaluate::handler::<S, G>))
    .with_state(ApiState { store, grader })
}
