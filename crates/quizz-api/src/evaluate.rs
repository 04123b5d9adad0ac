//! `POST /evaluate`: grade a free-text answer with the configured grader.
//!
//! Unlike the quiz-taking flow, this endpoint reports grader failures to the
//! caller (502) instead of degrading them; the client decides what a failed
//! grade means.

use axum::{Json, extract::State};
use quizz_core::{
  grade::{Grade, GradeRequest, Grader},
  store::QuizStore,
};
use tracing::warn;

use crate::{ApiState, error::ApiError, extract::ApiJson};

pub async fn handler<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  ApiJson(body): ApiJson<GradeRequest>,
) -> Result<Json<Grade>, ApiError> {
  if !body.is_complete() {
    return Err(ApiError::BadRequest(
      "questionText, correctAnswerText and userAnswer are required".into(),
    ));
  }

  let grade = state.grader.grade(&body).await.map_err(|e| {
    warn!(error = %e, "grading failed");
    ApiError::classify(e)
  })?;
  Ok(Json(grade))
}
