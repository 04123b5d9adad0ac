//! Handlers for submission endpoints.
//!
//! | Method | Path                        | Notes |
//! |--------|-----------------------------|-------|
//! | `POST` | `/quizzes/{id}/submissions` | Body: [`NewSubmission`]; 201 `{"id": n}` |
//! | `GET`  | `/submissions/{id}`         | Submitter or quiz owner; 404 otherwise |

use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use quizz_core::{
  grade::Grader,
  id::{Principal, QuizId, SubmissionId},
  store::QuizStore,
  submission::{NewSubmission, SubmissionDetail},
};
use serde_json::json;

use crate::{ApiState, error::ApiError, extract::ApiJson};

/// `POST /quizzes/{id}/submissions`
pub async fn create<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
  Path(quiz_id): Path<QuizId>,
  ApiJson(body): ApiJson<NewSubmission>,
) -> Result<impl IntoResponse, ApiError> {
  let id = state
    .store
    .save_submission(&principal, quiz_id, body)
    .await
    .map_err(ApiError::classify)?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `GET /submissions/{id}`
pub async fn get_one<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
  Path(id): Path<SubmissionId>,
) -> Result<Json<SubmissionDetail>, ApiError> {
  let submission = state
    .store
    .get_submission(&principal, id)
    .await
    .map_err(ApiError::classify)?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;
  Ok(Json(submission))
}
