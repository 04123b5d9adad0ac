//! Handlers for `/quizzes` endpoints.
//!
//! | Method   | Path            | Notes |
//! |----------|-----------------|-------|
//! | `GET`    | `/quizzes`      | The caller's quizzes with question counts |
//! | `POST`   | `/quizzes`      | Body: [`NewQuiz`]; 201 `{"id": n}` |
//! | `GET`    | `/quizzes/{id}` | 404 if not found |
//! | `PUT`    | `/quizzes/{id}` | Body: [`QuizUpdate`], the complete desired state |
//! | `DELETE` | `/quizzes/{id}` | Owner only |

use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use quizz_core::{
  grade::Grader,
  id::{Principal, QuizId},
  quiz::{NewQuiz, QuizDetail, QuizSummary, QuizUpdate},
  store::QuizStore,
};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError, extract::ApiJson};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /quizzes`
pub async fn list<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<QuizSummary>>, ApiError> {
  let quizzes = state.store.list_quizzes(&principal).await.map_err(ApiError::classify)?;
  Ok(Json(quizzes))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /quizzes`
pub async fn create<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
  ApiJson(body): ApiJson<NewQuiz>,
) -> Result<impl IntoResponse, ApiError> {
  let id = state.store.create_quiz(&principal, body).await.map_err(ApiError::classify)?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /quizzes/{id}`
pub async fn get_one<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Path(id): Path<QuizId>,
) -> Result<Json<QuizDetail>, ApiError> {
  let quiz = state
    .store
    .get_quiz_detail(id)
    .await
    .map_err(ApiError::classify)?
    .ok_or_else(|| ApiError::NotFound(format!("quiz {id} not found")))?;
  Ok(Json(quiz))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /quizzes/{id}`
pub async fn update<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
  Path(id): Path<QuizId>,
  ApiJson(body): ApiJson<QuizUpdate>,
) -> Result<Json<Value>, ApiError> {
  state.store.update_quiz(&principal, id, body).await.map_err(ApiError::classify)?;
  Ok(Json(json!({ "success": true })))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /quizzes/{id}`
pub async fn delete_one<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
  Path(id): Path<QuizId>,
) -> Result<Json<Value>, ApiError> {
  state.store.delete_quiz(&principal, id).await.map_err(ApiError::classify)?;
  Ok(Json(json!({ "success": true })))
}
