//! Dashboard reads over the caller's quizzes.

use axum::{Extension, Json, extract::State};
use quizz_core::{
  grade::Grader,
  id::Principal,
  store::QuizStore,
  submission::{DailyActivity, UserMetrics},
};

use crate::{ApiState, error::ApiError};

/// `GET /metrics`
pub async fn metrics<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
) -> Result<Json<UserMetrics>, ApiError> {
  let metrics = state.store.user_metrics(&principal).await.map_err(ApiError::classify)?;
  Ok(Json(metrics))
}

/// `GET /activity`: submissions per UTC day, oldest first.
pub async fn activity<S: QuizStore, G: Grader>(
  State(state): State<ApiState<S, G>>,
  Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<DailyActivity>>, ApiError> {
  let days = state.store.activity(&principal).await.map_err(ApiError::classify)?;
  Ok(Json(days))
}
