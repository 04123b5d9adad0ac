//! Request body extractor whose rejections use the API error envelope.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::ApiError;

/// `axum::Json`, except a body that fails to parse (bad syntax, missing
/// field, unknown question type) is a 400 `{"error": msg}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}
