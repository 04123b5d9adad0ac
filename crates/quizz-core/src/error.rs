//! Error types for `quizz-core`.

use thiserror::Error;

use crate::id::{QuizId, SubmissionId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("quiz not found: {0}")]
  QuizNotFound(QuizId),

  #[error("submission not found: {0}")]
  SubmissionNotFound(SubmissionId),

  #[error("unknown question type: {0:?}")]
  UnknownQuestionKind(String),

  /// Malformed payload: missing field, bad ordering, empty text, etc.
  #[error("invalid payload: {0}")]
  Validation(String),

  /// A referenced row belongs to a different parent than the payload claims.
  #[error("constraint violated: {0}")]
  Constraint(String),

  #[error("external service error: {0}")]
  ExternalService(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Backend-independent category of a failure. Outer layers (the HTTP API, the
/// CLI) decide how to surface an error from this alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Validation,
  Constraint,
  /// Storage failure during a multi-step write; nothing was committed.
  Transaction,
  ExternalService,
  Internal,
}

/// Implemented by every error type that crosses a crate seam.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::QuizNotFound(_) | Error::SubmissionNotFound(_) => ErrorKind::NotFound,
      Error::UnknownQuestionKind(_) | Error::Validation(_) => ErrorKind::Validation,
      Error::Constraint(_) => ErrorKind::Constraint,
      Error::ExternalService(_) => ErrorKind::ExternalService,
    }
  }
}

impl Classify for std::convert::Infallible {
  fn kind(&self) -> ErrorKind { match *self {} }
}
