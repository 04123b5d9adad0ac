//! Error type for `quizz-store-sqlite`.

use quizz_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] quizz_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A statement failed inside a multi-step write; the transaction was rolled
  /// back.
  #[error("transaction failed: {0}")]
  Transaction(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Transaction(_) => ErrorKind::Transaction,
      Error::Database(_) | Error::DateParse(_) => ErrorKind::Internal,
    }
  }
}
