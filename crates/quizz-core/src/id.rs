//! Identifier newtypes.
//!
//! Row identities are database-generated integers; wrapping them keeps a
//! question id from being passed where an answer id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }
  };
}

row_id!(QuizId);
row_id!(QuestionId);
row_id!(AnswerId);
row_id!(SubmissionId);
row_id!(
  /// Identity of one stored per-question answer inside a submission.
  UserAnswerId
);

/// Opaque user identity issued by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// The authenticated caller of a server-side operation.
///
/// Every store method that reads or writes user-owned data takes a principal
/// explicitly; there is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
  pub user_id: UserId,
}

impl Principal {
  pub fn new(user_id: impl Into<String>) -> Self {
    Self { user_id: UserId(user_id.into()) }
  }
}
