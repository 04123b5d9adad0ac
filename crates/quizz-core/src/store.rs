//! The `QuizStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `quizz-store-sqlite`).
//! Higher layers (`quizz-api`, `quizz-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Every multi-row mutation is atomic: either all of its writes commit or none
//! do. Operations on user-owned data take the caller's [`Principal`]
//! explicitly and check ownership before touching any row; a quiz the
//! principal does not own is reported as not found.

use std::future::Future;

use crate::{
  Classify,
  id::{Principal, QuizId, SubmissionId, UserId},
  quiz::{NewQuiz, QuizDetail, QuizSummary, QuizUpdate},
  submission::{DailyActivity, NewSubmission, SubmissionDetail, UserMetrics},
};

/// Abstraction over a Quizz storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait QuizStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert the user row if missing; a `Some` name replaces the stored one.
  fn ensure_user(
    &self,
    user_id: UserId,
    name: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Quizzes ───────────────────────────────────────────────────────────

  /// Persist a complete new quiz owned by `principal`; question order is
  /// list position.
  fn create_quiz<'a>(
    &'a self,
    principal: &'a Principal,
    quiz: NewQuiz,
  ) -> impl Future<Output = Result<QuizId, Self::Error>> + Send + 'a;

  /// The principal's quizzes with their question counts.
  fn list_quizzes<'a>(
    &'a self,
    principal: &'a Principal,
  ) -> impl Future<Output = Result<Vec<QuizSummary>, Self::Error>> + Send + 'a;

  /// Quiz → questions ordered by `order` → answers. Returns `None` if the
  /// quiz does not exist.
  fn get_quiz_detail(
    &self,
    quiz_id: QuizId,
  ) -> impl Future<Output = Result<Option<QuizDetail>, Self::Error>> + Send + '_;

  /// Make the stored quiz match `update` exactly.
  ///
  /// Questions and answers are diffed by identifier presence: stored rows
  /// missing from the payload are deleted, rows with a known id are updated in
  /// place, rows without an id are inserted.
  fn update_quiz<'a>(
    &'a self,
    principal: &'a Principal,
    quiz_id: QuizId,
    update: QuizUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete the quiz with its questions, answers and submissions.
  fn delete_quiz<'a>(
    &'a self,
    principal: &'a Principal,
    quiz_id: QuizId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Submissions ───────────────────────────────────────────────────────

  /// Persist one finished attempt by `principal` at any existing quiz.
  fn save_submission<'a>(
    &'a self,
    principal: &'a Principal,
    quiz_id: QuizId,
    submission: NewSubmission,
  ) -> impl Future<Output = Result<SubmissionId, Self::Error>> + Send + 'a;

  /// Visible to the submitter and to the quiz owner; `None` otherwise.
  fn get_submission<'a>(
    &'a self,
    principal: &'a Principal,
    submission_id: SubmissionId,
  ) -> impl Future<Output = Result<Option<SubmissionDetail>, Self::Error>> + Send + 'a;

  // ── Dashboard ─────────────────────────────────────────────────────────

  fn user_metrics<'a>(
    &'a self,
    principal: &'a Principal,
  ) -> impl Future<Output = Result<UserMetrics, Self::Error>> + Send + 'a;

  /// Submission counts per UTC day over the principal's quizzes, oldest
  /// first.
  fn activity<'a>(
    &'a self,
    principal: &'a Principal,
  ) -> impl Future<Output = Result<Vec<DailyActivity>, Self::Error>> + Send + 'a;
}
