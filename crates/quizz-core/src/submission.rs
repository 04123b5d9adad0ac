//! Submission types (one finished attempt at a quiz) and the dashboard read
//! models derived from them.
//!
//! Submissions are write-once history: nothing ever updates them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AnswerId, QuestionId, QuizId, SubmissionId, UserAnswerId, UserId};

// ─── Input ───────────────────────────────────────────────────────────────────

/// The record of one answered question, collected during an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserAnswer {
  pub question_id:        QuestionId,
  /// The chosen option of a multiple-choice question.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub selected_answer_id: Option<AnswerId>,
  /// The typed response to a written or listening question.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_answer_text:   Option<String>,
  pub is_correct:         bool,
}

/// Input to [`crate::store::QuizStore::save_submission`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
  pub score:        u32,
  #[serde(default)]
  pub user_answers: Vec<NewUserAnswer>,
}

// ─── Stored ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id:         SubmissionId,
  pub quiz_id:    QuizId,
  pub user_id:    UserId,
  pub score:      u32,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
}

/// A stored per-question answer.
///
/// The question and selected-answer references become `None` when a later
/// edit of the quiz deletes the row they pointed at; the recorded text and
/// correctness are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
  pub id:                 UserAnswerId,
  pub question_id:        Option<QuestionId>,
  pub selected_answer_id: Option<AnswerId>,
  pub user_answer_text:   Option<String>,
  pub is_correct:         bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
  #[serde(flatten)]
  pub submission:   Submission,
  pub user_answers: Vec<UserAnswer>,
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Aggregates over the quizzes a user owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetrics {
  pub quiz_count:       u32,
  pub question_count:   u32,
  /// Submissions made against the user's quizzes, by anyone.
  pub submission_count: u32,
  /// `None` when there are no submissions.
  pub average_score:    Option<f64>,
}

/// Submissions against a user's quizzes on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
  pub date:        NaiveDate,
  pub submissions: u32,
}
