//! The grading collaborator: an external text-judgment service that decides
//! whether a free-text answer matches the expected one.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::Classify;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
  pub question_text:       String,
  pub correct_answer_text: String,
  pub user_answer:         String,
}

impl GradeRequest {
  /// All three fields must carry text.
  pub fn is_complete(&self) -> bool {
    [&self.question_text, &self.correct_answer_text, &self.user_answer]
      .iter()
      .all(|s| !s.trim().is_empty())
  }
}

/// The service's verdict. Treated as untrusted, best-effort input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
  pub is_correct: bool,
  #[serde(default)]
  pub score:      f64,
  #[serde(default)]
  pub feedback:   String,
}

impl Grade {
  pub fn incorrect(feedback: impl Into<String>) -> Self {
    Self { is_correct: false, score: 0.0, feedback: feedback.into() }
  }
}

/// Abstraction over a grading backend.
pub trait Grader: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// One request/response round trip; implementations do not retry.
  fn grade<'a>(
    &'a self,
    request: &'a GradeRequest,
  ) -> impl Future<Output = Result<Grade, Self::Error>> + Send + 'a;
}

/// Grade `request`, degrading any failure to an incorrect verdict so that a
/// quiz attempt is never interrupted by the grading service.
pub async fn grade_or_incorrect<G: Grader>(grader: &G, request: &GradeRequest) -> Grade {
  match grader.grade(request).await {
    Ok(grade) => grade,
    Err(e) => Grade::incorrect(format!("answer could not be graded: {e}")),
  }
}
