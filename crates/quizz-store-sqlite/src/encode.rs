//! Raw row structs and their conversion into `quizz-core` read models.
//!
//! Rows are pulled out of SQLite inside a `tokio_rusqlite` call as plain
//! column values and assembled into domain types afterwards, on the async
//! side. Timestamps are stored as RFC 3339 strings.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use quizz_core::{
  id::{AnswerId, QuestionId, QuizId, SubmissionId, UserAnswerId, UserId},
  quiz::{Answer, Question, QuestionContent, QuestionKind, QuizDetail},
  submission::{DailyActivity, Submission, SubmissionDetail, UserAnswer},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Quiz detail ─────────────────────────────────────────────────────────────

pub struct RawQuiz {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
}

pub struct RawQuestion {
  pub id:            i64,
  pub question_text: String,
  pub kind:          String,
  pub audio_text:    Option<String>,
  pub order:         i64,
}

pub struct RawAnswer {
  pub id:          i64,
  pub question_id: i64,
  pub answer_text: String,
  pub is_correct:  bool,
}

/// Nest answers under their questions. `questions` must already be sorted by
/// `order`; answers keep the order they arrive in.
pub fn into_quiz_detail(
  quiz: RawQuiz,
  questions: Vec<RawQuestion>,
  answers: Vec<RawAnswer>,
) -> Result<QuizDetail> {
  let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
  for a in answers {
    by_question.entry(a.question_id).or_default().push(Answer {
      id:          AnswerId(a.id),
      answer_text: a.answer_text,
      is_correct:  a.is_correct,
    });
  }

  let questions = questions
    .into_iter()
    .map(|q| {
      let kind = QuestionKind::parse(&q.kind)?;
      let answers = by_question.remove(&q.id).unwrap_or_default();
      Ok(Question {
        id:            QuestionId(q.id),
        question_text: q.question_text,
        order:         decode_u32("question order", q.order)?,
        content:       QuestionContent::from_parts(kind, q.audio_text, answers)?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(QuizDetail {
    id: QuizId(quiz.id),
    name: quiz.name,
    description: quiz.description,
    questions,
  })
}

/// Non-negative integer columns; anything else is a corrupt row.
fn decode_u32(column: &str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| {
    Error::Core(quizz_core::Error::Constraint(format!(
      "stored {column} {value} is out of range"
    )))
  })
}

// ─── Submissions ─────────────────────────────────────────────────────────────

pub struct RawSubmission {
  pub id:         i64,
  pub quiz_id:    i64,
  pub user_id:    String,
  pub score:      i64,
  pub created_at: String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      id:         SubmissionId(self.id),
      quiz_id:    QuizId(self.quiz_id),
      user_id:    UserId(self.user_id),
      score:      decode_u32("score", self.score)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawUserAnswer {
  pub id:                 i64,
  pub question_id:        Option<i64>,
  pub selected_answer_id: Option<i64>,
  pub user_answer_text:   Option<String>,
  pub is_correct:         bool,
}

impl From<RawUserAnswer> for UserAnswer {
  fn from(raw: RawUserAnswer) -> Self {
    UserAnswer {
      id:                 UserAnswerId(raw.id),
      question_id:        raw.question_id.map(QuestionId),
      selected_answer_id: raw.selected_answer_id.map(AnswerId),
      user_answer_text:   raw.user_answer_text,
      is_correct:         raw.is_correct,
    }
  }
}

pub fn into_submission_detail(
  submission: RawSubmission,
  answers: Vec<RawUserAnswer>,
) -> Result<SubmissionDetail> {
  Ok(SubmissionDetail {
    submission:   submission.into_submission()?,
    user_answers: answers.into_iter().map(UserAnswer::from).collect(),
  })
}

// ─── Activity ────────────────────────────────────────────────────────────────

pub fn into_daily_activity((day, count): (String, i64)) -> Result<DailyActivity> {
  Ok(DailyActivity {
    date:        decode_date(&day)?,
    submissions: u32::try_from(count).unwrap_or(u32::MAX),
  })
}
