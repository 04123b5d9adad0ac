//! [`SqliteStore`], the SQLite implementation of [`QuizStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};
use tracing::{debug, info};

use quizz_core::{
  id::{Principal, QuizId, SubmissionId, UserId},
  quiz::{NewQuiz, QuizDetail, QuizSummary, QuizUpdate},
  store::QuizStore,
  submission::{DailyActivity, NewSubmission, SubmissionDetail, UserMetrics},
};

use crate::{
  Result,
  encode::{
    RawAnswer, RawQuestion, RawQuiz, RawSubmission, RawUserAnswer, encode_dt, into_daily_activity,
    into_quiz_detail, into_submission_detail,
  },
  schema::SCHEMA,
  write,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quizz store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn to_u32(n: i64) -> u32 { u32::try_from(n).unwrap_or(u32::MAX) }

// ─── QuizStore impl ──────────────────────────────────────────────────────────

impl QuizStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn ensure_user(&self, user_id: UserId, name: Option<String>) -> Result<()> {
    let now = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(user_id) DO UPDATE SET name = COALESCE(excluded.name, users.name)",
          params![user_id.0, name, now],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Quizzes ───────────────────────────────────────────────────────────────

  async fn create_quiz(&self, principal: &Principal, quiz: NewQuiz) -> Result<QuizId> {
    let user_id = principal.user_id.0.clone();
    let now = encode_dt(Utc::now());
    let question_count = quiz.questions.len();

    let quiz_id = self
      .conn
      .call(move |conn| Ok(write::create_quiz(conn, &user_id, &now, &quiz)))
      .await??;

    info!(%quiz_id, user = %principal.user_id, question_count, "quiz created");
    Ok(quiz_id)
  }

  async fn list_quizzes(&self, principal: &Principal) -> Result<Vec<QuizSummary>> {
    let user_id = principal.user_id.0.clone();

    let quizzes = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT q.id, q.name, q.description,
                  (SELECT COUNT(*) FROM questions WHERE quiz_id = q.id)
           FROM quizzes q
           WHERE q.user_id = ?1
           ORDER BY q.id",
        )?;
        let rows = stmt
          .query_map(params![user_id], |row| {
            Ok(QuizSummary {
              id:             QuizId(row.get(0)?),
              name:           row.get(1)?,
              description:    row.get(2)?,
              question_count: to_u32(row.get(3)?),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(user = %principal.user_id, count = quizzes.len(), "listed quizzes");
    Ok(quizzes)
  }

  async fn get_quiz_detail(&self, quiz_id: QuizId) -> Result<Option<QuizDetail>> {
    let raw = self
      .conn
      .call(move |conn| {
        let quiz = conn
          .query_row(
            "SELECT id, name, description FROM quizzes WHERE id = ?1",
            params![quiz_id.0],
            |row| {
              Ok(RawQuiz {
                id:          row.get(0)?,
                name:        row.get(1)?,
                description: row.get(2)?,
              })
            },
          )
          .optional()?;
        let Some(quiz) = quiz else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          r#"SELECT id, question_text, type, audio_text, "order"
             FROM questions
             WHERE quiz_id = ?1
             ORDER BY "order", id"#,
        )?;
        let questions = stmt
          .query_map(params![quiz_id.0], |row| {
            Ok(RawQuestion {
              id:            row.get(0)?,
              question_text: row.get(1)?,
              kind:          row.get(2)?,
              audio_text:    row.get(3)?,
              order:         row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT a.id, a.question_id, a.answer_text, a.is_correct
           FROM question_answers a
           JOIN questions q ON q.id = a.question_id
           WHERE q.quiz_id = ?1
           ORDER BY a.id",
        )?;
        let answers = stmt
          .query_map(params![quiz_id.0], |row| {
            Ok(RawAnswer {
              id:          row.get(0)?,
              question_id: row.get(1)?,
              answer_text: row.get(2)?,
              is_correct:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((quiz, questions, answers)))
      })
      .await?;

    debug!(%quiz_id, found = raw.is_some(), "read quiz detail");
    raw
      .map(|(quiz, questions, answers)| into_quiz_detail(quiz, questions, answers))
      .transpose()
  }

  async fn update_quiz(
    &self,
    principal: &Principal,
    quiz_id: QuizId,
    update: QuizUpdate,
  ) -> Result<()> {
    let user_id = principal.user_id.0.clone();
    let question_count = update.questions.len();

    self
      .conn
      .call(move |conn| Ok(write::update_quiz(conn, &user_id, quiz_id, &update)))
      .await??;

    info!(%quiz_id, user = %principal.user_id, question_count, "quiz updated");
    Ok(())
  }

  async fn delete_quiz(&self, principal: &Principal, quiz_id: QuizId) -> Result<()> {
    let user_id = principal.user_id.0.clone();

    self
      .conn
      .call(move |conn| Ok(write::delete_quiz(conn, &user_id, quiz_id)))
      .await??;

    info!(%quiz_id, user = %principal.user_id, "quiz deleted");
    Ok(())
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn save_submission(
    &self,
    principal: &Principal,
    quiz_id: QuizId,
    submission: NewSubmission,
  ) -> Result<SubmissionId> {
    let user_id = principal.user_id.0.clone();
    let now = encode_dt(Utc::now());
    let score = submission.score;

    let submission_id = self
      .conn
      .call(move |conn| Ok(write::save_submission(conn, &user_id, &now, quiz_id, &submission)))
      .await??;

    info!(%submission_id, %quiz_id, user = %principal.user_id, score, "submission saved");
    Ok(submission_id)
  }

  async fn get_submission(
    &self,
    principal: &Principal,
    submission_id: SubmissionId,
  ) -> Result<Option<SubmissionDetail>> {
    let user_id = principal.user_id.0.clone();

    let raw = self
      .conn
      .call(move |conn| {
        // Visible to whoever submitted it and to the quiz owner.
        let submission = conn
          .query_row(
            "SELECT s.id, s.quizz_id, s.user_id, s.score, s.created_at
             FROM quizz_submissions s
             JOIN quizzes q ON q.id = s.quizz_id
             WHERE s.id = ?1 AND (s.user_id = ?2 OR q.user_id = ?2)",
            params![submission_id.0, user_id],
            |row| {
              Ok(RawSubmission {
                id:         row.get(0)?,
                quiz_id:    row.get(1)?,
                user_id:    row.get(2)?,
                score:      row.get(3)?,
                created_at: row.get(4)?,
              })
            },
          )
          .optional()?;
        let Some(submission) = submission else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT id, question_id, selected_answer_id, user_answer_text, is_correct
           FROM user_answers
           WHERE submission_id = ?1
           ORDER BY id",
        )?;
        let answers = stmt
          .query_map(params![submission_id.0], |row| {
            Ok(RawUserAnswer {
              id:                 row.get(0)?,
              question_id:        row.get(1)?,
              selected_answer_id: row.get(2)?,
              user_answer_text:   row.get(3)?,
              is_correct:         row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((submission, answers)))
      })
      .await?;

    debug!(%submission_id, found = raw.is_some(), "read submission");
    raw
      .map(|(submission, answers)| into_submission_detail(submission, answers))
      .transpose()
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  async fn user_metrics(&self, principal: &Principal) -> Result<UserMetrics> {
    let user_id = principal.user_id.0.clone();

    let metrics = self
      .conn
      .call(move |conn| {
        let (quiz_count, question_count): (i64, i64) = conn.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM((SELECT COUNT(*) FROM questions WHERE quiz_id = q.id)), 0)
           FROM quizzes q
           WHERE q.user_id = ?1",
          params![user_id],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let (submission_count, average_score): (i64, Option<f64>) = conn.query_row(
          "SELECT COUNT(*), AVG(s.score)
           FROM quizz_submissions s
           JOIN quizzes q ON q.id = s.quizz_id
           WHERE q.user_id = ?1",
          params![user_id],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(UserMetrics {
          quiz_count: to_u32(quiz_count),
          question_count: to_u32(question_count),
          submission_count: to_u32(submission_count),
          average_score,
        })
      })
      .await?;

    debug!(user = %principal.user_id, ?metrics, "computed metrics");
    Ok(metrics)
  }

  async fn activity(&self, principal: &Principal) -> Result<Vec<DailyActivity>> {
    let user_id = principal.user_id.0.clone();

    let days: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        // created_at is RFC 3339 UTC, so its first ten characters are the day.
        let mut stmt = conn.prepare(
          "SELECT substr(s.created_at, 1, 10) AS day, COUNT(*)
           FROM quizz_submissions s
           JOIN quizzes q ON q.id = s.quizz_id
           WHERE q.user_id = ?1
           GROUP BY day
           ORDER BY day",
        )?;
        let rows = stmt
          .query_map(params![user_id], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    days.into_iter().map(into_daily_activity).collect()
  }
}
