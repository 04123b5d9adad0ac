//! Multi-row writes.
//!
//! Each public function runs on the connection thread inside one `call` and
//! opens its own transaction. Returning early with `?` drops the transaction
//! uncommitted, which rolls every statement back.

use rusqlite::{Connection, OptionalExtension as _, Transaction, params};

use quizz_core::{
  Error as CoreError,
  id::{AnswerId, QuestionId, QuizId, SubmissionId},
  quiz::{AnswerDraft, AnswerFields, NewQuiz, QuestionContent, QuestionDraft, QuizUpdate},
  reconcile,
  submission::NewSubmission,
};

use crate::Result;

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// Insert the user row on first use.
fn touch_user(tx: &Transaction<'_>, user_id: &str, now: &str) -> Result<()> {
  tx.execute(
    "INSERT INTO users (user_id, name, created_at) VALUES (?1, NULL, ?2)
     ON CONFLICT(user_id) DO NOTHING",
    params![user_id, now],
  )?;
  Ok(())
}

/// A quiz owned by someone else is indistinguishable from a missing one.
fn check_owner(tx: &Transaction<'_>, quiz_id: QuizId, user_id: &str) -> Result<()> {
  let owner: Option<String> = tx
    .query_row("SELECT user_id FROM quizzes WHERE id = ?1", params![quiz_id.0], |r| r.get(0))
    .optional()?;
  match owner {
    Some(owner) if owner == user_id => Ok(()),
    _ => Err(CoreError::QuizNotFound(quiz_id).into()),
  }
}

fn child_ids<Id>(
  tx: &Transaction<'_>,
  sql: &str,
  parent: i64,
  wrap: fn(i64) -> Id,
) -> Result<Vec<Id>> {
  let mut stmt = tx.prepare(sql)?;
  let ids = stmt
    .query_map(params![parent], |r| r.get::<_, i64>(0))?
    .map(|id| id.map(wrap))
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(ids)
}

fn insert_question<A>(
  tx: &Transaction<'_>,
  quiz_id: QuizId,
  question_text: &str,
  order: u32,
  content: &QuestionContent<A>,
) -> Result<QuestionId> {
  tx.execute(
    r#"INSERT INTO questions (quiz_id, question_text, type, audio_text, "order")
       VALUES (?1, ?2, ?3, ?4, ?5)"#,
    params![
      quiz_id.0,
      question_text,
      content.kind().as_str(),
      content.audio_text(),
      order,
    ],
  )?;
  Ok(QuestionId(tx.last_insert_rowid()))
}

fn insert_answers<A: AnswerFields>(
  tx: &Transaction<'_>,
  question_id: QuestionId,
  answers: &[&A],
) -> Result<()> {
  if answers.is_empty() {
    return Ok(());
  }
  let mut stmt = tx.prepare(
    "INSERT INTO question_answers (question_id, answer_text, is_correct) VALUES (?1, ?2, ?3)",
  )?;
  for a in answers {
    stmt.execute(params![question_id.0, a.answer_text(), a.is_correct()])?;
  }
  Ok(())
}

fn delete_question(tx: &Transaction<'_>, id: QuestionId) -> Result<()> {
  tx.execute("DELETE FROM question_answers WHERE question_id = ?1", params![id.0])?;
  tx.execute("DELETE FROM questions WHERE id = ?1", params![id.0])?;
  Ok(())
}

// ─── Create ──────────────────────────────────────────────────────────────────

pub fn create_quiz(
  conn: &mut Connection,
  user_id: &str,
  now: &str,
  quiz: &NewQuiz,
) -> Result<QuizId> {
  quiz.validate()?;

  let tx = conn.transaction()?;
  touch_user(&tx, user_id, now)?;
  tx.execute(
    "INSERT INTO quizzes (name, description, user_id) VALUES (?1, ?2, ?3)",
    params![quiz.name, quiz.description, user_id],
  )?;
  let quiz_id = QuizId(tx.last_insert_rowid());

  for (position, q) in quiz.questions.iter().enumerate() {
    let order = u32::try_from(position)
      .map_err(|_| CoreError::Validation("too many questions".into()))?;
    let question_id = insert_question(&tx, quiz_id, &q.question_text, order, &q.content)?;
    let answers: Vec<_> = q.content.answers().iter().collect();
    insert_answers(&tx, question_id, &answers)?;
  }

  tx.commit()?;
  Ok(quiz_id)
}

// ─── Reconcile ───────────────────────────────────────────────────────────────

/// Make the stored quiz match `update`. See [`reconcile::plan`] for how rows
/// are matched.
pub fn update_quiz(
  conn: &mut Connection,
  user_id: &str,
  quiz_id: QuizId,
  update: &QuizUpdate,
) -> Result<()> {
  let tx = conn.transaction()?;
  check_owner(&tx, quiz_id, user_id)?;
  update.validate()?;

  tx.execute(
    "UPDATE quizzes SET name = ?1, description = ?2 WHERE id = ?3",
    params![update.name, update.description, quiz_id.0],
  )?;

  let stored = child_ids(
    &tx,
    "SELECT id FROM questions WHERE quiz_id = ?1 ORDER BY id",
    quiz_id.0,
    QuestionId,
  )?;
  let questions = reconcile::plan::<QuestionDraft>(&stored, &update.questions)?;

  for id in &questions.delete {
    delete_question(&tx, *id)?;
  }

  for (id, draft) in &questions.update {
    tx.execute(
      r#"UPDATE questions
         SET question_text = ?1, type = ?2, audio_text = ?3, "order" = ?4
         WHERE id = ?5"#,
      params![
        draft.question_text,
        draft.content.kind().as_str(),
        draft.content.audio_text(),
        draft.order,
        id.0,
      ],
    )?;

    let stored = child_ids(
      &tx,
      "SELECT id FROM question_answers WHERE question_id = ?1 ORDER BY id",
      id.0,
      AnswerId,
    )?;
    let answers = reconcile::plan::<AnswerDraft>(&stored, draft.content.answers())?;

    for answer_id in &answers.delete {
      tx.execute("DELETE FROM question_answers WHERE id = ?1", params![answer_id.0])?;
    }
    for (answer_id, a) in &answers.update {
      tx.execute(
        "UPDATE question_answers SET answer_text = ?1, is_correct = ?2 WHERE id = ?3",
        params![a.answer_text, a.is_correct, answer_id.0],
      )?;
    }
    insert_answers(&tx, *id, &answers.insert)?;
  }

  for draft in &questions.insert {
    // Nothing is stored under a question that does not exist yet, so any
    // answer id here is foreign.
    let answers = reconcile::plan::<AnswerDraft>(&[], draft.content.answers())?;
    let question_id =
      insert_question(&tx, quiz_id, &draft.question_text, draft.order, &draft.content)?;
    insert_answers(&tx, question_id, &answers.insert)?;
  }

  tx.commit()?;
  Ok(())
}

// ─── Delete ──────────────────────────────────────────────────────────────────

pub fn delete_quiz(conn: &mut Connection, user_id: &str, quiz_id: QuizId) -> Result<()> {
  let tx = conn.transaction()?;
  check_owner(&tx, quiz_id, user_id)?;

  tx.execute(
    "DELETE FROM user_answers
     WHERE submission_id IN (SELECT id FROM quizz_submissions WHERE quizz_id = ?1)",
    params![quiz_id.0],
  )?;
  tx.execute("DELETE FROM quizz_submissions WHERE quizz_id = ?1", params![quiz_id.0])?;
  tx.execute(
    "DELETE FROM question_answers
     WHERE question_id IN (SELECT id FROM questions WHERE quiz_id = ?1)",
    params![quiz_id.0],
  )?;
  tx.execute("DELETE FROM questions WHERE quiz_id = ?1", params![quiz_id.0])?;
  tx.execute("DELETE FROM quizzes WHERE id = ?1", params![quiz_id.0])?;

  tx.commit()?;
  Ok(())
}

// ─── Submissions ─────────────────────────────────────────────────────────────

pub fn save_submission(
  conn: &mut Connection,
  user_id: &str,
  now: &str,
  quiz_id: QuizId,
  submission: &NewSubmission,
) -> Result<SubmissionId> {
  let tx = conn.transaction()?;

  let question_count: Option<i64> = tx
    .query_row(
      "SELECT (SELECT COUNT(*) FROM questions WHERE quiz_id = q.id) FROM quizzes q WHERE q.id = ?1",
      params![quiz_id.0],
      |r| r.get(0),
    )
    .optional()?;
  let question_count = question_count.ok_or(CoreError::QuizNotFound(quiz_id))?;

  if i64::from(submission.score) > question_count {
    return Err(
      CoreError::Validation(format!(
        "score {} exceeds the quiz's {question_count} questions",
        submission.score
      ))
      .into(),
    );
  }

  for ua in &submission.user_answers {
    let in_quiz = tx
      .query_row(
        "SELECT 1 FROM questions WHERE id = ?1 AND quiz_id = ?2",
        params![ua.question_id.0, quiz_id.0],
        |_| Ok(()),
      )
      .optional()?
      .is_some();
    if !in_quiz {
      return Err(
        CoreError::Constraint(format!(
          "question {} does not belong to quiz {quiz_id}",
          ua.question_id
        ))
        .into(),
      );
    }

    if let Some(answer_id) = ua.selected_answer_id {
      let in_question = tx
        .query_row(
          "SELECT 1 FROM question_answers WHERE id = ?1 AND question_id = ?2",
          params![answer_id.0, ua.question_id.0],
          |_| Ok(()),
        )
        .optional()?
        .is_some();
      if !in_question {
        return Err(
          CoreError::Constraint(format!(
            "answer {answer_id} does not belong to question {}",
            ua.question_id
          ))
          .into(),
        );
      }
    }
  }

  touch_user(&tx, user_id, now)?;
  tx.execute(
    "INSERT INTO quizz_submissions (quizz_id, user_id, score, created_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![quiz_id.0, user_id, submission.score, now],
  )?;
  let submission_id = SubmissionId(tx.last_insert_rowid());

  if !submission.user_answers.is_empty() {
    let mut stmt = tx.prepare(
      "INSERT INTO user_answers
         (submission_id, question_id, selected_answer_id, user_answer_text, is_correct)
       VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for ua in &submission.user_answers {
      stmt.execute(params![
        submission_id.0,
        ua.question_id.0,
        ua.selected_answer_id.map(|a| a.0),
        ua.user_answer_text,
        ua.is_correct,
      ])?;
    }
  }

  tx.commit()?;
  Ok(submission_id)
}
