//! Integration tests for `SqliteStore` using an in-memory database.

use quizz_core::{
  Classify, ErrorKind,
  id::{AnswerId, Principal, QuestionId, QuizId, SubmissionId},
  quiz::{
    AnswerDraft, NewAnswer, NewQuestion, NewQuiz, QuestionContent, QuestionDraft, QuizDetail,
    QuizUpdate,
  },
  store::QuizStore,
  submission::{NewSubmission, NewUserAnswer},
};

use crate::{Error, SqliteStore};

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn alice() -> Principal { Principal::new("alice") }

fn bob() -> Principal { Principal::new("bob") }

fn choice(text: &str, is_correct: bool) -> NewAnswer {
  NewAnswer { answer_text: text.into(), is_correct }
}

fn mc(text: &str) -> NewQuestion {
  NewQuestion {
    question_text: text.into(),
    content:       QuestionContent::MultipleChoice {
      answers: vec![choice("yes", true), choice("no", false)],
    },
  }
}

fn written(text: &str, expected: &str) -> NewQuestion {
  NewQuestion {
    question_text: text.into(),
    content:       QuestionContent::Write { answer: Some(choice(expected, true)) },
  }
}

fn new_quiz(questions: Vec<NewQuestion>) -> NewQuiz {
  NewQuiz { name: "Animals".into(), description: Some("basics".into()), questions }
}

fn new_draft(text: &str, order: u32) -> QuestionDraft {
  QuestionDraft {
    id: None,
    question_text: text.into(),
    order,
    content: QuestionContent::Write {
      answer: Some(AnswerDraft { id: None, answer_text: text.to_lowercase(), is_correct: true }),
    },
  }
}

async fn detail(store: &SqliteStore, id: QuizId) -> QuizDetail {
  store.get_quiz_detail(id).await.unwrap().expect("quiz exists")
}

async fn count(store: &SqliteStore, sql: &'static str) -> i64 {
  store
    .conn
    .call(move |conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
    .await
    .unwrap()
}

async fn orphan_count(store: &SqliteStore) -> i64 {
  count(
    store,
    "SELECT COUNT(*) FROM question_answers WHERE question_id NOT IN (SELECT id FROM questions)",
  )
  .await
}

/// Questions and answers compared without their ids.
fn shape(detail: &QuizDetail) -> Vec<(String, u32, Vec<(String, bool)>)> {
  detail
    .questions
    .iter()
    .map(|q| {
      let answers = q
        .content
        .answers()
        .iter()
        .map(|a| (a.answer_text.clone(), a.is_correct))
        .collect();
      (q.question_text.clone(), q.order, answers)
    })
    .collect()
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_read_back() {
  let s = store().await;
  let id = s
    .create_quiz(&alice(), new_quiz(vec![mc("Is a whale a mammal?"), written("Cat in French", "chat")]))
    .await
    .unwrap();

  let d = detail(&s, id).await;
  assert_eq!(d.name, "Animals");
  assert_eq!(d.description.as_deref(), Some("basics"));
  assert_eq!(d.questions.len(), 2);
  assert_eq!(d.questions[0].order, 0);
  assert_eq!(d.questions[1].order, 1);
  assert_eq!(d.questions[0].content.answers().len(), 2);
  assert_eq!(
    d.questions[1].content.expected_answer().map(|a| a.answer_text.as_str()),
    Some("chat")
  );
}

#[tokio::test]
async fn missing_quiz_reads_as_none() {
  let s = store().await;
  assert!(s.get_quiz_detail(QuizId(42)).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_quiz_has_no_questions() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![])).await.unwrap();
  assert!(detail(&s, id).await.questions.is_empty());
}

#[tokio::test]
async fn invalid_new_quiz_writes_nothing() {
  let s = store().await;
  let mut quiz = new_quiz(vec![mc("ok")]);
  quiz.name = "  ".into();

  let err = s.create_quiz(&alice(), quiz).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM quizzes").await, 0);
}

#[tokio::test]
async fn list_quizzes_is_per_owner() {
  let s = store().await;
  let a = s.create_quiz(&alice(), new_quiz(vec![mc("1"), mc("2")])).await.unwrap();
  s.create_quiz(&bob(), new_quiz(vec![mc("1")])).await.unwrap();

  let list = s.list_quizzes(&alice()).await.unwrap();
  assert_eq!(list.len(), 1);
  assert_eq!(list[0].id, a);
  assert_eq!(list[0].question_count, 2);
}

// ─── Reconcile ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn unchanged_payload_is_idempotent() {
  let s = store().await;
  let id = s
    .create_quiz(&alice(), new_quiz(vec![mc("a"), written("b", "bee")]))
    .await
    .unwrap();
  let before = detail(&s, id).await;

  s.update_quiz(&alice(), id, QuizUpdate::from(&before)).await.unwrap();
  s.update_quiz(&alice(), id, QuizUpdate::from(&before)).await.unwrap();

  assert_eq!(detail(&s, id).await, before);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM questions").await, 2);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM question_answers").await, 3);
}

#[tokio::test]
async fn update_round_trips_content() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("old")])).await.unwrap();

  let update = QuizUpdate {
    name:        "Renamed".into(),
    description: None,
    questions:   vec![
      QuestionDraft {
        id:            None,
        question_text: "Listen".into(),
        order:         0,
        content:       QuestionContent::Listen {
          audio_text: "good morning".into(),
          answer:     Some(AnswerDraft {
            id:          None,
            answer_text: "good morning".into(),
            is_correct:  true,
          }),
        },
      },
      new_draft("Write", 1),
    ],
  };
  s.update_quiz(&alice(), id, update.clone()).await.unwrap();

  let d = detail(&s, id).await;
  assert_eq!(d.name, "Renamed");
  assert_eq!(d.description, None);
  assert_eq!(d.questions.len(), 2);
  assert_eq!(d.questions[0].content.audio_text(), Some("good morning"));
  assert_eq!(d.questions[1].question_text, "Write");

  // Payload and stored detail agree once ids are ignored.
  let expected: Vec<(String, u32, Vec<(String, bool)>)> = update
    .questions
    .iter()
    .map(|q| {
      let answers =
        q.content.answers().iter().map(|a| (a.answer_text.clone(), a.is_correct)).collect();
      (q.question_text.clone(), q.order, answers)
    })
    .collect();
  assert_eq!(shape(&d), expected);
  assert_eq!(orphan_count(&s).await, 0);
}

#[tokio::test]
async fn keeps_updates_deletes_and_inserts_by_id() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("A"), mc("B")])).await.unwrap();
  let before = detail(&s, id).await;
  let (a, b) = (&before.questions[0], &before.questions[1]);

  // Desired: B (edited, moved first) and a new C. A disappears.
  let mut b_draft = QuizUpdate::from(&before).questions.remove(1);
  b_draft.question_text = "B edited".into();
  b_draft.order = 0;
  let update = QuizUpdate {
    name:        before.name.clone(),
    description: before.description.clone(),
    questions:   vec![b_draft, new_draft("C", 1)],
  };
  s.update_quiz(&alice(), id, update).await.unwrap();

  let after = detail(&s, id).await;
  assert_eq!(after.questions.len(), 2);
  assert_eq!(after.questions[0].id, b.id, "B keeps its identity");
  assert_eq!(after.questions[0].question_text, "B edited");
  assert_eq!(after.questions[0].content.answers(), b.content.answers());
  assert_eq!(after.questions[1].question_text, "C");
  assert!(after.questions.iter().all(|q| q.id != a.id));
  assert_eq!(orphan_count(&s).await, 0);
}

#[tokio::test]
async fn answers_are_reconciled_per_question() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("Q")])).await.unwrap();
  let before = detail(&s, id).await;

  let mut update = QuizUpdate::from(&before);
  let QuestionContent::MultipleChoice { answers } = &mut update.questions[0].content else {
    panic!("expected multiple choice");
  };
  // Keep "yes" flipped to incorrect, drop "no", add "maybe".
  answers[0].is_correct = false;
  answers.remove(1);
  answers.push(AnswerDraft { id: None, answer_text: "maybe".into(), is_correct: true });
  let kept = answers[0].id;

  s.update_quiz(&alice(), id, update).await.unwrap();

  let d = detail(&s, id).await;
  let stored = d.questions[0].content.answers();
  assert_eq!(stored.len(), 2);
  assert_eq!(Some(stored[0].id), kept);
  assert!(!stored[0].is_correct);
  assert_eq!(stored[1].answer_text, "maybe");
  assert_eq!(count(&s, "SELECT COUNT(*) FROM question_answers").await, 2);
}

#[tokio::test]
async fn order_is_stored_verbatim() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![])).await.unwrap();

  let update = QuizUpdate {
    name:        "Ordered".into(),
    description: None,
    questions:   vec![new_draft("X", 2), new_draft("Y", 0), new_draft("Z", 1)],
  };
  s.update_quiz(&alice(), id, update).await.unwrap();

  let texts: Vec<_> =
    detail(&s, id).await.questions.into_iter().map(|q| (q.question_text, q.order)).collect();
  assert_eq!(texts, vec![("Y".into(), 0), ("Z".into(), 1), ("X".into(), 2)]);
}

#[tokio::test]
async fn changing_question_type_replaces_content() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("Q")])).await.unwrap();
  let before = detail(&s, id).await;

  let mut update = QuizUpdate::from(&before);
  update.questions[0].content = QuestionContent::Write {
    answer: Some(AnswerDraft { id: None, answer_text: "typed".into(), is_correct: true }),
  };
  s.update_quiz(&alice(), id, update).await.unwrap();

  let d = detail(&s, id).await;
  assert_eq!(d.questions[0].id, before.questions[0].id);
  assert_eq!(
    d.questions[0].content.expected_answer().map(|a| a.answer_text.as_str()),
    Some("typed")
  );
  assert_eq!(count(&s, "SELECT COUNT(*) FROM question_answers").await, 1);
}

#[tokio::test]
async fn foreign_question_id_is_a_constraint_error() {
  let s = store().await;
  let mine = s.create_quiz(&alice(), new_quiz(vec![mc("mine")])).await.unwrap();
  let other = s.create_quiz(&alice(), new_quiz(vec![mc("other")])).await.unwrap();
  let before = detail(&s, mine).await;
  let foreign = detail(&s, other).await.questions[0].id;

  let mut update = QuizUpdate::from(&before);
  update.questions[0].id = Some(foreign);
  let err = s.update_quiz(&alice(), mine, update).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Constraint, "{err}");
  assert_eq!(detail(&s, mine).await, before);
}

#[tokio::test]
async fn answer_id_on_new_question_is_rejected() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("Q")])).await.unwrap();
  let before = detail(&s, id).await;
  let existing = before.questions[0].content.answers()[0].id;

  let mut update = QuizUpdate::from(&before);
  let mut fresh = new_draft("New", 1);
  fresh.content = QuestionContent::Write {
    answer: Some(AnswerDraft { id: Some(existing), answer_text: "x".into(), is_correct: true }),
  };
  update.questions.push(fresh);

  let err = s.update_quiz(&alice(), id, update).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Constraint);
  assert_eq!(detail(&s, id).await, before);
}

#[tokio::test]
async fn bad_order_is_a_validation_error() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![])).await.unwrap();
  let update = QuizUpdate {
    name:        "Gappy".into(),
    description: None,
    questions:   vec![new_draft("X", 0), new_draft("Y", 2)],
  };
  let err = s.update_quiz(&alice(), id, update).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn non_owner_sees_not_found() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("Q")])).await.unwrap();
  let before = detail(&s, id).await;

  let err = s.update_quiz(&bob(), id, QuizUpdate::from(&before)).await.unwrap_err();
  assert!(matches!(err, Error::Core(quizz_core::Error::QuizNotFound(q)) if q == id));

  let err = s.delete_quiz(&bob(), id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let err = s.update_quiz(&alice(), QuizId(999), QuizUpdate::from(&before)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn failed_update_leaves_quiz_untouched() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("A"), mc("B")])).await.unwrap();
  let before = detail(&s, id).await;

  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER boom BEFORE INSERT ON questions
         WHEN NEW.question_text = 'boom'
         BEGIN SELECT RAISE(ABORT, 'induced failure'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  // Drops A, renames B, then fails on the third insert.
  let mut update = QuizUpdate::from(&before);
  update.name = "Should not stick".into();
  update.questions.remove(0);
  update.questions[0].question_text = "B renamed".into();
  update.questions[0].order = 0;
  update.questions.push(new_draft("C", 1));
  update.questions.push(new_draft("D", 2));
  update.questions.push(new_draft("boom", 3));

  let err = s.update_quiz(&alice(), id, update).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Transaction, "{err}");

  assert_eq!(detail(&s, id).await, before);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM questions").await, 2);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM question_answers").await, 4);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_everything_under_the_quiz() {
  let s = store().await;
  let keep = s.create_quiz(&alice(), new_quiz(vec![mc("keep")])).await.unwrap();
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("Q")])).await.unwrap();
  let d = detail(&s, id).await;
  let q = &d.questions[0];

  s.save_submission(
    &bob(),
    id,
    NewSubmission {
      score:        1,
      user_answers: vec![NewUserAnswer {
        question_id:        q.id,
        selected_answer_id: Some(q.content.answers()[0].id),
        user_answer_text:   None,
        is_correct:         true,
      }],
    },
  )
  .await
  .unwrap();

  s.delete_quiz(&alice(), id).await.unwrap();

  assert!(s.get_quiz_detail(id).await.unwrap().is_none());
  assert!(s.get_quiz_detail(keep).await.unwrap().is_some());
  assert_eq!(count(&s, "SELECT COUNT(*) FROM questions").await, 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM question_answers").await, 2);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM quizz_submissions").await, 0);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM user_answers").await, 0);
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn submission_with_answers_round_trips() {
  let s = store().await;
  let id = s
    .create_quiz(&alice(), new_quiz(vec![mc("Q1"), written("Q2", "chat")]))
    .await
    .unwrap();
  let d = detail(&s, id).await;

  let submission = NewSubmission {
    score:        1,
    user_answers: vec![
      NewUserAnswer {
        question_id:        d.questions[0].id,
        selected_answer_id: Some(d.questions[0].content.answers()[1].id),
        user_answer_text:   None,
        is_correct:         false,
      },
      NewUserAnswer {
        question_id:        d.questions[1].id,
        selected_answer_id: None,
        user_answer_text:   Some("Chat".into()),
        is_correct:         true,
      },
    ],
  };
  let sid = s.save_submission(&bob(), id, submission).await.unwrap();

  // Both the submitter and the quiz owner can read it.
  for who in [bob(), alice()] {
    let got = s.get_submission(&who, sid).await.unwrap().expect("visible");
    assert_eq!(got.submission.quiz_id, id);
    assert_eq!(got.submission.user_id.0, "bob");
    assert_eq!(got.submission.score, 1);
    assert_eq!(got.user_answers.len(), 2);
    assert_eq!(got.user_answers[1].user_answer_text.as_deref(), Some("Chat"));
  }
  assert!(s.get_submission(&Principal::new("carol"), sid).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_submission_writes_one_row() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![])).await.unwrap();

  let sid = s
    .save_submission(&alice(), id, NewSubmission { score: 0, user_answers: vec![] })
    .await
    .unwrap();

  assert_eq!(count(&s, "SELECT COUNT(*) FROM quizz_submissions").await, 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM user_answers").await, 0);
  let got = s.get_submission(&alice(), sid).await.unwrap().unwrap();
  assert!(got.user_answers.is_empty());
}

#[tokio::test]
async fn submission_checks_quiz_score_and_references() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("Q")])).await.unwrap();
  let other = s.create_quiz(&alice(), new_quiz(vec![mc("Other")])).await.unwrap();
  let d = detail(&s, id).await;
  let foreign = detail(&s, other).await.questions[0].clone();

  let err = s
    .save_submission(&bob(), QuizId(999), NewSubmission { score: 0, user_answers: vec![] })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let err = s
    .save_submission(&bob(), id, NewSubmission { score: 2, user_answers: vec![] })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let answer = |question_id: QuestionId, selected: AnswerId| NewUserAnswer {
    question_id,
    selected_answer_id: Some(selected),
    user_answer_text: None,
    is_correct: false,
  };

  let wrong_question = NewSubmission {
    score:        0,
    user_answers: vec![answer(foreign.id, foreign.content.answers()[0].id)],
  };
  let err = s.save_submission(&bob(), id, wrong_question).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Constraint);

  let wrong_answer = NewSubmission {
    score:        0,
    user_answers: vec![answer(d.questions[0].id, foreign.content.answers()[0].id)],
  };
  let err = s.save_submission(&bob(), id, wrong_answer).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Constraint);

  assert_eq!(count(&s, "SELECT COUNT(*) FROM quizz_submissions").await, 0);
}

#[tokio::test]
async fn history_survives_question_deletion() {
  let s = store().await;
  let id = s.create_quiz(&alice(), new_quiz(vec![mc("A"), mc("B")])).await.unwrap();
  let before = detail(&s, id).await;
  let a = &before.questions[0];

  let sid = s
    .save_submission(
      &alice(),
      id,
      NewSubmission {
        score:        1,
        user_answers: vec![NewUserAnswer {
          question_id:        a.id,
          selected_answer_id: Some(a.content.answers()[0].id),
          user_answer_text:   None,
          is_correct:         true,
        }],
      },
    )
    .await
    .unwrap();

  let mut update = QuizUpdate::from(&before);
  update.questions.remove(0);
  update.questions[0].order = 0;
  s.update_quiz(&alice(), id, update).await.unwrap();

  let got = s.get_submission(&alice(), sid).await.unwrap().unwrap();
  assert_eq!(got.user_answers.len(), 1);
  assert_eq!(got.user_answers[0].question_id, None);
  assert_eq!(got.user_answers[0].selected_answer_id, None);
  assert!(got.user_answers[0].is_correct);
}

#[tokio::test]
async fn unknown_submission_is_none() {
  let s = store().await;
  assert!(s.get_submission(&alice(), SubmissionId(7)).await.unwrap().is_none());
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn metrics_and_activity_cover_owned_quizzes() {
  let s = store().await;

  let empty = s.user_metrics(&alice()).await.unwrap();
  assert_eq!(empty.quiz_count, 0);
  assert_eq!(empty.average_score, None);
  assert!(s.activity(&alice()).await.unwrap().is_empty());

  let q1 = s.create_quiz(&alice(), new_quiz(vec![mc("1"), mc("2")])).await.unwrap();
  let q2 = s.create_quiz(&alice(), new_quiz(vec![mc("3")])).await.unwrap();
  let theirs = s.create_quiz(&bob(), new_quiz(vec![mc("x")])).await.unwrap();

  // Pin timestamps so the grouping does not depend on the wall clock.
  let stamps = [
    "2026-03-01T10:00:00+00:00",
    "2026-03-01T23:59:59+00:00",
    "2026-03-02T00:00:01+00:00",
    "2026-03-01T12:00:00+00:00",
  ];
  for ((quiz, score), at) in [(q1, 2), (q1, 0), (q2, 1), (theirs, 1)].into_iter().zip(stamps) {
    let sid = s
      .save_submission(&bob(), quiz, NewSubmission { score, user_answers: vec![] })
      .await
      .unwrap();
    s.conn
      .call(move |conn| {
        conn.execute(
          "UPDATE quizz_submissions SET created_at = ?1 WHERE id = ?2",
          rusqlite::params![at, sid.0],
        )?;
        Ok(())
      })
      .await
      .unwrap();
  }

  let m = s.user_metrics(&alice()).await.unwrap();
  assert_eq!(m.quiz_count, 2);
  assert_eq!(m.question_count, 3);
  assert_eq!(m.submission_count, 3);
  assert_eq!(m.average_score, Some(1.0));

  let day = |d| chrono::NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
  let days = s.activity(&alice()).await.unwrap();
  let days: Vec<_> = days.into_iter().map(|d| (d.date, d.submissions)).collect();
  assert_eq!(days, vec![(day(1), 2), (day(2), 1)]);
}

#[tokio::test]
async fn ensure_user_keeps_existing_name() {
  let s = store().await;
  let id = quizz_core::id::UserId("alice".into());
  s.ensure_user(id.clone(), Some("Alice".into())).await.unwrap();
  s.ensure_user(id.clone(), None).await.unwrap();

  let name: Option<String> = s
    .conn
    .call(|conn| Ok(conn.query_row("SELECT name FROM users WHERE user_id = 'alice'", [], |r| r.get(0))?))
    .await
    .unwrap();
  assert_eq!(name.as_deref(), Some("Alice"));
  assert_eq!(count(&s, "SELECT COUNT(*) FROM users").await, 1);
}
