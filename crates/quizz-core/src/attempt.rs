//! The quiz-taking flow: a forward-only state machine over a quiz's questions.
//!
//! ```text
//! NotStarted ──start──▶ InProgress(0) ──record──▶ InProgress(1) … ──record──▶ Submitted
//! ```
//!
//! Each answered question is reported through [`Attempt::record`]; recording
//! the last one yields the [`NewSubmission`] for the submission writer. There
//! is no way back to an earlier question.

use crate::{
  Error, Result,
  grade::{Grade, GradeRequest, Grader, grade_or_incorrect},
  id::{AnswerId, QuestionId},
  quiz::{Question, QuestionContent, QuizDetail},
  submission::{NewSubmission, NewUserAnswer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
  NotStarted,
  InProgress { index: usize },
  Submitted,
}

/// What a question view reports once the user has answered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
  pub question_id:        QuestionId,
  pub is_correct:         bool,
  pub selected_answer_id: Option<AnswerId>,
  pub answer_text:        Option<String>,
}

/// The transition taken by [`Attempt::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  Next { index: usize },
  Finished(NewSubmission),
}

#[derive(Debug)]
pub struct Attempt<'q> {
  quiz:    &'q QuizDetail,
  state:   AttemptState,
  score:   u32,
  answers: Vec<NewUserAnswer>,
}

impl<'q> Attempt<'q> {
  pub fn new(quiz: &'q QuizDetail) -> Self {
    Self { quiz, state: AttemptState::NotStarted, score: 0, answers: Vec::new() }
  }

  pub fn state(&self) -> AttemptState { self.state }

  pub fn score(&self) -> u32 { self.score }

  pub fn total(&self) -> usize { self.quiz.questions.len() }

  /// The question currently awaiting an answer.
  pub fn current(&self) -> Option<&'q Question> {
    match self.state {
      AttemptState::InProgress { index } => self.quiz.questions.get(index),
      _ => None,
    }
  }

  pub fn is_last(&self) -> bool {
    matches!(self.state, AttemptState::InProgress { index } if index + 1 == self.total())
  }

  pub fn start(&mut self) -> Result<&'q Question> {
    if self.state != AttemptState::NotStarted {
      return Err(Error::Validation("attempt already started".into()));
    }
    let first = self
      .quiz
      .questions
      .first()
      .ok_or_else(|| Error::Validation("quiz has no questions".into()))?;
    self.state = AttemptState::InProgress { index: 0 };
    Ok(first)
  }

  /// Record the outcome of the current question and advance.
  pub fn record(&mut self, outcome: AnswerOutcome) -> Result<Step> {
    let AttemptState::InProgress { index } = self.state else {
      return Err(Error::Validation("attempt is not in progress".into()));
    };
    let current = &self.quiz.questions[index];
    if current.id != outcome.question_id {
      return Err(Error::Validation(format!(
        "question {} answered while question {} is current",
        outcome.question_id, current.id
      )));
    }

    if outcome.is_correct {
      self.score += 1;
    }
    self.answers.push(NewUserAnswer {
      question_id:        outcome.question_id,
      selected_answer_id: outcome.selected_answer_id,
      user_answer_text:   outcome.answer_text,
      is_correct:         outcome.is_correct,
    });

    if index + 1 < self.total() {
      self.state = AttemptState::InProgress { index: index + 1 };
      Ok(Step::Next { index: index + 1 })
    } else {
      self.state = AttemptState::Submitted;
      Ok(Step::Finished(NewSubmission {
        score:        self.score,
        user_answers: std::mem::take(&mut self.answers),
      }))
    }
  }

  /// Answer the current multiple-choice question; correctness is known
  /// locally.
  pub fn choose(&mut self, answer_id: AnswerId) -> Result<(bool, Step)> {
    let question = self.require_current()?;
    let QuestionContent::MultipleChoice { answers } = &question.content else {
      return Err(Error::Validation(format!(
        "question {} is not multiple choice",
        question.id
      )));
    };
    let chosen = answers
      .iter()
      .find(|a| a.id == answer_id)
      .ok_or_else(|| {
        Error::Validation(format!("answer {answer_id} is not an option of question {}", question.id))
      })?;

    let is_correct = chosen.is_correct;
    let step = self.record(AnswerOutcome {
      question_id: question.id,
      is_correct,
      selected_answer_id: Some(answer_id),
      answer_text: None,
    })?;
    Ok((is_correct, step))
  }

  /// Answer the current written or listening question. Correctness comes from
  /// `grader`; a grading failure counts as an incorrect answer.
  pub async fn respond<G: Grader>(&mut self, text: &str, grader: &G) -> Result<(Grade, Step)> {
    let question = self.require_current()?;
    if matches!(question.content, QuestionContent::MultipleChoice { .. }) {
      return Err(Error::Validation(format!(
        "question {} expects a choice, not text",
        question.id
      )));
    }
    let text = text.trim();
    if text.is_empty() {
      return Err(Error::Validation("answer must not be empty".into()));
    }

    let grade = match question.content.expected_answer() {
      Some(expected) => {
        let request = GradeRequest {
          question_text:       question.question_text.clone(),
          correct_answer_text: expected.answer_text.trim().to_lowercase(),
          user_answer:         text.to_owned(),
        };
        grade_or_incorrect(grader, &request).await
      }
      None => Grade::incorrect("question has no expected answer"),
    };

    let step = self.record(AnswerOutcome {
      question_id:        question.id,
      is_correct:         grade.is_correct,
      selected_answer_id: None,
      answer_text:        Some(text.to_owned()),
    })?;
    Ok((grade, step))
  }

  fn require_current(&self) -> Result<&'q Question> {
    self
      .current()
      .ok_or_else(|| Error::Validation("attempt is not in progress".into()))
  }
}
