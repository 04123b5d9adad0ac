//! Quiz, question and answer types.
//!
//! Stored rows and incoming payloads share one shape: a question's content is
//! a [`QuestionContent`] sum type keyed on the `type` discriminator, generic
//! over the answer representation. Stored questions carry [`Answer`]s (always
//! with an id), edit payloads carry [`AnswerDraft`]s (id present ⇒ update,
//! absent ⇒ insert), and brand-new quizzes carry [`NewAnswer`]s.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  id::{AnswerId, QuestionId, QuizId},
};

// ─── Question kind ───────────────────────────────────────────────────────────

/// The `type` column of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  MultipleChoice,
  Write,
  Listen,
}

impl QuestionKind {
  /// The discriminant string stored in the database and used on the wire.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice => "multiple_choice",
      Self::Write => "write",
      Self::Listen => "listen",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "multiple_choice" => Ok(Self::MultipleChoice),
      "write" => Ok(Self::Write),
      "listen" => Ok(Self::Listen),
      other => Err(Error::UnknownQuestionKind(other.to_owned())),
    }
  }
}

impl std::fmt::Display for QuestionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Answers ─────────────────────────────────────────────────────────────────

/// Read access shared by every answer representation.
pub trait AnswerFields {
  fn answer_text(&self) -> &str;
  fn is_correct(&self) -> bool;
}

/// A stored answer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
  pub id:          AnswerId,
  pub answer_text: String,
  pub is_correct:  bool,
}

/// An answer inside an edit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDraft {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:          Option<AnswerId>,
  pub answer_text: String,
  pub is_correct:  bool,
}

/// An answer of a quiz that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswer {
  pub answer_text: String,
  pub is_correct:  bool,
}

impl AnswerFields for Answer {
  fn answer_text(&self) -> &str { &self.answer_text }
  fn is_correct(&self) -> bool { self.is_correct }
}

impl AnswerFields for AnswerDraft {
  fn answer_text(&self) -> &str { &self.answer_text }
  fn is_correct(&self) -> bool { self.is_correct }
}

impl AnswerFields for NewAnswer {
  fn answer_text(&self) -> &str { &self.answer_text }
  fn is_correct(&self) -> bool { self.is_correct }
}

impl From<&Answer> for AnswerDraft {
  fn from(a: &Answer) -> Self {
    AnswerDraft {
      id:          Some(a.id),
      answer_text: a.answer_text.clone(),
      is_correct:  a.is_correct,
    }
  }
}

// ─── Question content ────────────────────────────────────────────────────────

/// The type-specific part of a question.
///
/// Written and listening questions hold a single expected answer. It is
/// optional so that a stored question with no answer rows can still be read;
/// payload validation requires it.
///
/// On the wire every kind has the same flat shape: `type`, `audioText`
/// (`null` unless listening) and an `answers` array, which holds at most one
/// entry for written and listening questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionContent<A> {
  MultipleChoice { answers: Vec<A> },
  Write { answer: Option<A> },
  Listen {
    /// Text read aloud to the quiz taker.
    audio_text: String,
    answer:     Option<A>,
  },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentOut<'a, A> {
  #[serde(rename = "type")]
  kind:       QuestionKind,
  audio_text: Option<&'a str>,
  answers:    &'a [A],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "A: Deserialize<'de>"))]
struct ContentIn<A> {
  #[serde(rename = "type")]
  kind:       QuestionKind,
  #[serde(default)]
  audio_text: Option<String>,
  #[serde(default = "Vec::new")]
  answers:    Vec<A>,
}

impl<A: Serialize> Serialize for QuestionContent<A> {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    ContentOut { kind: self.kind(), audio_text: self.audio_text(), answers: self.answers() }
      .serialize(serializer)
  }
}

impl<'de, A: Deserialize<'de>> Deserialize<'de> for QuestionContent<A> {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let wire = ContentIn::<A>::deserialize(deserializer)?;
    Self::from_parts(wire.kind, wire.audio_text, wire.answers).map_err(serde::de::Error::custom)
  }
}

impl<A> QuestionContent<A> {
  pub fn kind(&self) -> QuestionKind {
    match self {
      Self::MultipleChoice { .. } => QuestionKind::MultipleChoice,
      Self::Write { .. } => QuestionKind::Write,
      Self::Listen { .. } => QuestionKind::Listen,
    }
  }

  /// `Some` only for listening questions.
  pub fn audio_text(&self) -> Option<&str> {
    match self {
      Self::Listen { audio_text, .. } => Some(audio_text),
      _ => None,
    }
  }

  pub fn answers(&self) -> &[A] {
    match self {
      Self::MultipleChoice { answers } => answers,
      Self::Write { answer } | Self::Listen { answer, .. } => answer.as_slice(),
    }
  }

  pub fn map<B>(self, f: impl FnMut(A) -> B) -> QuestionContent<B> {
    match self {
      Self::MultipleChoice { answers } => QuestionContent::MultipleChoice {
        answers: answers.into_iter().map(f).collect(),
      },
      Self::Write { answer } => QuestionContent::Write { answer: answer.map(f) },
      Self::Listen { audio_text, answer } => QuestionContent::Listen {
        audio_text,
        answer: answer.map(f),
      },
    }
  }

  /// Reassemble content from the flat columns of a `questions` row and its
  /// answer rows.
  pub fn from_parts(
    kind: QuestionKind,
    audio_text: Option<String>,
    answers: Vec<A>,
  ) -> Result<Self> {
    let single = |answers: Vec<A>| -> Result<Option<A>> {
      if answers.len() > 1 {
        return Err(Error::Constraint(format!(
          "{kind} question has {} answers, expected at most one",
          answers.len()
        )));
      }
      Ok(answers.into_iter().next())
    };

    Ok(match kind {
      QuestionKind::MultipleChoice => Self::MultipleChoice { answers },
      QuestionKind::Write => Self::Write { answer: single(answers)? },
      QuestionKind::Listen => Self::Listen {
        audio_text: audio_text.unwrap_or_default(),
        answer:     single(answers)?,
      },
    })
  }
}

impl<A: AnswerFields> QuestionContent<A> {
  /// The answer a quiz taker is graded against: the first correct choice for
  /// multiple choice, the expected text for written and listening questions.
  pub fn expected_answer(&self) -> Option<&A> {
    match self {
      Self::MultipleChoice { answers } => answers.iter().find(|a| a.is_correct()),
      Self::Write { answer } | Self::Listen { answer, .. } => answer.as_ref(),
    }
  }

  fn validate(&self, position: usize) -> Result<()> {
    let invalid = |msg: &str| Error::Validation(format!("question {position}: {msg}"));

    match self {
      Self::MultipleChoice { answers } if answers.is_empty() => {
        return Err(invalid("multiple choice question needs at least one answer"));
      }
      Self::Write { answer: None } | Self::Listen { answer: None, .. } => {
        return Err(invalid("an expected answer is required"));
      }
      Self::Listen { audio_text, .. } if audio_text.trim().is_empty() => {
        return Err(invalid("listening question needs audio text"));
      }
      _ => {}
    }

    if self.answers().iter().any(|a| a.answer_text().trim().is_empty()) {
      return Err(invalid("answer text must not be empty"));
    }
    Ok(())
  }
}

// ─── Questions ───────────────────────────────────────────────────────────────

/// A stored question with its answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id:            QuestionId,
  pub question_text: String,
  pub order:         u32,
  #[serde(flatten)]
  pub content:       QuestionContent<Answer>,
}

/// A question inside an edit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:            Option<QuestionId>,
  pub question_text: String,
  pub order:         u32,
  #[serde(flatten)]
  pub content:       QuestionContent<AnswerDraft>,
}

/// A question of a quiz that does not exist yet; its order is its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
  pub question_text: String,
  #[serde(flatten)]
  pub content:       QuestionContent<NewAnswer>,
}

// ─── Quizzes ─────────────────────────────────────────────────────────────────

/// Full nested read model: quiz → questions (by `order`) → answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDetail {
  pub id:          QuizId,
  pub name:        String,
  pub description: Option<String>,
  pub questions:   Vec<Question>,
}

/// One row of a user's quiz list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
  pub id:             QuizId,
  pub name:           String,
  pub description:    Option<String>,
  pub question_count: u32,
}

/// Input to [`crate::store::QuizStore::create_quiz`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuiz {
  pub name:        String,
  pub description: Option<String>,
  #[serde(default)]
  pub questions:   Vec<NewQuestion>,
}

/// The complete desired state of a quiz, input to
/// [`crate::store::QuizStore::update_quiz`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizUpdate {
  pub name:        String,
  pub description: Option<String>,
  #[serde(default)]
  pub questions:   Vec<QuestionDraft>,
}

fn validate_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::Validation("quiz name must not be empty".into()));
  }
  Ok(())
}

fn validate_question_text(text: &str, position: usize) -> Result<()> {
  if text.trim().is_empty() {
    return Err(Error::Validation(format!(
      "question {position}: question text must not be empty"
    )));
  }
  Ok(())
}

impl NewQuiz {
  pub fn validate(&self) -> Result<()> {
    validate_name(&self.name)?;
    for (position, q) in self.questions.iter().enumerate() {
      validate_question_text(&q.question_text, position)?;
      q.content.validate(position)?;
    }
    Ok(())
  }
}

impl QuizUpdate {
  /// Check the payload shape. Identifier ownership is checked by the store.
  ///
  /// Orders must form exactly `0..N`: values are stored verbatim, so a gap or
  /// duplicate here would break the contiguous-order invariant.
  pub fn validate(&self) -> Result<()> {
    validate_name(&self.name)?;
    for (position, q) in self.questions.iter().enumerate() {
      validate_question_text(&q.question_text, position)?;
      q.content.validate(position)?;
    }

    let mut orders: Vec<u32> = self.questions.iter().map(|q| q.order).collect();
    orders.sort_unstable();
    if orders.iter().enumerate().any(|(i, &o)| o as usize != i) {
      return Err(Error::Validation(format!(
        "question orders must be 0..{} without gaps or duplicates",
        self.questions.len()
      )));
    }
    Ok(())
  }
}

impl From<&QuizDetail> for QuizUpdate {
  /// The payload that, applied to `detail`'s quiz, changes nothing.
  fn from(detail: &QuizDetail) -> Self {
    QuizUpdate {
      name:        detail.name.clone(),
      description: detail.description.clone(),
      questions:   detail
        .questions
        .iter()
        .map(|q| QuestionDraft {
          id:            Some(q.id),
          question_text: q.question_text.clone(),
          order:         q.order,
          content:       q.content.clone().map(|a| AnswerDraft::from(&a)),
        })
        .collect(),
    }
  }
}
