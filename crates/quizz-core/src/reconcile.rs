//! Identifier-presence diffing of a child collection against its parent.
//!
//! Given the ids currently stored under one parent and the complete desired
//! list of children, [`plan`] partitions the desired children into updates
//! (id present and stored), inserts (no id) and the stored ids to delete
//! (stored but not desired). The same planner is applied to the questions of
//! a quiz and to the answers of each question.

use std::{collections::HashSet, fmt, hash::Hash};

use crate::{
  Error, Result,
  id::{AnswerId, QuestionId},
  quiz::{AnswerDraft, QuestionDraft},
};

/// A desired child that may carry the id of an existing row.
pub trait Keyed {
  type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display;

  /// Singular entity and parent names used in error messages.
  const ENTITY: &'static str;
  const PARENT: &'static str;

  fn key(&self) -> Option<Self::Id>;
}

impl Keyed for QuestionDraft {
  type Id = QuestionId;
  const ENTITY: &'static str = "question";
  const PARENT: &'static str = "quiz";

  fn key(&self) -> Option<QuestionId> { self.id }
}

impl Keyed for AnswerDraft {
  type Id = AnswerId;
  const ENTITY: &'static str = "answer";
  const PARENT: &'static str = "question";

  fn key(&self) -> Option<AnswerId> { self.id }
}

/// The minimal set of row operations that turns the stored children into the
/// desired ones.
#[derive(Debug)]
pub struct Plan<'a, T: Keyed> {
  /// Stored ids absent from the desired set, in stored order.
  pub delete: Vec<T::Id>,
  /// Desired children whose id is stored under this parent, in desired order.
  pub update: Vec<(T::Id, &'a T)>,
  /// Desired children without an id, in desired order.
  pub insert: Vec<&'a T>,
}

impl<T: Keyed> Plan<'_, T> {
  pub fn is_empty(&self) -> bool {
    self.delete.is_empty() && self.update.is_empty() && self.insert.is_empty()
  }
}

/// Partition `desired` against the ids stored under one parent.
///
/// A desired id that is not stored under this parent belongs to another
/// parent (or to nothing) and fails with [`Error::Constraint`]; the same id
/// appearing twice fails with [`Error::Validation`].
pub fn plan<'a, T: Keyed>(stored: &[T::Id], desired: &'a [T]) -> Result<Plan<'a, T>> {
  let stored_set: HashSet<T::Id> = stored.iter().copied().collect();
  let mut kept: HashSet<T::Id> = HashSet::with_capacity(desired.len());
  let mut update = Vec::new();
  let mut insert = Vec::new();

  for child in desired {
    match child.key() {
      Some(id) => {
        if !kept.insert(id) {
          return Err(Error::Validation(format!(
            "{} {id} appears more than once",
            T::ENTITY
          )));
        }
        if !stored_set.contains(&id) {
          return Err(Error::Constraint(format!(
            "{} {id} does not belong to this {}",
            T::ENTITY,
            T::PARENT
          )));
        }
        update.push((id, child));
      }
      None => insert.push(child),
    }
  }

  let delete = stored.iter().copied().filter(|id| !kept.contains(id)).collect();

  Ok(Plan { delete, update, insert })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quiz::QuestionContent;

  fn question(id: Option<i64>) -> QuestionDraft {
    QuestionDraft {
      id:            id.map(QuestionId),
      question_text: "Q".into(),
      order:         0,
      content:       QuestionContent::Write { answer: None },
    }
  }

  fn answer(id: Option<i64>) -> AnswerDraft {
    AnswerDraft { id: id.map(AnswerId), answer_text: "A".into(), is_correct: false }
  }

  #[test]
  fn partitions_by_id_presence() {
    // Stored A(1), B(2); desired B(2) and a new C.
    let desired = vec![question(Some(2)), question(None)];
    let plan = plan(&[QuestionId(1), QuestionId(2)], &desired).unwrap();

    assert_eq!(plan.delete, vec![QuestionId(1)]);
    assert_eq!(plan.update.len(), 1);
    assert_eq!(plan.update[0].0, QuestionId(2));
    assert_eq!(plan.insert.len(), 1);
    assert!(plan.insert[0].id.is_none());
  }

  #[test]
  fn identical_ids_produce_only_updates() {
    let desired = vec![answer(Some(10)), answer(Some(11))];
    let plan = plan(&[AnswerId(10), AnswerId(11)], &desired).unwrap();
    assert!(plan.delete.is_empty());
    assert!(plan.insert.is_empty());
    assert_eq!(plan.update.len(), 2);
  }

  #[test]
  fn empty_desired_deletes_everything() {
    let desired: Vec<AnswerDraft> = vec![];
    let plan = plan(&[AnswerId(1), AnswerId(2)], &desired).unwrap();
    assert_eq!(plan.delete, vec![AnswerId(1), AnswerId(2)]);
    assert!(plan.update.is_empty() && plan.insert.is_empty());
  }

  #[test]
  fn nothing_stored_nothing_desired_is_empty() {
    let desired: Vec<QuestionDraft> = vec![];
    assert!(plan(&[], &desired).unwrap().is_empty());
  }

  #[test]
  fn foreign_id_is_a_constraint_error() {
    let desired = vec![answer(Some(99))];
    let err = plan(&[AnswerId(1)], &desired).unwrap_err();
    assert!(matches!(err, Error::Constraint(ref m) if m.contains("answer 99")), "{err}");
  }

  #[test]
  fn duplicate_id_is_a_validation_error() {
    let desired = vec![question(Some(1)), question(Some(1))];
    let err = plan(&[QuestionId(1)], &desired).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
  }
}
