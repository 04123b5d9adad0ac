//! Interactive quiz taking on a line-oriented terminal.
//!
//! Drives an [`Attempt`] one question at a time: choices are picked by
//! number, written and listening answers are typed and graded.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use quizz_core::{
  attempt::{Attempt, Step},
  grade::Grader,
  quiz::{AnswerFields, Question, QuestionContent, QuizDetail},
  submission::NewSubmission,
};

/// Walk through `quiz`, reading answers from `input`. Returns `None` for a
/// quiz without questions.
pub async fn run<R, W, G>(
  quiz: &QuizDetail,
  grader: &G,
  input: &mut R,
  out: &mut W,
) -> Result<Option<NewSubmission>>
where
  R: BufRead,
  W: Write,
  G: Grader,
{
  let mut attempt = Attempt::new(quiz);
  let total = attempt.total();
  if total == 0 {
    writeln!(out, "\"{}\" has no questions yet.", quiz.name)?;
    return Ok(None);
  }

  writeln!(out, "{}", quiz.name)?;
  if let Some(description) = &quiz.description {
    writeln!(out, "{description}")?;
  }
  let mut question = attempt.start()?;
  let mut index = 0;

  loop {
    writeln!(out, "\n[{}/{total}] {}", index + 1, question.question_text)?;

    let step = match &question.content {
      QuestionContent::MultipleChoice { answers } => {
        for (n, a) in answers.iter().enumerate() {
          writeln!(out, "  {}. {}", n + 1, a.answer_text)?;
        }
        let pick = loop {
          let line = prompt(input, out, "choice")?;
          match line.parse::<usize>() {
            Ok(n) if (1..=answers.len()).contains(&n) => break n - 1,
            _ => writeln!(out, "Enter a number between 1 and {}.", answers.len())?,
          }
        };
        let (correct, step) = attempt.choose(answers[pick].id)?;
        if correct {
          writeln!(out, "Correct!")?;
        } else {
          writeln!(out, "Wrong. {}", expected_hint(question))?;
        }
        step
      }
      QuestionContent::Write { .. } | QuestionContent::Listen { .. } => {
        if let Some(audio) = question.content.audio_text() {
          writeln!(out, "  (listen) {audio}")?;
        }
        let text = loop {
          let line = prompt(input, out, "answer")?;
          if !line.is_empty() {
            break line;
          }
        };
        let (grade, step) = attempt.respond(&text, grader).await?;
        if grade.is_correct {
          writeln!(out, "Correct!")?;
        } else {
          writeln!(out, "Wrong. {}", expected_hint(question))?;
        }
        if !grade.feedback.is_empty() {
          writeln!(out, "  {}", grade.feedback)?;
        }
        step
      }
    };

    match step {
      Step::Next { index: next } => {
        index = next;
        question = &quiz.questions[next];
      }
      Step::Finished(submission) => {
        writeln!(out, "\nScore: {}/{total}", submission.score)?;
        return Ok(Some(submission));
      }
    }
  }
}

fn expected_hint(question: &Question) -> String {
  match question.content.expected_answer() {
    Some(a) => format!("Expected: {}", a.answer_text()),
    None => String::new(),
  }
}

/// Print `label> ` and read one trimmed line; closed input is an error.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String> {
  write!(out, "{label}> ")?;
  out.flush()?;
  let mut line = String::new();
  let read = input.read_line(&mut line).context("reading answer")?;
  if read == 0 {
    bail!("input closed before the quiz was finished");
  }
  Ok(line.trim().to_owned())
}
