//! [`HttpGrader`]: grades free-text answers through an OpenAI-compatible
//! chat-completions endpoint.
//!
//! Only model names, latencies and sizes are logged. The API key and the
//! answer texts never are.

use std::time::{Duration, Instant};

use quizz_core::{
  Classify, ErrorKind,
  grade::{Grade, GradeRequest, Grader},
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::GraderConfig;

#[derive(Debug, Error)]
pub enum GraderError {
  #[error("grader is not configured (missing api key)")]
  NotConfigured,

  #[error("grader request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("grader returned HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("grader returned no usable verdict: {0}")]
  Parse(String),
}

impl Classify for GraderError {
  fn kind(&self) -> ErrorKind { ErrorKind::ExternalService }
}

#[derive(Clone)]
pub struct HttpGrader {
  client:   reqwest::Client,
  base_url: String,
  api_key:  String,
  model:    String,
}

impl HttpGrader {
  pub fn new(cfg: &GraderConfig) -> Result<Self, GraderError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base_url: cfg.base_url.trim_end_matches('/').to_owned(),
      api_key: cfg.api_key.clone(),
      model: cfg.model.clone(),
    })
  }

  #[instrument(level = "info", skip_all, fields(model = %self.model))]
  async fn complete(&self, request: &GradeRequest) -> Result<Grade, GraderError> {
    if self.api_key.is_empty() {
      return Err(GraderError::NotConfigured);
    }

    let body = ChatCompletionRequest {
      model:           &self.model,
      messages:        vec![ChatMessage { role: "user", content: prompt(request) }],
      temperature:     0.0,
      response_format: ResponseFormat { r#type: "json_object" },
    };

    let started = Instant::now();
    let res = self
      .client
      .post(format!("{}/chat/completions", self.base_url))
      .header(USER_AGENT, concat!("quizz-server/", env!("CARGO_PKG_VERSION")))
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&body)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let text = res.text().await.unwrap_or_default();
      let message = extract_api_error(&text).unwrap_or(text);
      return Err(GraderError::Status { status, message });
    }

    let completion: ChatCompletionResponse = res.json().await?;
    let content = completion
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();

    let grade = parse_grade(&content)?;
    info!(
      elapsed_ms = started.elapsed().as_millis() as u64,
      answer_len = request.user_answer.len(),
      response_len = content.len(),
      is_correct = grade.is_correct,
      "graded answer"
    );
    Ok(grade)
  }
}

impl Grader for HttpGrader {
  type Error = GraderError;

  async fn grade(&self, request: &GradeRequest) -> Result<Grade, GraderError> {
    self.complete(request).await
  }
}

fn prompt(r: &GradeRequest) -> String {
  format!(
    r#"You are a language teacher grading a student's answer.

Question: "{question}"
Expected answer: "{expected}"
Student's answer: "{answer}"

Evaluate the student's answer. Ignore minor grammatical mistakes and focus on meaning.
Respond in this exact JSON format:
{{"isCorrect": true, "score": 1, "feedback": "Correct!"}}"#,
    question = r.question_text,
    expected = r.correct_answer_text,
    answer = r.user_answer,
  )
}

/// Extract the outermost `{...}` object from model output and read it as a
/// [`Grade`]. Surrounding prose or code fences are ignored.
pub fn parse_grade(content: &str) -> Result<Grade, GraderError> {
  let start = content.find('{');
  let end = content.rfind('}');
  let json = match (start, end) {
    (Some(s), Some(e)) if s < e => &content[s..=e],
    _ => return Err(GraderError::Parse("no JSON object in response".into())),
  };
  serde_json::from_str(json).map_err(|e| GraderError::Parse(e.to_string()))
}

fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct Envelope {
    error: ErrorBody,
  }
  #[derive(Deserialize)]
  struct ErrorBody {
    message: String,
  }
  serde_json::from_str::<Envelope>(body).ok().map(|e| e.error.message)
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
  model:           &'a str,
  messages:        Vec<ChatMessage>,
  temperature:     f32,
  response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
  role:    &'static str,
  content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
  r#type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}
