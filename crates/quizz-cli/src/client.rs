//! Async HTTP client wrapping the Quizz JSON API.

use std::time::Duration;

use quizz_core::{
  Classify, ErrorKind,
  grade::{Grade, GradeRequest, Grader},
  id::{QuizId, SubmissionId},
  quiz::{NewQuiz, QuizDetail, QuizSummary, QuizUpdate},
  submission::{DailyActivity, NewSubmission, UserMetrics},
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

/// Connection settings for the Quizz API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{what} → {status}: {message}")]
  Status {
    what:    String,
    status:  StatusCode,
    message: String,
  },
}

impl Classify for ClientError {
  fn kind(&self) -> ErrorKind {
    match self {
      ClientError::Http(_) => ErrorKind::ExternalService,
      ClientError::Status { status, .. } => match *status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST => ErrorKind::Validation,
        StatusCode::CONFLICT => ErrorKind::Constraint,
        StatusCode::BAD_GATEWAY => ErrorKind::ExternalService,
        _ => ErrorKind::Internal,
      },
    }
  }
}

type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Deserialize)]
struct Created {
  id: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the Quizz JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req` and decode a successful JSON body; error bodies become
  /// [`ClientError::Status`].
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = self.auth(req).send().await?;
    let status = resp.status();
    debug!(%status, what, "api response");

    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ErrorBody>(&text).map(|b| b.error).unwrap_or(text);
      return Err(ClientError::Status { what: what.to_owned(), status, message });
    }
    Ok(resp.json().await?)
  }

  // ── Quizzes ───────────────────────────────────────────────────────────────

  /// `GET /api/quizzes`
  pub async fn list_quizzes(&self) -> Result<Vec<QuizSummary>> {
    self.send(self.client.get(self.url("/quizzes")), "GET /quizzes").await
  }

  /// `GET /api/quizzes/{id}`
  pub async fn get_quiz(&self, id: QuizId) -> Result<QuizDetail> {
    let path = format!("/quizzes/{id}");
    self.send(self.client.get(self.url(&path)), &format!("GET {path}")).await
  }

  /// `POST /api/quizzes`
  pub async fn create_quiz(&self, quiz: &NewQuiz) -> Result<QuizId> {
    let created: Created =
      self.send(self.client.post(self.url("/quizzes")).json(quiz), "POST /quizzes").await?;
    Ok(QuizId(created.id))
  }

  /// `PUT /api/quizzes/{id}`
  pub async fn update_quiz(&self, id: QuizId, update: &QuizUpdate) -> Result<()> {
    let path = format!("/quizzes/{id}");
    let _: serde_json::Value =
      self.send(self.client.put(self.url(&path)).json(update), &format!("PUT {path}")).await?;
    Ok(())
  }

  /// `DELETE /api/quizzes/{id}`
  pub async fn delete_quiz(&self, id: QuizId) -> Result<()> {
    let path = format!("/quizzes/{id}");
    let _: serde_json::Value =
      self.send(self.client.delete(self.url(&path)), &format!("DELETE {path}")).await?;
    Ok(())
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  /// `POST /api/quizzes/{id}/submissions`
  pub async fn save_submission(
    &self,
    quiz_id: QuizId,
    submission: &NewSubmission,
  ) -> Result<SubmissionId> {
    let path = format!("/quizzes/{quiz_id}/submissions");
    let created: Created = self
      .send(self.client.post(self.url(&path)).json(submission), &format!("POST {path}"))
      .await?;
    Ok(SubmissionId(created.id))
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET /api/metrics`
  pub async fn metrics(&self) -> Result<UserMetrics> {
    self.send(self.client.get(self.url("/metrics")), "GET /metrics").await
  }

  /// `GET /api/activity`
  pub async fn activity(&self) -> Result<Vec<DailyActivity>> {
    self.send(self.client.get(self.url("/activity")), "GET /activity").await
  }

  // ── Grading ───────────────────────────────────────────────────────────────

  /// `POST /api/evaluate`
  pub async fn evaluate(&self, request: &GradeRequest) -> Result<Grade> {
    self
      .send(self.client.post(self.url("/evaluate")).json(request), "POST /evaluate")
      .await
  }
}

/// Written and listening answers are graded by the server's grader.
impl Grader for ApiClient {
  type Error = ClientError;

  async fn grade(&self, request: &GradeRequest) -> Result<Grade> {
    self.evaluate(request).await
  }
}
