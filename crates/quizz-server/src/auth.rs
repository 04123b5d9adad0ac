//! HTTP Basic authentication.
//!
//! Accounts come from the server config; a verified username becomes the
//! caller's [`Principal`], which the middleware hands to the API handlers as
//! a request extension.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header::AUTHORIZATION},
  middleware::Next,
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use quizz_core::id::Principal;
use rand_core::OsRng;

use crate::error::Error;

/// A username and the argon2 PHC string (`$argon2id$v=19$…`) of its password.
#[derive(Clone)]
pub struct Credential {
  pub username:      String,
  pub password_hash: String,
}

#[derive(Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Credential>,
}

impl AuthConfig {
  /// The principal for `username` if `password` matches its stored hash.
  pub fn verify(&self, username: &str, password: &str) -> Option<Principal> {
    let account = self.accounts.iter().find(|a| a.username == username)?;
    let hash = PasswordHash::new(&account.password_hash).ok()?;
    Argon2::default()
      .verify_password(password.as_bytes(), &hash)
      .ok()
      .map(|()| Principal::new(username))
  }
}

/// Hash `password` with a fresh salt into a PHC string for the config file.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Split an `Authorization: Basic …` value into username and password.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
  let (user, pass) = decoded.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Principal, Error> {
  let (username, password) = basic_credentials(headers).ok_or(Error::Unauthorized)?;
  config.verify(&username, &password).ok_or(Error::Unauthorized)
}

/// Reject requests without valid credentials; otherwise attach the
/// [`Principal`].
pub async fn require_auth(
  State(auth): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let principal = verify_auth(req.headers(), &auth).inspect_err(|_| {
    tracing::debug!(path = %req.uri().path(), "rejected unauthenticated request");
  })?;
  req.extensions_mut().insert(principal);
  Ok(next.run(req).await)
}
