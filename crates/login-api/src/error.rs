//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Errors are rendered as JSON:API error documents. Messages are fixed per
//! kind; the underlying cause is logged, never returned.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use login_core::Claim;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::document::respond;

/// An error returned by a session handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("session header is missing")]
  MissingHeader,

  #[error("authorization code is missing")]
  MissingField,

  #[error("invalid session")]
  InvalidSession,

  #[error("login failed")]
  AuthFailure,

  #[error("no user-group can be linked to the session")]
  Forbidden,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::MissingHeader | Self::MissingField | Self::InvalidSession => {
        StatusCode::BAD_REQUEST
      }
      Self::AuthFailure => StatusCode::UNAUTHORIZED,
      Self::Forbidden => StatusCode::FORBIDDEN,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn title(&self) -> &'static str {
    match self {
      Self::MissingHeader => "Session header is missing",
      Self::MissingField => "Authorization code is missing",
      Self::InvalidSession => "Invalid session",
      Self::AuthFailure => "Failed to login",
      Self::Forbidden => "User is not allowed to login",
      Self::Internal(_) => "Something went wrong",
    }
  }
}

impl From<login_core::Error> for ApiError {
  fn from(e: login_core::Error) -> Self {
    match e {
      login_core::Error::ClaimMissing(Claim::Group) => {
        warn!("login refused: {e}");
        Self::Forbidden
      }
      login_core::Error::ClaimMissing(_) => {
        warn!("login refused: {e}");
        Self::AuthFailure
      }
      login_core::Error::Auth(_) => Self::AuthFailure,
      login_core::Error::Store(e) => Self::Internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    if let Self::Internal(cause) = &self {
      error!(error = %cause, "request failed");
    }
    let status = self.status();
    let body = json!({
      "errors": [{ "status": status.as_u16().to_string(), "title": self.title() }]
    });
    respond(status, &body, matches!(self, Self::Forbidden))
  }
}
