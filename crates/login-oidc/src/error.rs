//! Error type for `login-oidc`.

use login_core::AuthFailure;
use openidconnect::{
  ConfigurationError, DiscoveryError, RequestTokenError, StandardErrorResponse,
  core::CoreErrorResponseType, reqwest,
};
use thiserror::Error;

use crate::http::TransportError;

/// Failure of a token endpoint call.
pub type TokenError =
  RequestTokenError<TransportError, StandardErrorResponse<CoreErrorResponseType>>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid url: {0}")]
  Url(#[from] url::ParseError),

  #[error("http client error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("discovery failed: {0}")]
  Discovery(#[from] DiscoveryError<TransportError>),

  #[error("provider metadata incomplete: {0}")]
  Configuration(#[from] ConfigurationError),

  #[error("token request failed: {0}")]
  Token(#[from] TokenError),

  #[error("malformed token set: {0}")]
  Json(#[from] serde_json::Error),

  #[error("token response carries no id_token")]
  MissingIdToken,

  #[error("no key in the provider key set matches the id token")]
  NoMatchingKey,

  #[error("id token rejected: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),
}

impl Error {
  /// Whether a fresh attempt may succeed: transport failures and 5xx.
  pub fn is_transient(&self) -> bool {
    matches!(
      self,
      Self::Discovery(DiscoveryError::Request(_)) | Self::Token(RequestTokenError::Request(_))
    )
  }
}

impl From<Error> for AuthFailure {
  fn from(e: Error) -> Self { AuthFailure(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
