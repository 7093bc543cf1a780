//! Headers exchanged with the identifier and dispatcher in front of the
//! service.

use axum::http::HeaderMap;
use login_core::entity::SessionSubject;

use crate::error::ApiError;

/// The session the identifier attached to the request.
pub const SESSION_ID: &str = "mu-session-id";
/// The URL the dispatcher received before rewriting.
pub const REWRITE_URL: &str = "x-rewrite-url";
/// Authorization groups of the session, as cached by the identifier.
pub const ALLOWED_GROUPS: &str = "mu-auth-allowed-groups";
pub const CLEAR: &str = "CLEAR";

const DEFAULT_SELF_LINK: &str = "/sessions/current";

pub fn session_subject(headers: &HeaderMap) -> Result<SessionSubject, ApiError> {
  headers
    .get(SESSION_ID)
    .and_then(|v| v.to_str().ok())
    .filter(|s| !s.is_empty())
    .map(SessionSubject::new)
    .ok_or(ApiError::MissingHeader)
}

/// The `self` link of the current-session resource.
///
/// `after_login` marks a response to `POST /sessions`, whose rewrite URL is
/// the collection rather than the current session.
pub fn self_link(headers: &HeaderMap, after_login: bool) -> String {
  let Some(url) = headers.get(REWRITE_URL).and_then(|v| v.to_str().ok()) else {
    return DEFAULT_SELF_LINK.to_owned();
  };
  let url = url.trim_end_matches('/');
  if after_login {
    format!("{url}/current")
  } else {
    url.to_owned()
  }
}
