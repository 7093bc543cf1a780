//! Handlers for `/sessions` endpoints.
//!
//! | Method   | Path                | Notes |
//! |----------|---------------------|-------|
//! | `POST`   | `/sessions`         | Body: `{"authorizationCode":"…"}`; 201 |
//! | `GET`    | `/sessions/current` | 400 if the subject has no session |
//! | `DELETE` | `/sessions/current` | 204; 400 if the subject has no session |

use axum::{
  body::Bytes,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::Response,
};
use login_core::{
  provider::IdentityProvider,
  reconcile::Reconciler,
  session::SessionManager,
  store::GraphStore,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
  AppState,
  document::{SessionDocument, no_content_cleared, respond},
  error::ApiError,
  headers::{self_link, session_subject},
};

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
  #[serde(default)]
  pub authorization_code: Option<String>,
}

/// The authorization code from a login body; unparseable bodies count as
/// missing the code.
fn authorization_code(body: &[u8]) -> Result<String, ApiError> {
  let body: LoginBody = serde_json::from_slice(body).unwrap_or_default();
  body
    .authorization_code
    .filter(|code| !code.is_empty())
    .ok_or(ApiError::MissingField)
}

/// `POST /sessions`
pub async fn login<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: GraphStore,
  P: IdentityProvider,
{
  let subject = session_subject(&headers)?;
  let code = authorization_code(&body)?;

  let claims = state.provider.exchange_code(&code).await.map_err(|e| {
    info!(%subject, error = %e, "login failed");
    ApiError::AuthFailure
  })?;

  let sessions = SessionManager::new(state.store.as_ref());
  sessions.invalidate_sessions_for(&subject).await?;

  let reconciler = Reconciler::new(state.store.as_ref(), &state.uris, &state.claims);
  let group = reconciler.ensure_group(&claims).await?;
  let account = reconciler.ensure_user_and_account(&claims, &group).await?;
  let roles = claims.roles(&state.claims);

  let session = sessions
    .create_session(&subject, &account, &group, roles)
    .await?;

  let doc = SessionDocument::new(self_link(&headers, true), &session, account.id, group.id);
  Ok(respond(StatusCode::CREATED, &doc, true))
}

// ─── Logout ───────────────────────────────────────────────────────────────────

/// `DELETE /sessions/current`
pub async fn logout<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: GraphStore,
  P: IdentityProvider,
{
  let subject = session_subject(&headers)?;
  let sessions = SessionManager::new(state.store.as_ref());

  if sessions.account_for_session(&subject).await?.is_none() {
    debug!(%subject, "logout without a valid session");
    return Err(ApiError::InvalidSession);
  }

  sessions.invalidate_sessions_for(&subject).await?;
  Ok(no_content_cleared())
}

// ─── Current ──────────────────────────────────────────────────────────────────

/// `GET /sessions/current`
pub async fn current<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: GraphStore,
  P: IdentityProvider,
{
  let subject = session_subject(&headers)?;
  let sessions = SessionManager::new(state.store.as_ref());

  let login = sessions
    .account_for_session(&subject)
    .await?
    .ok_or(ApiError::InvalidSession)?;
  let current = sessions
    .current_session_for(&login.account.uri)
    .await?
    .ok_or(ApiError::InvalidSession)?;

  let doc = SessionDocument::new(
    self_link(&headers, false),
    &current.session,
    login.account.id,
    current.group.id,
  );
  Ok(respond(StatusCode::OK, &doc, false))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn code_is_read_from_camel_case_field() {
    assert_eq!(
      authorization_code(br#"{"authorizationCode":"abc"}"#).unwrap(),
      "abc"
    );
  }

  #[test]
  fn empty_missing_or_garbled_code_is_missing() {
    for body in [&br#"{"authorizationCode":""}"#[..], b"{}", b"", b"not json"] {
      assert!(matches!(authorization_code(body), Err(ApiError::MissingField)));
    }
  }
}
