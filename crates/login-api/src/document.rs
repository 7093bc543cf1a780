//! The session resource document and response helpers.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use login_core::entity::Session;
use serde::Serialize;
use uuid::Uuid;

use crate::headers::{ALLOWED_GROUPS, CLEAR};

pub const JSON_API: &str = "application/vnd.api+json";

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionDocument {
  pub links:         Links,
  pub data:          SessionData,
  pub relationships: Relationships,
}

#[derive(Debug, Serialize)]
pub struct Links {
  #[serde(rename = "self")]
  pub self_link: String,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
  #[serde(rename = "type")]
  pub kind:       &'static str,
  pub id:         Uuid,
  pub attributes: SessionAttributes,
}

#[derive(Debug, Serialize)]
pub struct SessionAttributes {
  pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Relationships {
  pub account: Relationship,
  pub group:   Relationship,
}

#[derive(Debug, Serialize)]
pub struct Relationship {
  pub links: RelatedLink,
  pub data:  ResourceIdentifier,
}

#[derive(Debug, Serialize)]
pub struct RelatedLink {
  pub related: String,
}

#[derive(Debug, Serialize)]
pub struct ResourceIdentifier {
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub id:   Uuid,
}

impl Relationship {
  fn new(kind: &'static str, id: Uuid) -> Self {
    Self {
      links: RelatedLink { related: format!("/{kind}/{id}") },
      data:  ResourceIdentifier { kind, id },
    }
  }
}

impl SessionDocument {
  pub fn new(
    self_link: String,
    session: &Session,
    account_id: Uuid,
    group_id: Uuid,
  ) -> Self {
    Self {
      links:         Links { self_link },
      data:          SessionData {
        kind:       "sessions",
        id:         session.id,
        attributes: SessionAttributes { roles: session.roles.clone() },
      },
      relationships: Relationships {
        account: Relationship::new("accounts", account_id),
        group:   Relationship::new("groups", group_id),
      },
    }
  }
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// A JSON:API response, optionally telling the identifier to drop its
/// cached authorization groups.
pub fn respond<T: Serialize>(status: StatusCode, body: &T, clear: bool) -> Response {
  let mut res = (status, Json(body)).into_response();
  res
    .headers_mut()
    .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_API));
  if clear {
    res.headers_mut().insert(ALLOWED_GROUPS, HeaderValue::from_static(CLEAR));
  }
  res
}

/// An empty response carrying the clear-groups header.
pub fn no_content_cleared() -> Response {
  let mut res = StatusCode::NO_CONTENT.into_response();
  res.headers_mut().insert(ALLOWED_GROUPS, HeaderValue::from_static(CLEAR));
  res
}
