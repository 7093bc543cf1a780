//! Entities persisted in the graph store.
//!
//! Every entity carries an internal id (`mu:uuid`) and a resource URI. Links
//! between entities are expressed by URI, the way the graph stores them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Homepage recorded on every account this service provisions.
pub const SERVICE_HOMEPAGE: &str =
  "https://github.com/kanselarij/press-releases-acmidm-login-service";

// ─── Group ───────────────────────────────────────────────────────────────────

/// An organisation, shared across all data partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:         Uuid,
  pub uri:        String,
  /// Organisation code taken from the identity claims.
  pub identifier: String,
  pub created:    DateTime<Utc>,
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// Identifier sub-record attached to a person (`adms:Identifier`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
  pub id:       Uuid,
  pub uri:      String,
  /// The user identifier claim (`skos:notation`).
  pub notation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:          Uuid,
  pub uri:         String,
  pub identifier:  Identifier,
  pub first_name:  Option<String>,
  pub family_name: Option<String>,
  /// URI of the group the person was created in.
  pub member_of:   String,
}

// ─── Account ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub id:                Uuid,
  pub uri:               String,
  /// The account identifier claim.
  pub identifier:        String,
  /// URI of the owning person.
  pub owner:             String,
  pub service_homepage:  String,
  pub target_group_code: Option<String>,
  pub target_group_name: Option<String>,
  pub created:           DateTime<Utc>,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The caller-presented session identifier (`mu-session-id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSubject(String);

impl SessionSubject {
  pub fn new(subject: impl Into<String>) -> Self { Self(subject.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SessionSubject {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// One active login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub subject:  SessionSubject,
  pub id:       Uuid,
  /// URI of the logged-in account.
  pub account:  String,
  /// URI of the group the session was opened for.
  pub group:    String,
  pub roles:    Vec<String>,
  pub modified: DateTime<Utc>,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A session joined with the group it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSession {
  pub session: Session,
  pub group:   Group,
}

/// The account a session subject is logged in with, and its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAccount {
  pub account: Account,
  pub group:   Group,
}
