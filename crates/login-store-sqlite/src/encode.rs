//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with a fixed microsecond precision so
//! that they sort lexicographically. Roles are stored as a compact JSON
//! array. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use login_core::{
  entity::{Account, Group, Identifier, Person, Session, SessionSubject},
  partition::Partition,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Partition ────────────────────────────────────────────────────────────────

pub fn encode_partition(p: Partition) -> String { p.graph_uri() }

// ─── Roles ────────────────────────────────────────────────────────────────────

pub fn encode_roles(roles: &[String]) -> Result<String> {
  Ok(serde_json::to_string(roles)?)
}

pub fn decode_roles(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `user_groups` row.
pub struct RawGroup {
  pub id:         String,
  pub uri:        String,
  pub identifier: String,
  pub created:    String,
}

impl RawGroup {
  pub const COLUMNS: &'static str = "id, uri, identifier, created";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      uri:        row.get(1)?,
      identifier: row.get(2)?,
      created:    row.get(3)?,
    })
  }

  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      id:         decode_uuid(&self.id)?,
      uri:        self.uri,
      identifier: self.identifier,
      created:    decode_dt(&self.created)?,
    })
  }
}

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub id:             String,
  pub uri:            String,
  pub identifier_id:  String,
  pub identifier_uri: String,
  pub notation:       String,
  pub first_name:     Option<String>,
  pub family_name:    Option<String>,
  pub member_of:      String,
}

impl RawPerson {
  pub const COLUMNS: &'static str = "id, uri, identifier_id, identifier_uri, notation, \
                                     first_name, family_name, member_of";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      uri:            row.get(1)?,
      identifier_id:  row.get(2)?,
      identifier_uri: row.get(3)?,
      notation:       row.get(4)?,
      first_name:     row.get(5)?,
      family_name:    row.get(6)?,
      member_of:      row.get(7)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          decode_uuid(&self.id)?,
      uri:         self.uri,
      identifier:  Identifier {
        id:       decode_uuid(&self.identifier_id)?,
        uri:      self.identifier_uri,
        notation: self.notation,
      },
      first_name:  self.first_name,
      family_name: self.family_name,
      member_of:   self.member_of,
    })
  }
}

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub id:                String,
  pub uri:               String,
  pub identifier:        String,
  pub owner:             String,
  pub service_homepage:  String,
  pub target_group_code: Option<String>,
  pub target_group_name: Option<String>,
  pub created:           String,
}

impl RawAccount {
  pub const COLUMNS: &'static str = "id, uri, identifier, owner, service_homepage, \
                                     target_group_code, target_group_name, created";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      uri:               row.get(1)?,
      identifier:        row.get(2)?,
      owner:             row.get(3)?,
      service_homepage:  row.get(4)?,
      target_group_code: row.get(5)?,
      target_group_name: row.get(6)?,
      created:           row.get(7)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:                decode_uuid(&self.id)?,
      uri:               self.uri,
      identifier:        self.identifier,
      owner:             self.owner,
      service_homepage:  self.service_homepage,
      target_group_code: self.target_group_code,
      target_group_name: self.target_group_name,
      created:           decode_dt(&self.created)?,
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub id:       String,
  pub subject:  String,
  pub account:  String,
  pub group:    String,
  pub roles:    String,
  pub modified: String,
}

impl RawSession {
  pub const COLUMNS: &'static str =
    "id, subject, account, session_group, roles, modified";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      subject:  row.get(1)?,
      account:  row.get(2)?,
      group:    row.get(3)?,
      roles:    row.get(4)?,
      modified: row.get(5)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      subject:  SessionSubject::new(self.subject),
      id:       decode_uuid(&self.id)?,
      account:  self.account,
      group:    self.group,
      roles:    decode_roles(&self.roles)?,
      modified: decode_dt(&self.modified)?,
    })
  }
}
