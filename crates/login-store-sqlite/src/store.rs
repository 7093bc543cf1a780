//! [`SqliteStore`]: the SQLite implementation of [`GraphStore`].

use std::path::Path;

use login_core::{
  entity::{Account, Group, Person, Session, SessionSubject},
  partition::Partition,
  store::GraphStore,
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Result,
  encode::{
    RawAccount, RawGroup, RawPerson, RawSession, encode_dt, encode_partition,
    encode_roles, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Row counts across every partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
  pub groups:   u64,
  pub people:   u64,
  pub accounts: u64,
  pub sessions: u64,
}

/// A login graph store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Count the stored rows of each kind.
  pub async fn stats(&self) -> Result<StoreStats> {
    let stats = self
      .conn
      .call(|conn| {
        let count = |table: &str| -> rusqlite::Result<u64> {
          let n: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
          Ok(n as u64)
        };
        Ok(StoreStats {
          groups:   count("user_groups")?,
          people:   count("people")?,
          accounts: count("accounts")?,
          sessions: count("sessions")?,
        })
      })
      .await?;
    Ok(stats)
  }

  /// Run a single-row query; `None` if nothing matches.
  async fn query_opt<T, F>(
    &self,
    sql: String,
    params: Vec<String>,
    map: F,
  ) -> Result<Option<T>>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(params.iter()), map)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  /// Run an insert/delete; returns the number of affected rows.
  async fn execute(
    &self,
    sql: &'static str,
    params: Vec<Option<String>>,
  ) -> Result<usize> {
    let affected = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params))?))
      .await?;
    Ok(affected)
  }
}

// ─── GraphStore impl ─────────────────────────────────────────────────────────

impl GraphStore for SqliteStore {
  type Error = crate::Error;

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn find_group(
    &self,
    partition: Partition,
    identifier: &str,
  ) -> Result<Option<Group>> {
    let raw = self
      .query_opt(
        format!(
          "SELECT {} FROM user_groups WHERE partition = ?1 AND identifier = ?2
           ORDER BY rowid LIMIT 1",
          RawGroup::COLUMNS
        ),
        vec![encode_partition(partition), identifier.to_owned()],
        RawGroup::from_row,
      )
      .await?;
    raw.map(RawGroup::into_group).transpose()
  }

  async fn find_group_by_uri(
    &self,
    partition: Partition,
    uri: &str,
  ) -> Result<Option<Group>> {
    let raw = self
      .query_opt(
        format!(
          "SELECT {} FROM user_groups WHERE partition = ?1 AND uri = ?2
           ORDER BY rowid LIMIT 1",
          RawGroup::COLUMNS
        ),
        vec![encode_partition(partition), uri.to_owned()],
        RawGroup::from_row,
      )
      .await?;
    raw.map(RawGroup::into_group).transpose()
  }

  async fn insert_group(&self, partition: Partition, group: &Group) -> Result<()> {
    self
      .execute(
        "INSERT INTO user_groups (id, partition, uri, identifier, created)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          Some(encode_uuid(group.id)),
          Some(encode_partition(partition)),
          Some(group.uri.clone()),
          Some(group.identifier.clone()),
          Some(encode_dt(group.created)),
        ],
      )
      .await?;
    Ok(())
  }

  // ── People ────────────────────────────────────────────────────────────────

  async fn find_person(
    &self,
    partition: Partition,
    user_id: &str,
  ) -> Result<Option<Person>> {
    let raw = self
      .query_opt(
        format!(
          "SELECT {} FROM people WHERE partition = ?1 AND notation = ?2
           ORDER BY rowid LIMIT 1",
          RawPerson::COLUMNS
        ),
        vec![encode_partition(partition), user_id.to_owned()],
        RawPerson::from_row,
      )
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn insert_person(&self, partition: Partition, person: &Person) -> Result<()> {
    self
      .execute(
        "INSERT INTO people (
           id, partition, uri, identifier_id, identifier_uri, notation,
           first_name, family_name, member_of
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        vec![
          Some(encode_uuid(person.id)),
          Some(encode_partition(partition)),
          Some(person.uri.clone()),
          Some(encode_uuid(person.identifier.id)),
          Some(person.identifier.uri.clone()),
          Some(person.identifier.notation.clone()),
          person.first_name.clone(),
          person.family_name.clone(),
          Some(person.member_of.clone()),
        ],
      )
      .await?;
    Ok(())
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn find_account(
    &self,
    partition: Partition,
    person_uri: &str,
    identifier: &str,
  ) -> Result<Option<Account>> {
    let raw = self
      .query_opt(
        format!(
          "SELECT {} FROM accounts
           WHERE partition = ?1 AND owner = ?2 AND identifier = ?3
           ORDER BY rowid LIMIT 1",
          RawAccount::COLUMNS
        ),
        vec![
          encode_partition(partition),
          person_uri.to_owned(),
          identifier.to_owned(),
        ],
        RawAccount::from_row,
      )
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_account_by_uri(
    &self,
    partition: Partition,
    uri: &str,
  ) -> Result<Option<Account>> {
    let raw = self
      .query_opt(
        format!(
          "SELECT {} FROM accounts WHERE partition = ?1 AND uri = ?2
           ORDER BY rowid LIMIT 1",
          RawAccount::COLUMNS
        ),
        vec![encode_partition(partition), uri.to_owned()],
        RawAccount::from_row,
      )
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn insert_account(&self, partition: Partition, account: &Account) -> Result<()> {
    self
      .execute(
        "INSERT INTO accounts (
           id, partition, uri, identifier, owner, service_homepage,
           target_group_code, target_group_name, created
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        vec![
          Some(encode_uuid(account.id)),
          Some(encode_partition(partition)),
          Some(account.uri.clone()),
          Some(account.identifier.clone()),
          Some(account.owner.clone()),
          Some(account.service_homepage.clone()),
          account.target_group_code.clone(),
          account.target_group_name.clone(),
          Some(encode_dt(account.created)),
        ],
      )
      .await?;
    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, partition: Partition, session: &Session) -> Result<()> {
    self
      .execute(
        "INSERT INTO sessions (id, partition, subject, account, session_group, roles, modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        vec![
          Some(encode_uuid(session.id)),
          Some(encode_partition(partition)),
          Some(session.subject.as_str().to_owned()),
          Some(session.account.clone()),
          Some(session.group.clone()),
          Some(encode_roles(&session.roles)?),
          Some(encode_dt(session.modified)),
        ],
      )
      .await?;
    Ok(())
  }

  async fn find_session(
    &self,
    partition: Partition,
    subject: &SessionSubject,
  ) -> Result<Option<Session>> {
    let raw = self
      .query_opt(
        format!(
          "SELECT {} FROM sessions WHERE partition = ?1 AND subject = ?2
           ORDER BY modified DESC, rowid DESC LIMIT 1",
          RawSession::COLUMNS
        ),
        vec![encode_partition(partition), subject.as_str().to_owned()],
        RawSession::from_row,
      )
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  async fn find_latest_session_for_account(
    &self,
    partition: Partition,
    account_uri: &str,
  ) -> Result<Option<Session>> {
    let raw = self
      .query_opt(
        format!(
          "SELECT {} FROM sessions WHERE partition = ?1 AND account = ?2
           ORDER BY modified DESC, rowid DESC LIMIT 1",
          RawSession::COLUMNS
        ),
        vec![encode_partition(partition), account_uri.to_owned()],
        RawSession::from_row,
      )
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_sessions(
    &self,
    partition: Partition,
    subject: &SessionSubject,
  ) -> Result<usize> {
    let removed = self
      .execute(
        "DELETE FROM sessions WHERE partition = ?1 AND subject = ?2",
        vec![
          Some(encode_partition(partition)),
          Some(subject.as_str().to_owned()),
        ],
      )
      .await?;
    debug!(%subject, removed, "deleted session rows");
    Ok(removed)
  }
}
