//! The `GraphStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `login-store-sqlite`).
//! Every operation names the [`Partition`] it reads from or writes to; the
//! reconciler and the session manager decide which partition that is.
//!
//! The interface is deliberately narrow: pattern lookups by natural key,
//! plain inserts, and delete-by-subject. Backends are not required to
//! enforce uniqueness of natural keys.

use std::future::Future;

use crate::{
  entity::{Account, Group, Person, Session, SessionSubject},
  partition::Partition,
};

/// Abstraction over the graph store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GraphStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Groups ────────────────────────────────────────────────────────────

  /// Find a group by its organisation code.
  fn find_group<'a>(
    &'a self,
    partition: Partition,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + 'a;

  fn find_group_by_uri<'a>(
    &'a self,
    partition: Partition,
    uri: &'a str,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + 'a;

  fn insert_group<'a>(
    &'a self,
    partition: Partition,
    group: &'a Group,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── People ────────────────────────────────────────────────────────────

  /// Find a person through the notation of its identifier sub-record.
  fn find_person<'a>(
    &'a self,
    partition: Partition,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Insert a person together with its identifier sub-record.
  fn insert_person<'a>(
    &'a self,
    partition: Partition,
    person: &'a Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Find the account of `person_uri` carrying `identifier`.
  fn find_account<'a>(
    &'a self,
    partition: Partition,
    person_uri: &'a str,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn find_account_by_uri<'a>(
    &'a self,
    partition: Partition,
    uri: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn insert_account<'a>(
    &'a self,
    partition: Partition,
    account: &'a Account,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn insert_session<'a>(
    &'a self,
    partition: Partition,
    session: &'a Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The most recently modified session recorded for `subject`.
  fn find_session<'a>(
    &'a self,
    partition: Partition,
    subject: &'a SessionSubject,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// The most recently modified session linked to `account_uri`.
  fn find_latest_session_for_account<'a>(
    &'a self,
    partition: Partition,
    account_uri: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Delete every session recorded for `subject`; returns how many.
  fn delete_sessions<'a>(
    &'a self,
    partition: Partition,
    subject: &'a SessionSubject,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
