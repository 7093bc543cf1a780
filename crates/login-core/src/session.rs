//! Session lifecycle: at most one live session per session subject.
//!
//! A login first clears every session of the subject and then creates a new
//! one. The two steps are ordered but not atomic; a failure in between
//! leaves the subject logged out.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result,
  entity::{Account, CurrentSession, Group, Session, SessionAccount, SessionSubject},
  partition::Partition,
  store::GraphStore,
};

pub struct SessionManager<'a, S> {
  store: &'a S,
}

impl<'a, S: GraphStore> SessionManager<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Delete every session of `subject`, whether or not it carries roles.
  pub async fn invalidate_sessions_for(
    &self,
    subject: &SessionSubject,
  ) -> Result<usize> {
    let removed = self
      .store
      .delete_sessions(Partition::Sessions, subject)
      .await
      .map_err(Error::store)?;
    if removed > 0 {
      info!(%subject, removed, "removed sessions");
    }
    Ok(removed)
  }

  /// Record a new session of `subject` for `account` in `group`.
  ///
  /// Duplicate roles are dropped, keeping the first occurrence.
  pub async fn create_session(
    &self,
    subject: &SessionSubject,
    account: &Account,
    group: &Group,
    roles: Vec<String>,
  ) -> Result<Session> {
    let mut unique: Vec<String> = Vec::with_capacity(roles.len());
    for role in roles {
      if !unique.contains(&role) {
        unique.push(role);
      }
    }

    let session = Session {
      subject:  subject.clone(),
      id:       Uuid::new_v4(),
      account:  account.uri.clone(),
      group:    group.uri.clone(),
      roles:    unique,
      modified: Utc::now(),
    };
    self
      .store
      .insert_session(Partition::Sessions, &session)
      .await
      .map_err(Error::store)?;

    info!(%subject, session = %session.id, account = %account.uri, "created session");
    Ok(session)
  }

  /// The live session of `account_uri`, joined with its group.
  ///
  /// When the account has sessions under several subjects the most recently
  /// modified one wins. A session whose group cannot be found does not
  /// count.
  pub async fn current_session_for(
    &self,
    account_uri: &str,
  ) -> Result<Option<CurrentSession>> {
    let Some(session) = self
      .store
      .find_latest_session_for_account(Partition::Sessions, account_uri)
      .await
      .map_err(Error::store)?
    else {
      debug!(account = account_uri, "no session for account");
      return Ok(None);
    };

    let group = self
      .store
      .find_group_by_uri(Partition::Public, &session.group)
      .await
      .map_err(Error::store)?;

    Ok(group.map(|group| CurrentSession { session, group }))
  }

  /// Resolve the account a subject is logged in with.
  ///
  /// Follows session → group (public partition) → account (the group's
  /// partition); any missing link yields `None`.
  pub async fn account_for_session(
    &self,
    subject: &SessionSubject,
  ) -> Result<Option<SessionAccount>> {
    let Some(session) = self
      .store
      .find_session(Partition::Sessions, subject)
      .await
      .map_err(Error::store)?
    else {
      debug!(%subject, "no session for subject");
      return Ok(None);
    };

    let Some(group) = self
      .store
      .find_group_by_uri(Partition::Public, &session.group)
      .await
      .map_err(Error::store)?
    else {
      debug!(%subject, group = %session.group, "session group not found");
      return Ok(None);
    };

    let account = self
      .store
      .find_account_by_uri(Partition::Organization(group.id), &session.account)
      .await
      .map_err(Error::store)?;

    Ok(account.map(|account| SessionAccount { account, group }))
  }
}
