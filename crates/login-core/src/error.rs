//! Error types for `login-core`.

use std::fmt;

use thiserror::Error;

/// The identity claims the reconciler cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
  /// The organisation the user logs in for.
  Group,
  /// The stable identifier of the person.
  User,
  /// The identifier of the person's account within this application.
  Account,
}

impl fmt::Display for Claim {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Group => "user-group",
      Self::User => "user identifier",
      Self::Account => "account identifier",
    })
  }
}

/// The identity provider refused or failed to hand out a verified token.
///
/// The message is meant for logs; callers at the HTTP boundary only see a
/// generic login failure.
#[derive(Debug, Error)]
#[error("authentication failed: {0}")]
pub struct AuthFailure(pub String);

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot determine {0} from received claims")]
  ClaimMissing(Claim),

  #[error(transparent)]
  Auth(#[from] AuthFailure),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error coming out of a [`crate::store::GraphStore`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
