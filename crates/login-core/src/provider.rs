//! The `IdentityProvider` trait, implemented by `login-oidc`.

use std::future::Future;

use crate::{AuthFailure, claims::ClaimSet};

/// Trades a one-time authorization code for the claims of a verified
/// identity token.
pub trait IdentityProvider: Send + Sync {
  /// Every failure (network, timeout, provider rejection, verification)
  /// is reported as [`AuthFailure`].
  fn exchange_code<'a>(
    &'a self,
    authorization_code: &'a str,
  ) -> impl Future<Output = Result<ClaimSet, AuthFailure>> + Send + 'a;
}
