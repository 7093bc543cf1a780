//! OpenID Connect client for the ACM/IDM identity provider.
//!
//! [`OidcClient`] implements [`login_core::provider::IdentityProvider`]: it
//! discovers the provider once per process, trades an authorization code at
//! the token endpoint and verifies the returned ID token before handing its
//! claims to the caller. Discovery and the token request go through
//! `openidconnect`; the ID token signature is checked with `jsonwebtoken`.

mod client;
mod discovery;
mod http;
mod retry;
mod verify;

pub mod error;

pub use client::{OidcClient, OidcSettings};
pub use error::{Error, Result};
pub use http::TransportError;
