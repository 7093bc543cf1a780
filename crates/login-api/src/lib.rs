//! HTTP surface of the login service.
//!
//! Exposes an axum [`Router`] backed by any [`GraphStore`] and any
//! [`IdentityProvider`]. The service sits behind an identifier that sets
//! `mu-session-id` on every request and a dispatcher that sets
//! `x-rewrite-url`.

pub mod document;
pub mod error;
pub mod headers;
pub mod sessions;


use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use login_core::{
  claims::ClaimNames,
  provider::IdentityProvider,
  resource::ResourceUris,
  store::GraphStore,
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub store:    Arc<S>,
  pub provider: Arc<P>,
  pub uris:     Arc<ResourceUris>,
  pub claims:   Arc<ClaimNames>,
}

impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      provider: self.provider.clone(),
      uris:     self.uris.clone(),
      claims:   self.claims.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the session router.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: GraphStore + 'static,
  P: IdentityProvider + 'static,
{
  Router::new()
    .route("/sessions", post(sessions::login::<S, P>))
    .route(
      "/sessions/current",
      get(sessions::current::<S, P>).delete(sessions::logout::<S, P>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
