//! [`OidcClient`]: discovery, code redemption and ID token verification.

use std::time::Duration;

use jsonwebtoken::{
  decode_header,
  jwk::{Jwk, JwkSet},
};
use login_core::{AuthFailure, claims::ClaimSet, provider::IdentityProvider};
use openidconnect::{
  AuthorizationCode, ClientId, ClientSecret, RedirectUrl, TokenResponse as _,
  core::{CoreClient, CoreProviderMetadata},
};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  Error, Result,
  discovery::issuer_url,
  http::Transport,
  retry::RetryPolicy,
  verify,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);
pub const DEFAULT_RETRIES: u32 = 2;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Everything needed to talk to the provider as a registered client.
#[derive(Debug, Clone)]
pub struct OidcSettings {
  pub discovery_url:  Url,
  pub client_id:      String,
  pub client_secret:  String,
  pub redirect_uri:   String,
  /// Per-request timeout.
  pub timeout:        Duration,
  /// Attempts after the first one, for transient failures only.
  pub retries:        u32,
  /// Log raw token responses at debug level.
  pub log_token_sets: bool,
}

impl OidcSettings {
  pub fn new(
    discovery_url: Url,
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
    redirect_uri: impl Into<String>,
  ) -> Self {
    Self {
      discovery_url,
      client_id: client_id.into(),
      client_secret: client_secret.into(),
      redirect_uri: redirect_uri.into(),
      timeout: DEFAULT_TIMEOUT,
      retries: DEFAULT_RETRIES,
      log_token_sets: false,
    }
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

struct Provider {
  metadata: CoreProviderMetadata,
  /// The published signing keys, as `jsonwebtoken` reads them.
  keys:     JwkSet,
}

/// OpenID Connect relying party for a single provider.
///
/// Provider metadata and the signing key set are fetched on first use and
/// kept for the lifetime of the client.
pub struct OidcClient {
  settings: OidcSettings,
  http:     Transport,
  retry:    RetryPolicy,
  provider: OnceCell<Provider>,
}

impl OidcClient {
  pub fn new(settings: OidcSettings) -> Result<Self> {
    let http = Transport::new(settings.timeout)?;
    let retry = RetryPolicy::with_retries(settings.retries);
    Ok(Self {
      settings,
      http,
      retry,
      provider: OnceCell::new(),
    })
  }

  async fn provider(&self) -> Result<&Provider> {
    self
      .provider
      .get_or_try_init(|| async {
        let issuer = issuer_url(&self.settings.discovery_url)?;
        let metadata = self
          .retry
          .run("discovery", || async {
            Ok(CoreProviderMetadata::discover_async(issuer.clone(), &self.http).await?)
          })
          .await?;
        let keys = signing_keys(&metadata);
        info!(
          issuer = %metadata.issuer().as_str(),
          keys = keys.keys.len(),
          "discovered identity provider"
        );
        Ok::<_, Error>(Provider { metadata, keys })
      })
      .await
  }

  /// Provider metadata, fetched on the first call.
  pub async fn discover(&self) -> Result<&CoreProviderMetadata> {
    Ok(&self.provider().await?.metadata)
  }

  /// Redeem `code` at the token endpoint and return the raw ID token.
  async fn redeem(&self, provider: &Provider, code: &str) -> Result<String> {
    let client = CoreClient::from_provider_metadata(
      provider.metadata.clone(),
      ClientId::new(self.settings.client_id.clone()),
      Some(ClientSecret::new(self.settings.client_secret.clone())),
    )
    .set_redirect_uri(RedirectUrl::new(self.settings.redirect_uri.clone())?);

    let response = self
      .retry
      .run("token", || async {
        let request = client.exchange_code(AuthorizationCode::new(code.to_owned()))?;
        Ok(request.request_async(&self.http).await?)
      })
      .await?;

    if self.settings.log_token_sets {
      debug!(token_set = %serde_json::to_string(&response)?, "received token set");
    }

    let id_token = response.id_token().ok_or(Error::MissingIdToken)?;
    Ok(id_token.to_string())
  }

  /// Trade an authorization code for the verified claims of its ID token.
  /// The token's nonce is not checked.
  pub async fn exchange(&self, code: &str) -> Result<ClaimSet> {
    let provider = self.provider().await?;
    let id_token = self.redeem(provider, code).await?;

    let header = decode_header(&id_token)?;
    let key = verify::select_key(&header, &self.settings.client_secret, &provider.keys)?;
    let claims = verify::verify(
      &id_token,
      &key,
      header.alg,
      provider.metadata.issuer().as_str(),
      &self.settings.client_id,
    )?;
    Ok(ClaimSet::from(claims))
  }
}

/// Published keys `jsonwebtoken` can use; keys it cannot read are skipped.
fn signing_keys(metadata: &CoreProviderMetadata) -> JwkSet {
  let keys = metadata
    .jwks()
    .keys()
    .iter()
    .filter_map(|key| serde_json::to_value(key).ok())
    .filter_map(|value| serde_json::from_value::<Jwk>(value).ok())
    .collect();
  JwkSet { keys }
}

impl IdentityProvider for OidcClient {
  async fn exchange_code(
    &self,
    authorization_code: &str,
  ) -> Result<ClaimSet, AuthFailure> {
    self.exchange(authorization_code).await.map_err(|e| {
      warn!(error = %e, "authorization code exchange failed");
      AuthFailure::from(e)
    })
  }
}

#[cfg(test)]
impl OidcClient {
  fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
    self.retry.initial_backoff = initial;
    self.retry.max_backoff = max;
    self
  }
}
