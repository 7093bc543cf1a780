//! Issuer resolution for OpenID discovery.

use openidconnect::IssuerUrl;
use url::Url;

use crate::Result;

const WELL_KNOWN_SUFFIX: &str = "/.well-known/openid-configuration";

/// The issuer behind `configured`.
///
/// Accepts the issuer URL itself or its full discovery document URL. The
/// discovered metadata must name exactly this issuer.
pub fn issuer_url(configured: &Url) -> Result<IssuerUrl> {
  let url = configured.as_str();
  let issuer = url.strip_suffix(WELL_KNOWN_SUFFIX).unwrap_or(url);
  Ok(IssuerUrl::new(issuer.to_owned())?)
}
