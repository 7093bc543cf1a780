//! ID token verification.
//!
//! Symmetric (`HS*`) tokens are signed with the client secret; asymmetric
//! tokens with a key from the provider's JWKS, selected by `kid`.

use jsonwebtoken::{
  Algorithm, DecodingKey, Header, Validation, decode, jwk::JwkSet,
};
use serde_json::{Map, Value};

use crate::{Error, Result};

fn is_symmetric(alg: Algorithm) -> bool {
  matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Pick the key the token in `header` was signed with.
pub fn select_key(
  header: &Header,
  client_secret: &str,
  jwks: &JwkSet,
) -> Result<DecodingKey> {
  if is_symmetric(header.alg) {
    return Ok(DecodingKey::from_secret(client_secret.as_bytes()));
  }

  let jwk = match header.kid.as_deref() {
    Some(kid) => jwks.find(kid),
    None => jwks.keys.first(),
  }
  .ok_or(Error::NoMatchingKey)?;

  Ok(DecodingKey::from_jwk(jwk)?)
}

/// Check signature, issuer, audience and expiry; return the claims.
pub fn verify(
  token: &str,
  key: &DecodingKey,
  alg: Algorithm,
  issuer: &str,
  audience: &str,
) -> Result<Map<String, Value>> {
  let mut validation = Validation::new(alg);
  validation.set_issuer(&[issuer]);
  validation.set_audience(&[audience]);
  let data = decode::<Map<String, Value>>(token, key, &validation)?;
  Ok(data.claims)
}

#[cfg(test)]
mod tests {
  use std::time::{SystemTime, UNIX_EPOCH};

  use jsonwebtoken::{EncodingKey, encode};
  use serde_json::json;

  use super::*;

  const SECRET: &str = "client-secret";

  fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
  }

  fn token(claims: Value) -> String {
    encode(
      &Header::new(Algorithm::HS256),
      &claims,
      &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
  }

  fn check(token: &str) -> Result<Map<String, Value>> {
    let header = jsonwebtoken::decode_header(token).unwrap();
    let key = select_key(&header, SECRET, &JwkSet { keys: Vec::new() })?;
    verify(token, &key, header.alg, "https://op.example", "client")
  }

  #[test]
  fn valid_token_yields_claims() {
    let t = token(json!({
      "iss": "https://op.example", "aud": "client", "exp": now() + 300,
      "vo_id": "u1",
    }));
    let claims = check(&t).unwrap();
    assert_eq!(claims["vo_id"], "u1");
  }

  #[test]
  fn wrong_audience_is_rejected() {
    let t = token(json!({
      "iss": "https://op.example", "aud": "someone-else", "exp": now() + 300,
    }));
    assert!(matches!(check(&t), Err(Error::Jwt(_))));
  }

  #[test]
  fn wrong_issuer_is_rejected() {
    let t = token(json!({
      "iss": "https://evil.example", "aud": "client", "exp": now() + 300,
    }));
    assert!(matches!(check(&t), Err(Error::Jwt(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let t = token(json!({
      "iss": "https://op.example", "aud": "client", "exp": now() - 3600,
    }));
    assert!(matches!(check(&t), Err(Error::Jwt(_))));
  }

  #[test]
  fn asymmetric_token_with_empty_key_set_has_no_key() {
    let header = Header::new(Algorithm::RS256);
    let jwks = JwkSet { keys: Vec::new() };
    assert!(matches!(
      select_key(&header, SECRET, &jwks),
      Err(Error::NoMatchingKey)
    ));
  }

  #[test]
  fn unknown_kid_has_no_key() {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("missing".into());
    let jwks = JwkSet { keys: Vec::new() };
    assert!(matches!(
      select_key(&header, SECRET, &jwks),
      Err(Error::NoMatchingKey)
    ));
  }
}
