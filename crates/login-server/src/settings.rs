//! Server configuration.
//!
//! Values come from an optional TOML file, overridden by `MU_APPLICATION_*`
//! environment variables and the unprefixed request tuning variables
//! (`REQUEST_TIMEOUT`, `REQUEST_RETRIES`, `DEBUG_LOG_TOKENSETS`). Everything
//! is validated once, before the server starts.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  time::Duration,
};

use login_core::{claims::ClaimNames, resource::DEFAULT_RESOURCE_BASE};
use login_oidc::OidcSettings;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

const ENV_PREFIX: &str = "MU_APPLICATION";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 80;
const DEFAULT_STORE_PATH: &str = "graph.db";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2500;
const DEFAULT_REQUEST_RETRIES: u32 = 2;

/// Unprefixed variables and the configuration keys they set.
const UNPREFIXED: [(&str, &str); 3] = [
  ("REQUEST_TIMEOUT", "request_timeout"),
  ("REQUEST_RETRIES", "request_retries"),
  ("DEBUG_LOG_TOKENSETS", "debug_log_tokensets"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("environment variable(s) {} must be configured", .0.join(", "))]
  Missing(Vec<&'static str>),

  #[error("{var} is invalid: {reason}")]
  Invalid { var: &'static str, reason: String },

  #[error(transparent)]
  Source(#[from] config::ConfigError),
}

// ─── Raw ─────────────────────────────────────────────────────────────────────

/// Configuration as read, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
  host:                 Option<String>,
  port:                 Option<u16>,
  store_path:           Option<PathBuf>,
  auth_discovery_url:   Option<String>,
  auth_client_id:       Option<String>,
  auth_client_secret:   Option<String>,
  auth_redirect_uri:    Option<String>,
  auth_userid_claim:    Option<String>,
  auth_accountid_claim: Option<String>,
  auth_groupid_claim:   Option<String>,
  auth_role_claim:      Option<String>,
  resource_base_uri:    Option<String>,
  request_timeout:      Option<u64>,
  request_retries:      Option<u32>,
  debug_log_tokensets:  Option<bool>,
}

// ─── Validated ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  pub oidc:          OidcSettings,
  pub claims:        ClaimNames,
  pub resource_base: String,
}

impl ServerConfig {
  /// Load from `file` (if given) and the variables in `vars`.
  pub fn load(
    file: Option<&Path>,
    vars: HashMap<String, String>,
  ) -> Result<Self, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    builder = builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars.clone())));
    for (var, key) in UNPREFIXED {
      builder = builder.set_override_option(key, vars.get(var).cloned())?;
    }

    let raw: RawConfig = builder.build()?.try_deserialize()?;
    Self::validate(raw)
  }

  fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
    let mut missing = Vec::new();
    let mut required = |value: Option<String>, var: &'static str| {
      let value = value.filter(|v| !v.is_empty());
      if value.is_none() {
        missing.push(var);
      }
      value.unwrap_or_default()
    };
    let discovery_url = required(raw.auth_discovery_url, "MU_APPLICATION_AUTH_DISCOVERY_URL");
    let client_id = required(raw.auth_client_id, "MU_APPLICATION_AUTH_CLIENT_ID");
    let client_secret = required(raw.auth_client_secret, "MU_APPLICATION_AUTH_CLIENT_SECRET");
    let redirect_uri = required(raw.auth_redirect_uri, "MU_APPLICATION_AUTH_REDIRECT_URI");
    if !missing.is_empty() {
      return Err(ConfigError::Missing(missing));
    }

    let discovery_url = Url::parse(&discovery_url).map_err(|e| ConfigError::Invalid {
      var:    "MU_APPLICATION_AUTH_DISCOVERY_URL",
      reason: e.to_string(),
    })?;
    let timeout_ms = raw.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
    if timeout_ms == 0 {
      return Err(ConfigError::Invalid {
        var:    "REQUEST_TIMEOUT",
        reason: "must be a positive number of milliseconds".into(),
      });
    }

    if let Some(claim) = raw.auth_groupid_claim.filter(|c| !c.is_empty()) {
      warn!(
        claim = %claim,
        "MU_APPLICATION_AUTH_GROUPID_CLAIM is not supported; the group is \
         taken from the first vo_orglijst entry"
      );
    }

    let defaults = ClaimNames::default();
    let claims = ClaimNames {
      user_id:    raw.auth_userid_claim.unwrap_or(defaults.user_id),
      account_id: raw.auth_accountid_claim.unwrap_or(defaults.account_id),
      roles:      raw.auth_role_claim.filter(|c| !c.is_empty()),
    };

    let mut oidc = OidcSettings::new(discovery_url, client_id, client_secret, redirect_uri);
    oidc.timeout = Duration::from_millis(timeout_ms);
    oidc.retries = raw.request_retries.unwrap_or(DEFAULT_REQUEST_RETRIES);
    oidc.log_token_sets = raw.debug_log_tokensets.unwrap_or(false);

    Ok(Self {
      host: raw.host.unwrap_or_else(|| DEFAULT_HOST.to_owned()),
      port: raw.port.unwrap_or(DEFAULT_PORT),
      store_path: raw
        .store_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
      oidc,
      claims,
      resource_base: raw
        .resource_base_uri
        .unwrap_or_else(|| DEFAULT_RESOURCE_BASE.to_owned()),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  fn required() -> Vec<(&'static str, &'static str)> {
    vec![
      (
        "MU_APPLICATION_AUTH_DISCOVERY_URL",
        "https://authenticatie.vlaanderen.be/op",
      ),
      ("MU_APPLICATION_AUTH_CLIENT_ID", "client"),
      ("MU_APPLICATION_AUTH_CLIENT_SECRET", "secret"),
      ("MU_APPLICATION_AUTH_REDIRECT_URI", "https://app/authorization/callback"),
    ]
  }

  #[test]
  fn defaults_apply() {
    let cfg = ServerConfig::load(None, vars(&required())).unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 80);
    assert_eq!(cfg.store_path, PathBuf::from("graph.db"));
    assert_eq!(cfg.resource_base, DEFAULT_RESOURCE_BASE);
    assert_eq!(cfg.claims, ClaimNames::default());
    assert_eq!(cfg.oidc.client_id, "client");
    assert_eq!(cfg.oidc.timeout, Duration::from_millis(2500));
    assert_eq!(cfg.oidc.retries, 2);
    assert!(!cfg.oidc.log_token_sets);
  }

  #[test]
  fn all_missing_variables_are_reported() {
    let mut v = required();
    v.retain(|(k, _)| !k.ends_with("CLIENT_ID") && !k.ends_with("REDIRECT_URI"));
    match ServerConfig::load(None, vars(&v)) {
      Err(ConfigError::Missing(names)) => assert_eq!(
        names,
        vec!["MU_APPLICATION_AUTH_CLIENT_ID", "MU_APPLICATION_AUTH_REDIRECT_URI"]
      ),
      other => panic!("expected missing variables, got {other:?}"),
    }
  }

  #[test]
  fn invalid_discovery_url() {
    let mut v = required();
    v[0].1 = "not a url";
    assert!(matches!(
      ServerConfig::load(None, vars(&v)),
      Err(ConfigError::Invalid { var: "MU_APPLICATION_AUTH_DISCOVERY_URL", .. })
    ));
  }

  #[test]
  fn overrides_are_read() {
    let mut v = required();
    v.extend([
      ("MU_APPLICATION_AUTH_USERID_CLAIM", "sub"),
      ("MU_APPLICATION_AUTH_ROLE_CLAIM", "dkb_kaleidos_rol_3d"),
      ("MU_APPLICATION_RESOURCE_BASE_URI", "http://example.org/"),
      ("REQUEST_TIMEOUT", "5000"),
      ("REQUEST_RETRIES", "0"),
      ("DEBUG_LOG_TOKENSETS", "true"),
    ]);
    let cfg = ServerConfig::load(None, vars(&v)).unwrap();
    assert_eq!(cfg.claims.user_id, "sub");
    assert_eq!(cfg.claims.account_id, "vo_id");
    assert_eq!(cfg.claims.roles.as_deref(), Some("dkb_kaleidos_rol_3d"));
    assert_eq!(cfg.resource_base, "http://example.org/");
    assert_eq!(cfg.oidc.timeout, Duration::from_millis(5000));
    assert_eq!(cfg.oidc.retries, 0);
    assert!(cfg.oidc.log_token_sets);
  }

  #[test]
  fn zero_timeout_is_invalid() {
    let mut v = required();
    v.push(("REQUEST_TIMEOUT", "0"));
    assert!(matches!(
      ServerConfig::load(None, vars(&v)),
      Err(ConfigError::Invalid { var: "REQUEST_TIMEOUT", .. })
    ));
  }

  #[test]
  fn non_numeric_retries_is_rejected() {
    let mut v = required();
    v.push(("REQUEST_RETRIES", "many"));
    assert!(ServerConfig::load(None, vars(&v)).is_err());
  }
}
