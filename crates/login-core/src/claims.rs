//! The claim set decoded from a verified ACM/IDM identity token.
//!
//! Claims are kept as the raw JSON object the provider sent. Every access
//! site goes through a named accessor so it is explicit which claim a piece
//! of the reconciliation depends on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// List of `<prefix>:<organisation code>` entries the user belongs to.
pub const ORGANIZATION_LIST_CLAIM: &str = "vo_orglijst";
pub const GIVEN_NAME_CLAIM: &str = "given_name";
pub const FAMILY_NAME_CLAIM: &str = "family_name";
pub const TARGET_GROUP_CODE_CLAIM: &str = "vo_doelgroepcode";
pub const TARGET_GROUP_NAME_CLAIM: &str = "vo_doelgroepnaam";

/// Configurable claim names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimNames {
  /// Claim holding the person's identifier (default `vo_id`).
  pub user_id:    String,
  /// Claim holding the account identifier (default `vo_id`).
  pub account_id: String,
  /// Claim whose values are copied onto the session as roles. No roles are
  /// attached when unset.
  pub roles:      Option<String>,
}

impl Default for ClaimNames {
  fn default() -> Self {
    Self {
      user_id:    "vo_id".to_owned(),
      account_id: "vo_id".to_owned(),
      roles:      None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
  /// A non-empty string claim.
  pub fn string(&self, name: &str) -> Option<&str> {
    self.0.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
  }

  /// A claim that may be sent either as a single string or as a list of
  /// strings. Empty strings and non-string entries are skipped.
  pub fn strings(&self, name: &str) -> Vec<&str> {
    match self.0.get(name) {
      Some(Value::String(s)) if !s.is_empty() => vec![s.as_str()],
      Some(Value::Array(items)) => items
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .collect(),
      _ => Vec::new(),
    }
  }

  pub fn user_id(&self, names: &ClaimNames) -> Option<&str> {
    self.string(&names.user_id)
  }

  pub fn account_id(&self, names: &ClaimNames) -> Option<&str> {
    self.string(&names.account_id)
  }

  /// The organisation code of the first entry of the organisation list, i.e.
  /// `"OVO001"` for `["pfx:OVO001", ...]`.
  ///
  /// Only the first entry is considered, and a configured group claim name
  /// is not consulted: the provider is expected to send exactly one
  /// organisation per login.
  pub fn group_identifier(&self) -> Option<&str> {
    self
      .0
      .get(ORGANIZATION_LIST_CLAIM)
      .and_then(Value::as_array)
      .and_then(|list| list.first())
      .and_then(Value::as_str)
      .and_then(|entry| entry.split_once(':'))
      .map(|(_, code)| code.split(':').next().unwrap_or(code))
      .filter(|code| !code.is_empty())
  }

  pub fn given_name(&self) -> Option<&str> { self.string(GIVEN_NAME_CLAIM) }

  pub fn family_name(&self) -> Option<&str> { self.string(FAMILY_NAME_CLAIM) }

  pub fn target_group_code(&self) -> Option<&str> {
    self.string(TARGET_GROUP_CODE_CLAIM)
  }

  pub fn target_group_name(&self) -> Option<&str> {
    self.string(TARGET_GROUP_NAME_CLAIM)
  }

  /// Role labels passed through from the configured role claim.
  pub fn roles(&self, names: &ClaimNames) -> Vec<String> {
    names
      .roles
      .as_deref()
      .map(|claim| self.strings(claim).into_iter().map(str::to_owned).collect())
      .unwrap_or_default()
  }
}

impl From<Map<String, Value>> for ClaimSet {
  fn from(claims: Map<String, Value>) -> Self { Self(claims) }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn claims(value: Value) -> ClaimSet {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn group_identifier_takes_code_of_first_entry() {
    let c = claims(json!({ "vo_orglijst": ["pfx:G1", "pfx:G2"] }));
    assert_eq!(c.group_identifier(), Some("G1"));
  }

  #[test]
  fn group_identifier_ignores_trailing_segments() {
    let c = claims(json!({ "vo_orglijst": ["pfx:G1:extra"] }));
    assert_eq!(c.group_identifier(), Some("G1"));
  }

  #[test]
  fn group_identifier_missing_cases() {
    for value in [
      json!({}),
      json!({ "vo_orglijst": [] }),
      json!({ "vo_orglijst": ["no-separator"] }),
      json!({ "vo_orglijst": ["pfx:"] }),
      json!({ "vo_orglijst": "pfx:G1" }),
      json!({ "vo_orglijst": [42] }),
    ] {
      assert_eq!(claims(value.clone()).group_identifier(), None, "{value}");
    }
  }

  #[test]
  fn configured_user_and_account_claims() {
    let c = claims(json!({ "vo_id": "u1", "sub": "s1" }));
    let names = ClaimNames {
      account_id: "sub".into(),
      ..ClaimNames::default()
    };
    assert_eq!(c.user_id(&names), Some("u1"));
    assert_eq!(c.account_id(&names), Some("s1"));
  }

  #[test]
  fn empty_string_counts_as_absent() {
    let c = claims(json!({ "vo_id": "", "given_name": "" }));
    assert_eq!(c.user_id(&ClaimNames::default()), None);
    assert_eq!(c.given_name(), None);
  }

  #[test]
  fn roles_accept_string_or_list() {
    let names = ClaimNames {
      roles: Some("rol".into()),
      ..ClaimNames::default()
    };
    assert_eq!(claims(json!({ "rol": "admin" })).roles(&names), vec!["admin"]);
    assert_eq!(
      claims(json!({ "rol": ["admin", "", "editor"] })).roles(&names),
      vec!["admin", "editor"]
    );
  }

  #[test]
  fn no_role_claim_configured_means_no_roles() {
    let c = claims(json!({ "rol": ["admin"] }));
    assert!(c.roles(&ClaimNames::default()).is_empty());
  }
}
