//! Minting of resource URIs for newly created entities.

use uuid::Uuid;

/// Default namespace for every resource this service creates.
pub const DEFAULT_RESOURCE_BASE: &str = "http://themis.vlaanderen.be/";

/// Builds resource URIs under a configurable base, e.g.
/// `http://themis.vlaanderen.be/id/persoon/<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUris {
  base: String,
}

impl ResourceUris {
  /// `base` gets a trailing `/` if it does not have one.
  pub fn new(base: impl Into<String>) -> Self {
    let mut base = base.into();
    if !base.ends_with('/') {
      base.push('/');
    }
    Self { base }
  }

  pub fn group(&self, id: Uuid) -> String { self.mint("gebruikersgroep", id) }

  pub fn person(&self, id: Uuid) -> String { self.mint("persoon", id) }

  pub fn account(&self, id: Uuid) -> String { self.mint("account", id) }

  pub fn identifier(&self, id: Uuid) -> String {
    self.mint("identificator", id)
  }

  fn mint(&self, kind: &str, id: Uuid) -> String {
    format!("{}id/{kind}/{id}", self.base)
  }
}

impl Default for ResourceUris {
  fn default() -> Self { Self::new(DEFAULT_RESOURCE_BASE) }
}
