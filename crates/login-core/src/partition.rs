//! Data partitions of the graph store.
//!
//! Groups live in a shared partition, people and accounts in one partition
//! per organisation, sessions in a dedicated partition. Call sites name the
//! partition through this type; the graph URI is derived in one place.

use std::fmt;

use uuid::Uuid;

const PUBLIC_GRAPH: &str = "http://mu.semte.ch/graphs/public";
const SESSIONS_GRAPH: &str = "http://mu.semte.ch/graphs/sessions";
const ORGANIZATION_GRAPH_BASE: &str = "http://mu.semte.ch/graphs/organizations/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
  /// Shared by every organisation; holds the groups.
  Public,
  /// Holds the session records.
  Sessions,
  /// Holds the people and accounts of the group with this id.
  Organization(Uuid),
}

impl Partition {
  /// The graph URI this partition is stored under.
  pub fn graph_uri(&self) -> String {
    match self {
      Self::Public => PUBLIC_GRAPH.to_owned(),
      Self::Sessions => SESSIONS_GRAPH.to_owned(),
      Self::Organization(id) => format!("{ORGANIZATION_GRAPH_BASE}{id}"),
    }
  }
}

impl fmt::Display for Partition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.graph_uri())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn organization_graph_is_keyed_by_group_id() {
    let id = Uuid::new_v4();
    let p = Partition::Organization(id);
    assert_eq!(p.graph_uri(), format!("http://mu.semte.ch/graphs/organizations/{id}"));
  }

  #[test]
  fn partitions_use_distinct_graphs() {
    let a = Partition::Organization(Uuid::new_v4());
    let b = Partition::Organization(Uuid::new_v4());
    let graphs = [Partition::Public, Partition::Sessions, a, b].map(|p| p.graph_uri());
    for (i, g) in graphs.iter().enumerate() {
      assert!(!graphs[i + 1..].contains(g), "{g} is shared");
    }
    assert_eq!(Partition::Sessions.to_string(), Partition::Sessions.graph_uri());
  }
}
