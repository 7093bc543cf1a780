//! Integration tests for `SqliteStore` against an in-memory database,
//! including the reconciliation and session lifecycle running on top of it.

use chrono::Utc;
use login_core::{
  Claim, Error as CoreError,
  claims::{ClaimNames, ClaimSet},
  entity::{Group, SessionSubject},
  partition::Partition,
  reconcile::Reconciler,
  resource::ResourceUris,
  session::SessionManager,
  store::GraphStore,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{SqliteStore, StoreStats};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn claims(value: Value) -> ClaimSet {
  serde_json::from_value(value).expect("claim object")
}

fn ann() -> ClaimSet {
  claims(json!({
    "vo_id":       "u1",
    "vo_orglijst": ["pfx:G1"],
    "given_name":  "Ann",
  }))
}

fn group(identifier: &str) -> Group {
  let id = Uuid::new_v4();
  Group {
    id,
    uri: ResourceUris::default().group(id),
    identifier: identifier.into(),
    created: Utc::now(),
  }
}

// ─── Raw store ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_group() {
  let s = store().await;
  let g = group("G1");
  s.insert_group(Partition::Public, &g).await.unwrap();

  let found = s.find_group(Partition::Public, "G1").await.unwrap().unwrap();
  assert_eq!(found.id, g.id);
  assert_eq!(found.uri, g.uri);

  let by_uri = s.find_group_by_uri(Partition::Public, &g.uri).await.unwrap();
  assert_eq!(by_uri.map(|g| g.id), Some(g.id));
}

#[tokio::test]
async fn find_group_missing_returns_none() {
  let s = store().await;
  assert!(s.find_group(Partition::Public, "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn partitions_are_isolated() {
  let s = store().await;
  let g = group("G1");
  s.insert_group(Partition::Public, &g).await.unwrap();

  let other = Partition::Organization(Uuid::new_v4());
  assert!(s.find_group(other, "G1").await.unwrap().is_none());
  assert!(s.find_group(Partition::Sessions, "G1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_sessions_counts_rows() {
  let s = store().await;
  let subject = SessionSubject::new("http://mu.semte.ch/sessions/a");
  assert_eq!(s.delete_sessions(Partition::Sessions, &subject).await.unwrap(), 0);
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn first_login_provisions_group_person_and_account() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let g = r.ensure_group(&ann()).await.unwrap();
  assert_eq!(g.identifier, "G1");
  assert!(g.uri.starts_with("http://themis.vlaanderen.be/id/gebruikersgroep/"));

  let account = r.ensure_user_and_account(&ann(), &g).await.unwrap();
  assert_eq!(account.identifier, "u1");
  assert_eq!(
    account.service_homepage,
    "https://github.com/kanselarij/press-releases-acmidm-login-service"
  );

  let org = Partition::Organization(g.id);
  let person = s.find_person(org, "u1").await.unwrap().unwrap();
  assert_eq!(person.first_name.as_deref(), Some("Ann"));
  assert_eq!(person.family_name, None);
  assert_eq!(person.member_of, g.uri);
  assert_eq!(account.owner, person.uri);

  // People and accounts never leak into the shared partition.
  assert!(s.find_person(Partition::Public, "u1").await.unwrap().is_none());
}

#[tokio::test]
async fn reconciliation_is_idempotent() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let g1 = r.ensure_group(&ann()).await.unwrap();
  let a1 = r.ensure_user_and_account(&ann(), &g1).await.unwrap();
  let g2 = r.ensure_group(&ann()).await.unwrap();
  let a2 = r.ensure_user_and_account(&ann(), &g2).await.unwrap();

  assert_eq!(g1.id, g2.id);
  assert_eq!(a1.id, a2.id);
  let p = s
    .find_person(Partition::Organization(g1.id), "u1")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(a2.owner, p.uri);
}

#[tokio::test]
async fn existing_records_are_not_updated() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let g = r.ensure_group(&ann()).await.unwrap();
  r.ensure_user_and_account(&ann(), &g).await.unwrap();

  let renamed = claims(json!({
    "vo_id": "u1", "vo_orglijst": ["pfx:G1"], "given_name": "Anna",
  }));
  r.ensure_user_and_account(&renamed, &g).await.unwrap();

  let p = s
    .find_person(Partition::Organization(g.id), "u1")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(p.first_name.as_deref(), Some("Ann"));
}

#[tokio::test]
async fn classification_codes_copied_onto_account() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let c = claims(json!({
    "vo_id": "u2",
    "vo_orglijst": ["pfx:G1"],
    "family_name": "Peeters",
    "vo_doelgroepcode": "GID",
    "vo_doelgroepnaam": "Gemeente",
  }));
  let g = r.ensure_group(&c).await.unwrap();
  let a = r.ensure_user_and_account(&c, &g).await.unwrap();

  let stored = s
    .find_account_by_uri(Partition::Organization(g.id), &a.uri)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.target_group_code.as_deref(), Some("GID"));
  assert_eq!(stored.target_group_name.as_deref(), Some("Gemeente"));
}

#[tokio::test]
async fn missing_group_claim_creates_nothing() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let c = claims(json!({ "vo_id": "u1", "vo_orglijst": [] }));
  let err = r.ensure_group(&c).await.unwrap_err();
  assert!(matches!(err, CoreError::ClaimMissing(Claim::Group)));
  assert_eq!(s.stats().await.unwrap(), StoreStats::default());
}

#[tokio::test]
async fn stats_count_rows_across_partitions() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let c2 = claims(json!({ "vo_id": "u1", "vo_orglijst": ["pfx:G2"] }));
  for c in [ann(), c2] {
    let g = r.ensure_group(&c).await.unwrap();
    r.ensure_user_and_account(&c, &g).await.unwrap();
  }

  let stats = s.stats().await.unwrap();
  assert_eq!(stats, StoreStats { groups: 2, people: 2, accounts: 2, sessions: 0 });
}

#[tokio::test]
async fn missing_user_claim_is_reported() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let c = claims(json!({ "vo_orglijst": ["pfx:G1"] }));
  let g = r.ensure_group(&c).await.unwrap();
  let err = r.ensure_user_and_account(&c, &g).await.unwrap_err();
  assert!(matches!(err, CoreError::ClaimMissing(Claim::User)));
}

#[tokio::test]
async fn missing_configured_account_claim_is_reported() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames { account_id: "sub".into(), ..ClaimNames::default() };
  let r = Reconciler::new(&s, &uris, &names);

  let g = r.ensure_group(&ann()).await.unwrap();
  let err = r.ensure_user_and_account(&ann(), &g).await.unwrap_err();
  assert!(matches!(err, CoreError::ClaimMissing(Claim::Account)));

  let stats = s.stats().await.unwrap();
  assert_eq!((stats.groups, stats.accounts), (1, 0));
}

#[tokio::test]
async fn same_user_in_two_groups_gets_two_people() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);

  let c1 = ann();
  let c2 = claims(json!({ "vo_id": "u1", "vo_orglijst": ["pfx:G2"] }));
  let g1 = r.ensure_group(&c1).await.unwrap();
  let g2 = r.ensure_group(&c2).await.unwrap();
  let a1 = r.ensure_user_and_account(&c1, &g1).await.unwrap();
  let a2 = r.ensure_user_and_account(&c2, &g2).await.unwrap();

  assert_ne!(g1.id, g2.id);
  assert_ne!(a1.id, a2.id);
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_current_session_round_trip() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);
  let m = SessionManager::new(&s);

  let g = r.ensure_group(&ann()).await.unwrap();
  let a = r.ensure_user_and_account(&ann(), &g).await.unwrap();
  let subject = SessionSubject::new("http://mu.semte.ch/sessions/1");

  let created = m
    .create_session(&subject, &a, &g, vec!["editor".into(), "admin".into(), "editor".into()])
    .await
    .unwrap();
  assert_eq!(created.roles, vec!["editor", "admin"]);

  let current = m.current_session_for(&a.uri).await.unwrap().unwrap();
  assert_eq!(current.session.id, created.id);
  assert_eq!(current.group.id, g.id);
  let mut roles = current.session.roles.clone();
  roles.sort();
  assert_eq!(roles, vec!["admin", "editor"]);
}

#[tokio::test]
async fn session_without_roles_has_empty_role_list() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);
  let m = SessionManager::new(&s);

  let g = r.ensure_group(&ann()).await.unwrap();
  let a = r.ensure_user_and_account(&ann(), &g).await.unwrap();
  let subject = SessionSubject::new("http://mu.semte.ch/sessions/1");
  m.create_session(&subject, &a, &g, Vec::new()).await.unwrap();

  let current = m.current_session_for(&a.uri).await.unwrap().unwrap();
  assert!(current.session.roles.is_empty());
}

#[tokio::test]
async fn relogin_leaves_exactly_one_session() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);
  let m = SessionManager::new(&s);

  let subject = SessionSubject::new("http://mu.semte.ch/sessions/1");
  let mut ids = Vec::new();
  for _ in 0..2 {
    m.invalidate_sessions_for(&subject).await.unwrap();
    let g = r.ensure_group(&ann()).await.unwrap();
    let a = r.ensure_user_and_account(&ann(), &g).await.unwrap();
    ids.push(m.create_session(&subject, &a, &g, Vec::new()).await.unwrap().id);
  }

  assert_ne!(ids[0], ids[1]);
  assert_eq!(s.delete_sessions(Partition::Sessions, &subject).await.unwrap(), 1);
}

#[tokio::test]
async fn account_for_session_follows_group_partition() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);
  let m = SessionManager::new(&s);

  let g = r.ensure_group(&ann()).await.unwrap();
  let a = r.ensure_user_and_account(&ann(), &g).await.unwrap();
  let subject = SessionSubject::new("http://mu.semte.ch/sessions/1");
  m.create_session(&subject, &a, &g, Vec::new()).await.unwrap();

  let resolved = m.account_for_session(&subject).await.unwrap().unwrap();
  assert_eq!(resolved.account.id, a.id);
  assert_eq!(resolved.group.id, g.id);
}

#[tokio::test]
async fn logout_clears_session() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);
  let m = SessionManager::new(&s);

  let g = r.ensure_group(&ann()).await.unwrap();
  let a = r.ensure_user_and_account(&ann(), &g).await.unwrap();
  let subject = SessionSubject::new("http://mu.semte.ch/sessions/1");
  m.create_session(&subject, &a, &g, vec!["admin".into()]).await.unwrap();

  assert_eq!(m.invalidate_sessions_for(&subject).await.unwrap(), 1);
  assert!(m.account_for_session(&subject).await.unwrap().is_none());
  assert!(m.current_session_for(&a.uri).await.unwrap().is_none());
}

#[tokio::test]
async fn session_with_dangling_group_does_not_resolve() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);
  let m = SessionManager::new(&s);

  let g = r.ensure_group(&ann()).await.unwrap();
  let a = r.ensure_user_and_account(&ann(), &g).await.unwrap();
  let subject = SessionSubject::new("http://mu.semte.ch/sessions/1");
  let unknown = group("G-unknown");
  m.create_session(&subject, &a, &unknown, Vec::new()).await.unwrap();

  assert!(m.account_for_session(&subject).await.unwrap().is_none());
  assert!(m.current_session_for(&a.uri).await.unwrap().is_none());
}

#[tokio::test]
async fn current_session_prefers_latest_subject() {
  let s = store().await;
  let uris = ResourceUris::default();
  let names = ClaimNames::default();
  let r = Reconciler::new(&s, &uris, &names);
  let m = SessionManager::new(&s);

  let g = r.ensure_group(&ann()).await.unwrap();
  let a = r.ensure_user_and_account(&ann(), &g).await.unwrap();
  let first = SessionSubject::new("http://mu.semte.ch/sessions/1");
  let second = SessionSubject::new("http://mu.semte.ch/sessions/2");
  m.create_session(&first, &a, &g, Vec::new()).await.unwrap();
  let latest = m.create_session(&second, &a, &g, Vec::new()).await.unwrap();

  let current = m.current_session_for(&a.uri).await.unwrap().unwrap();
  assert_eq!(current.session.id, latest.id);
  assert_eq!(current.session.subject, second);
}
