//! Find-or-create of the group, person and account behind a login.
//!
//! The first successful login of a user self-provisions the whole chain;
//! later logins find every level and leave it untouched. Each level is
//! looked up before it is inserted, without any lock or uniqueness check:
//! two concurrent first logins for the same identifiers can both miss and
//! both insert. Nothing is rolled back when a later level fails.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Claim, Error, Result,
  claims::{ClaimNames, ClaimSet},
  entity::{Account, Group, Identifier, Person, SERVICE_HOMEPAGE},
  partition::Partition,
  resource::ResourceUris,
  store::GraphStore,
};

pub struct Reconciler<'a, S> {
  store: &'a S,
  uris:  &'a ResourceUris,
  names: &'a ClaimNames,
}

impl<'a, S: GraphStore> Reconciler<'a, S> {
  pub fn new(store: &'a S, uris: &'a ResourceUris, names: &'a ClaimNames) -> Self {
    Self { store, uris, names }
  }

  // ── Group ─────────────────────────────────────────────────────────────

  /// Find or create the group named by the claims, in the public partition.
  ///
  /// Fails with [`Claim::Group`] before touching the store if no
  /// organisation can be read from the claims.
  pub async fn ensure_group(&self, claims: &ClaimSet) -> Result<Group> {
    let identifier = claims
      .group_identifier()
      .ok_or(Error::ClaimMissing(Claim::Group))?;

    if let Some(group) = self
      .store
      .find_group(Partition::Public, identifier)
      .await
      .map_err(Error::store)?
    {
      debug!(group = %group.uri, identifier, "found user group");
      return Ok(group);
    }

    let id = Uuid::new_v4();
    let group = Group {
      id,
      uri: self.uris.group(id),
      identifier: identifier.to_owned(),
      created: Utc::now(),
    };
    self
      .store
      .insert_group(Partition::Public, &group)
      .await
      .map_err(Error::store)?;

    info!(group = %group.uri, identifier, "created user group");
    Ok(group)
  }

  // ── Person + account ──────────────────────────────────────────────────

  /// Find or create the person and its account inside the partition of
  /// `group`.
  pub async fn ensure_user_and_account(
    &self,
    claims: &ClaimSet,
    group: &Group,
  ) -> Result<Account> {
    let partition = Partition::Organization(group.id);
    let person = self.ensure_person(claims, group, partition).await?;
    self.ensure_account(claims, &person, partition).await
  }

  async fn ensure_person(
    &self,
    claims: &ClaimSet,
    group: &Group,
    partition: Partition,
  ) -> Result<Person> {
    let user_id = claims
      .user_id(self.names)
      .ok_or(Error::ClaimMissing(Claim::User))?;

    if let Some(person) = self
      .store
      .find_person(partition, user_id)
      .await
      .map_err(Error::store)?
    {
      debug!(person = %person.uri, "found person");
      return Ok(person);
    }

    let id = Uuid::new_v4();
    let identifier_id = Uuid::new_v4();
    let person = Person {
      id,
      uri: self.uris.person(id),
      identifier: Identifier {
        id:       identifier_id,
        uri:      self.uris.identifier(identifier_id),
        notation: user_id.to_owned(),
      },
      first_name: claims.given_name().map(str::to_owned),
      family_name: claims.family_name().map(str::to_owned),
      member_of: group.uri.clone(),
    };
    self
      .store
      .insert_person(partition, &person)
      .await
      .map_err(Error::store)?;

    info!(person = %person.uri, %partition, "created person");
    Ok(person)
  }

  async fn ensure_account(
    &self,
    claims: &ClaimSet,
    person: &Person,
    partition: Partition,
  ) -> Result<Account> {
    let account_id = claims
      .account_id(self.names)
      .ok_or(Error::ClaimMissing(Claim::Account))?;

    if let Some(account) = self
      .store
      .find_account(partition, &person.uri, account_id)
      .await
      .map_err(Error::store)?
    {
      debug!(account = %account.uri, "found account");
      return Ok(account);
    }

    let id = Uuid::new_v4();
    let account = Account {
      id,
      uri: self.uris.account(id),
      identifier: account_id.to_owned(),
      owner: person.uri.clone(),
      service_homepage: SERVICE_HOMEPAGE.to_owned(),
      target_group_code: claims.target_group_code().map(str::to_owned),
      target_group_name: claims.target_group_name().map(str::to_owned),
      created: Utc::now(),
    };
    self
      .store
      .insert_account(partition, &account)
      .await
      .map_err(Error::store)?;

    info!(account = %account.uri, person = %person.uri, "created account");
    Ok(account)
  }
}
