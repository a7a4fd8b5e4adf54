use chrono::Utc;

use crate::{
    access,
    api::{
        Community, CommunityId, CommunityPatch, Condition, Error, FetchQuery, NewCommunity,
        OrderType, RecordStore, Table, WhereGroup,
    },
    schema::{self, COMMUNITY_FIELDS},
};

pub struct CommunityService<S> {
    store: S,
}

impl<S: RecordStore> CommunityService<S> {
    pub fn new(store: S) -> CommunityService<S> {
        CommunityService { store }
    }

    /// Biggest communities first
    pub async fn get_all(&self) -> Result<Vec<Community>, Error> {
        let q = FetchQuery::new(COMMUNITY_FIELDS).order("member_count", OrderType::Desc);
        access::fetch(&self.store, &q).await
    }

    pub async fn get_by_id(&self, id: CommunityId) -> Result<Community, Error> {
        access::get(&self.store, id.into()).await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Community, Error> {
        let q = FetchQuery::new(COMMUNITY_FIELDS)
            .filter(Condition::equal_to("name", name))
            .page(1, 0);
        access::fetch(&self.store, &q)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NameNotFound {
                table: Table::Community,
                name: String::from(name),
            })
    }

    /// Joins or leaves the community, returning its refreshed data.
    ///
    /// The member count only changes when the subscription does, and never
    /// goes below zero.
    pub async fn subscribe(&self, id: CommunityId, subscribe: bool) -> Result<Community, Error> {
        let current = self.get_by_id(id).await?;
        let member_count = match (subscribe, current.is_subscribed) {
            (true, false) => access::floored(current.member_count, 1),
            (false, true) => access::floored(current.member_count, -1),
            _ => current.member_count,
        };
        tracing::debug!(%id, subscribe, member_count, "updating subscription");
        self.update(
            id,
            &CommunityPatch {
                is_subscribed: Some(subscribe),
                member_count: Some(member_count),
                ..CommunityPatch::default()
            },
        )
        .await
    }

    /// The creator is its first member
    pub async fn create(&self, community: &NewCommunity) -> Result<Community, Error> {
        community.validate()?;
        let name = community.normalized_name();
        let outcome = access::create_one(
            &self.store,
            Table::Community,
            schema::new_community_record(&name, &community.description, Utc::now()),
        )
        .await?;
        if !outcome.success {
            tracing::debug!(%name, ?outcome, "community creation rejected");
            return Err(Error::NameAlreadyUsed(name));
        }
        access::created(outcome)
    }

    /// Returns the refreshed community
    pub async fn update(&self, id: CommunityId, patch: &CommunityPatch) -> Result<Community, Error> {
        if let Some(n) = &patch.name {
            crate::api::validate_name(n)?;
        }
        if let Some(d) = &patch.description {
            crate::api::validate_string(d)?;
        }
        access::update_one(
            &self.store,
            Table::Community,
            schema::community_patch_record(id, patch),
        )
        .await?;
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: CommunityId) -> Result<(), Error> {
        tracing::debug!(%id, "deleting community");
        access::delete_one(&self.store, Table::Community, id.into()).await
    }

    /// Communities whose name or description contains `query`, biggest first
    pub async fn search(&self, query: &str) -> Result<Vec<Community>, Error> {
        let needle = query.to_lowercase();
        let q = FetchQuery::new(COMMUNITY_FIELDS)
            .group(WhereGroup::any(vec![
                Condition::contains("name", &needle),
                Condition::contains("description", &needle),
            ]))
            .order("member_count", OrderType::Desc);
        access::fetch(&self.store, &q).await
    }
}

#[cfg(test)]
mod tests {
    use agora_mock_server::MockServer;

    use super::*;

    fn community(name: &str, description: &str) -> NewCommunity {
        NewCommunity {
            name: String::from(name),
            description: String::from(description),
        }
    }

    #[tokio::test]
    async fn creation_normalizes_names() {
        let server = MockServer::new();
        let communities = CommunityService::new(&server);
        let c = communities
            .create(&community("Rust Lang", "The language"))
            .await
            .unwrap();
        assert_eq!(c.name, "rustlang");
        assert_eq!(c.member_count, 1);
        assert!(c.is_subscribed);
        assert_eq!(communities.get_by_name("rustlang").await, Ok(c));
        assert_eq!(
            communities.create(&community("rustLang", "again")).await,
            Err(Error::NameAlreadyUsed(String::from("rustlang")))
        );
        assert_eq!(
            communities.get_by_name("go").await,
            Err(Error::NameNotFound {
                table: Table::Community,
                name: String::from("go")
            })
        );
    }

    #[tokio::test]
    async fn subscriptions_adjust_member_count() {
        let server = MockServer::new();
        let communities = CommunityService::new(&server);
        let c = communities.create(&community("cats", "")).await.unwrap();

        // Already subscribed
        let c = communities.subscribe(c.id, true).await.unwrap();
        assert_eq!(c.member_count, 1);
        let c = communities.subscribe(c.id, false).await.unwrap();
        assert_eq!((c.member_count, c.is_subscribed), (0, false));
        let c = communities.subscribe(c.id, false).await.unwrap();
        assert_eq!(c.member_count, 0);

        // A subscribed community at zero members stays at zero
        communities
            .update(
                c.id,
                &CommunityPatch {
                    is_subscribed: Some(true),
                    ..CommunityPatch::default()
                },
            )
            .await
            .unwrap();
        let c = communities.subscribe(c.id, false).await.unwrap();
        assert_eq!(c.member_count, 0);
        let c = communities.subscribe(c.id, true).await.unwrap();
        assert_eq!((c.member_count, c.is_subscribed), (1, true));
    }

    #[tokio::test]
    async fn search_and_listing() {
        let server = MockServer::new();
        let communities = CommunityService::new(&server);
        let small = communities
            .create(&community("gardening", "Plants and Rust removal"))
            .await
            .unwrap();
        let big = communities
            .create(&community("rustaceans", "crabs"))
            .await
            .unwrap();
        communities.create(&community("cooking", "food")).await.unwrap();
        communities
            .update(
                big.id,
                &CommunityPatch {
                    member_count: Some(50),
                    ..CommunityPatch::default()
                },
            )
            .await
            .unwrap();

        let found = communities.search("RUST").await.unwrap();
        assert_eq!(
            found.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![big.id, small.id]
        );
        let all = communities.get_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, big.id);

        communities.delete(small.id).await.unwrap();
        assert_eq!(communities.search("rust").await.unwrap().len(), 1);
    }
}
