use std::cmp::Reverse;

use chrono::Utc;

use crate::{
    access,
    api::{Condition, Error, FetchQuery, OrderType, RecordStore, Table, User, UserPatch},
    schema::{self, USER_FIELDS},
};

pub struct UserService<S> {
    store: S,
}

fn by_karma(mut users: Vec<User>) -> Vec<User> {
    users.sort_by_key(|u| Reverse(u.total_karma()));
    users
}

impl<S: RecordStore> UserService<S> {
    pub fn new(store: S) -> UserService<S> {
        UserService { store }
    }

    /// Highest total karma first, then newest
    pub async fn get_all(&self) -> Result<Vec<User>, Error> {
        let q = FetchQuery::new(USER_FIELDS).order("created_at", OrderType::Desc);
        Ok(by_karma(access::fetch(&self.store, &q).await?))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, Error> {
        let q = FetchQuery::new(USER_FIELDS)
            .filter(Condition::equal_to("username", username))
            .page(1, 0);
        access::fetch(&self.store, &q)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NameNotFound {
                table: Table::User,
                name: String::from(username),
            })
    }

    pub async fn create(&self, username: &str) -> Result<User, Error> {
        crate::api::validate_name(username)?;
        let outcome = access::create_one(
            &self.store,
            Table::User,
            schema::new_user_record(username, Utc::now()),
        )
        .await?;
        if !outcome.success {
            tracing::debug!(%username, ?outcome, "user creation rejected");
            return Err(Error::NameAlreadyUsed(String::from(username)));
        }
        access::created(outcome)
    }

    pub async fn update(&self, username: &str, patch: &UserPatch) -> Result<User, Error> {
        let user = self.get_by_username(username).await?;
        access::update_one(
            &self.store,
            Table::User,
            schema::user_patch_record(user.id, patch),
        )
        .await?;
        Ok(User {
            post_karma: patch.post_karma.unwrap_or(user.post_karma),
            comment_karma: patch.comment_karma.unwrap_or(user.comment_karma),
            ..user
        })
    }

    pub async fn delete(&self, username: &str) -> Result<(), Error> {
        let user = self.get_by_username(username).await?;
        tracing::debug!(%username, id = %user.id, "deleting user");
        access::delete_one(&self.store, Table::User, user.id.into()).await
    }

    /// Usernames containing `query`, highest total karma first
    pub async fn search(&self, query: &str) -> Result<Vec<User>, Error> {
        let q = FetchQuery::new(USER_FIELDS).filter(Condition::contains("username", query));
        Ok(by_karma(access::fetch(&self.store, &q).await?))
    }

    /// Each karma kind is floored at zero
    pub async fn update_karma(
        &self,
        username: &str,
        post_delta: i64,
        comment_delta: i64,
    ) -> Result<User, Error> {
        let user = self.get_by_username(username).await?;
        tracing::debug!(%username, post_delta, comment_delta, "updating karma");
        self.update(
            username,
            &UserPatch {
                post_karma: Some(access::floored(user.post_karma, post_delta)),
                comment_karma: Some(access::floored(user.comment_karma, comment_delta)),
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use agora_mock_server::{MockServer, Operation};

    use super::*;

    #[tokio::test]
    async fn usernames_are_unique() {
        let server = MockServer::new();
        let users = UserService::new(&server);
        let alice = users.create("alice").await.unwrap();
        assert_eq!(alice.total_karma(), 0);
        assert_eq!(
            users.create("alice").await,
            Err(Error::NameAlreadyUsed(String::from("alice")))
        );
        assert_eq!(
            users.create("al ice").await,
            Err(Error::InvalidName(String::from("al ice")))
        );
        assert_eq!(server.test_num_calls(Operation::Create), 2);
        assert_eq!(users.get_by_username("alice").await, Ok(alice));
    }

    #[tokio::test]
    async fn karma_is_floored_and_ranks_users() {
        let server = MockServer::new();
        let users = UserService::new(&server);
        for name in ["ann", "bea", "cid", "anton"] {
            users.create(name).await.unwrap();
        }
        let bea = users.update_karma("bea", 10, 3).await.unwrap();
        assert_eq!((bea.post_karma, bea.comment_karma), (10, 3));
        let bea = users.update_karma("bea", -20, 1).await.unwrap();
        assert_eq!((bea.post_karma, bea.comment_karma), (0, 4));
        users.update_karma("anton", 2, 0).await.unwrap();
        users.update_karma("cid", 0, 9).await.unwrap();
        assert_eq!(
            users.get_by_username("bea").await.unwrap().total_karma(),
            4
        );

        let names = |us: Vec<User>| us.into_iter().map(|u| u.username).collect::<Vec<_>>();
        let all = names(users.get_all().await.unwrap());
        assert_eq!(&all[..3], ["cid", "bea", "anton"]);
        assert_eq!(names(users.search("an").await.unwrap()), vec!["anton", "ann"]);
    }

    #[tokio::test]
    async fn missing_users() {
        let server = MockServer::new();
        let users = UserService::new(&server);
        let missing = Err(Error::NameNotFound {
            table: Table::User,
            name: String::from("ghost"),
        });
        assert_eq!(users.update_karma("ghost", 1, 1).await, missing);
        assert_eq!(users.delete("ghost").await, missing.map(|_: User| ()));
        users.create("ghost").await.unwrap();
        users.delete("ghost").await.unwrap();
        assert!(users.get_all().await.unwrap().is_empty());
    }
}
