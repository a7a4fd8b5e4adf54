use chrono::Utc;

use crate::{
    access,
    api::{
        Condition, Error, FetchQuery, NewPost, OrderType, Post, PostId, PostPatch, PostType,
        RecordStore, Table, Tally, Vote,
    },
    schema::{self, POST_FIELDS},
    vote,
};

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PostFilter {
    pub community: Option<String>,
    pub post_type: Option<PostType>,
    /// 1-based, defaults to the first page
    pub page: Option<usize>,
    /// Defaults to `DEFAULT_PAGE_SIZE`
    pub limit: Option<usize>,
}

impl PostFilter {
    fn query(&self) -> FetchQuery {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let page = self.page.unwrap_or(1).max(1);
        let mut q = FetchQuery::new(POST_FIELDS)
            .order("created_at", OrderType::Desc)
            .page(limit, (page - 1).saturating_mul(limit));
        if let Some(c) = &self.community {
            q = q.filter(Condition::equal_to("community_name", c.as_str()));
        }
        if let Some(t) = self.post_type {
            q = q.filter(Condition::equal_to("post_type", t.as_str()));
        }
        q
    }
}

pub struct PostService<S> {
    store: S,
}

impl<S: RecordStore> PostService<S> {
    pub fn new(store: S) -> PostService<S> {
        PostService { store }
    }

    /// Newest first
    pub async fn get_all(&self, filter: &PostFilter) -> Result<Vec<Post>, Error> {
        tracing::debug!(?filter, "listing posts");
        access::fetch(&self.store, &filter.query()).await
    }

    pub async fn get_by_id(&self, id: PostId) -> Result<Post, Error> {
        access::get(&self.store, id.into()).await
    }

    /// Newest first
    pub async fn get_by_user(&self, username: &str) -> Result<Vec<Post>, Error> {
        let q = FetchQuery::new(POST_FIELDS)
            .filter(Condition::equal_to("author_username", username))
            .order("created_at", OrderType::Desc);
        access::fetch(&self.store, &q).await
    }

    pub async fn create(&self, post: &NewPost) -> Result<Post, Error> {
        post.validate()?;
        tracing::debug!(title = %post.title, community = %post.community_name, "creating post");
        let outcome = access::create_one(
            &self.store,
            Table::Post,
            schema::new_post_record(post, Utc::now()),
        )
        .await?;
        access::created(outcome)
    }

    /// Returns the tally now in the store
    pub async fn vote(&self, id: PostId, requested: Vote) -> Result<Tally, Error> {
        vote::store_vote(&self.store, Table::Post, id.into(), requested).await
    }

    pub async fn update(&self, id: PostId, patch: &PostPatch) -> Result<(), Error> {
        patch.validate()?;
        access::update_one(
            &self.store,
            Table::Post,
            schema::post_patch_record(id, patch),
        )
        .await
    }

    pub async fn delete(&self, id: PostId) -> Result<(), Error> {
        tracing::debug!(%id, "deleting post");
        access::delete_one(&self.store, Table::Post, id.into()).await
    }

    /// Returns the new comment count, which never goes below zero
    pub async fn update_comment_count(&self, id: PostId, delta: i64) -> Result<u32, Error> {
        let post = self.get_by_id(id).await?;
        let comment_count = access::floored(post.comment_count, delta);
        self.update(
            id,
            &PostPatch {
                comment_count: Some(comment_count),
                ..PostPatch::default()
            },
        )
        .await?;
        Ok(comment_count)
    }
}
