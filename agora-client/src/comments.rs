use chrono::Utc;

use crate::{
    access,
    api::{
        Comment, CommentId, CommentPatch, Condition, Error, FetchQuery, NewComment, OrderType,
        PostId, RecordStore, Table, Tally, Vote,
    },
    build_tree,
    schema::{self, COMMENT_FIELDS},
    vote, CommentSort,
};

pub struct CommentService<S> {
    store: S,
}

impl<S: RecordStore> CommentService<S> {
    pub fn new(store: S) -> CommentService<S> {
        CommentService { store }
    }

    /// Returns the top-level comments of the post, with their replies
    pub async fn get_by_post(&self, post: PostId, sort: CommentSort) -> Result<Vec<Comment>, Error> {
        let q = FetchQuery::new(COMMENT_FIELDS)
            .filter(Condition::equal_to("post_id", post.0))
            .order("created_at", OrderType::Asc);
        let comments = access::fetch(&self.store, &q).await?;
        tracing::debug!(%post, %sort, num = comments.len(), "building comment thread");
        Ok(build_tree(comments, sort))
    }

    /// Flat list, newest first
    pub async fn get_by_user(&self, username: &str) -> Result<Vec<Comment>, Error> {
        let q = FetchQuery::new(COMMENT_FIELDS)
            .filter(Condition::equal_to("author_username", username))
            .order("created_at", OrderType::Desc);
        access::fetch(&self.store, &q).await
    }

    pub async fn get_by_id(&self, id: CommentId) -> Result<Comment, Error> {
        access::get(&self.store, id.into()).await
    }

    pub async fn create(&self, comment: &NewComment) -> Result<Comment, Error> {
        comment.validate()?;
        tracing::debug!(post = %comment.post_id, parent = ?comment.parent_id, "creating comment");
        let outcome = access::create_one(
            &self.store,
            Table::Comment,
            schema::new_comment_record(comment, Utc::now()),
        )
        .await?;
        access::created(outcome)
    }

    /// Returns the tally now in the store
    pub async fn vote(&self, id: CommentId, requested: Vote) -> Result<Tally, Error> {
        vote::store_vote(&self.store, Table::Comment, id.into(), requested).await
    }

    pub async fn update(&self, id: CommentId, patch: &CommentPatch) -> Result<(), Error> {
        if let Some(c) = &patch.content {
            crate::api::validate_string(c)?;
        }
        access::update_one(
            &self.store,
            Table::Comment,
            schema::comment_patch_record(id, patch),
        )
        .await
    }

    /// Replies to this comment are left in place, and will be dropped from
    /// the thread as orphans
    pub async fn delete(&self, id: CommentId) -> Result<(), Error> {
        tracing::debug!(%id, "deleting comment");
        access::delete_one(&self.store, Table::Comment, id.into()).await
    }
}
