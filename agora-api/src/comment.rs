use std::fmt;

use crate::{Error, PostId, RecordId, Tally, Time, Vote};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub u64);

impl From<CommentId> for RecordId {
    fn from(id: CommentId) -> RecordId {
        RecordId(id.0)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// `None` for top-level comments
    pub parent_id: Option<CommentId>,

    pub content: String,
    pub author_username: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: Time,
    pub user_vote: Vote,
    pub is_collapsed: bool,

    /// Direct replies, oldest first
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn tally(&self) -> Tally {
        Tally::new(self.user_vote, self.upvotes, self.downvotes)
    }

    pub fn score(&self) -> i64 {
        self.tally().score()
    }

    /// Number of comments in this subtree, this one included
    pub fn thread_size(&self) -> usize {
        1 + self.replies.iter().map(Comment::thread_size).sum::<usize>()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub author_username: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)?;
        crate::validate_name(&self.author_username)?;
        Ok(())
    }
}

/// Fields left to `None` are not written
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPatch {
    pub content: Option<String>,
    pub upvotes: Option<i64>,
    pub downvotes: Option<i64>,
    pub user_vote: Option<Vote>,
    pub is_collapsed: Option<bool>,
}
