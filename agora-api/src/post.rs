use std::{fmt, str::FromStr};

use crate::{Error, RecordId, Tally, Time, Vote};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub u64);

impl From<PostId> for RecordId {
    fn from(id: PostId) -> RecordId {
        RecordId(id.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Text,
    Image,
    Link,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Image => "image",
            PostType::Link => "link",
        }
    }
}

impl FromStr for PostType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<PostType> {
        match s {
            "text" => Ok(PostType::Text),
            "image" => Ok(PostType::Image),
            "link" => Ok(PostType::Link),
            _ => Err(anyhow::anyhow!("unknown post type {s:?}")),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub post_type: PostType,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub author_username: String,
    pub community_name: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comment_count: u32,
    pub created_at: Time,
    pub user_vote: Vote,
    pub is_pinned: bool,
}

impl Post {
    pub fn tally(&self) -> Tally {
        Tally::new(self.user_vote, self.upvotes, self.downvotes)
    }

    pub fn score(&self) -> i64 {
        self.tally().score()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub post_type: PostType,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub author_username: String,
    pub community_name: String,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.title)?;
        crate::validate_string(&self.content)?;
        if let Some(url) = &self.image_url {
            crate::validate_string(url)?;
        }
        if let Some(url) = &self.link_url {
            crate::validate_string(url)?;
        }
        crate::validate_name(&self.author_username)?;
        crate::validate_name(&self.community_name)?;
        Ok(())
    }
}

/// Fields left to `None` are not written
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub post_type: Option<PostType>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub upvotes: Option<i64>,
    pub downvotes: Option<i64>,
    pub comment_count: Option<u32>,
    pub user_vote: Option<Vote>,
    pub is_pinned: Option<bool>,
}

impl PostPatch {
    pub fn validate(&self) -> Result<(), Error> {
        for s in [&self.title, &self.content, &self.image_url, &self.link_url]
            .into_iter()
            .flatten()
        {
            crate::validate_string(s)?;
        }
        Ok(())
    }
}
