use std::fmt;

use crate::{RecordId, Time};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct UserId(pub u64);

impl From<UserId> for RecordId {
    fn from(id: UserId) -> RecordId {
        RecordId(id.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub post_karma: u32,
    pub comment_karma: u32,
    pub created_at: Time,
}

impl User {
    pub fn total_karma(&self) -> u64 {
        u64::from(self.post_karma) + u64::from(self.comment_karma)
    }
}

/// Fields left to `None` are not written. Usernames cannot be changed.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserPatch {
    pub post_karma: Option<u32>,
    pub comment_karma: Option<u32>,
}
