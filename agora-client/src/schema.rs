//! Mapping between raw store records and our entity types.
//!
//! Missing strings read as empty, missing counters as zero and a missing
//! creation time as the current time. Values of the wrong type are reported
//! as `Error::Store`. Vote counters may be negative, other counters may not.

use chrono::Utc;
use serde_json::Value;

use crate::api::{
    Comment, CommentId, CommentPatch, Community, CommunityId, CommunityPatch, Error, NewComment,
    NewPost, Post, PostId, PostPatch, PostType, Record, RecordId, Table, Tally, Time, User,
    UserId, UserPatch, Vote, ID_FIELD,
};

pub const POST_FIELDS: &[&str] = &[
    ID_FIELD,
    "title",
    "content",
    "post_type",
    "image_url",
    "link_url",
    "author_username",
    "community_name",
    "upvotes",
    "downvotes",
    "comment_count",
    "created_at",
    "user_vote",
    "is_pinned",
];

pub const COMMENT_FIELDS: &[&str] = &[
    ID_FIELD,
    "post_id",
    "parent_id",
    "content",
    "author_username",
    "upvotes",
    "downvotes",
    "created_at",
    "user_vote",
    "is_collapsed",
];

pub const COMMUNITY_FIELDS: &[&str] = &[
    ID_FIELD,
    "name",
    "description",
    "member_count",
    "is_subscribed",
    "created_at",
];

pub const USER_FIELDS: &[&str] = &[
    ID_FIELD,
    "username",
    "post_karma",
    "comment_karma",
    "created_at",
];

/// Fields touched by a vote, shared by posts and comments
pub const TALLY_FIELDS: &[&str] = &[ID_FIELD, "upvotes", "downvotes", "user_vote"];

pub fn field_list(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| String::from(*f)).collect()
}

pub trait FromRecord: Sized {
    const TABLE: Table;
    const FIELDS: &'static [&'static str];

    fn from_record(r: &Record) -> Result<Self, Error>;
}

pub fn parse_all<T: FromRecord>(records: &[Record]) -> Result<Vec<T>, Error> {
    records.iter().map(T::from_record).collect()
}

fn malformed(field: &str, v: &Value) -> Error {
    Error::Store(format!("malformed value for field {field:?}: {v}"))
}

fn record_id(r: &Record) -> Result<RecordId, Error> {
    match r.get(ID_FIELD) {
        Some(v) => v.as_u64().map(RecordId).ok_or_else(|| malformed(ID_FIELD, v)),
        None => Err(Error::Store(String::from("record has no id"))),
    }
}

fn opt_id(r: &Record, field: &str) -> Result<Option<u64>, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_u64().map(Some).ok_or_else(|| malformed(field, v)),
    }
}

fn string(r: &Record, field: &str) -> Result<String, Error> {
    Ok(opt_string(r, field)?.unwrap_or_default())
}

fn opt_string(r: &Record, field: &str) -> Result<Option<String>, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v) => Err(malformed(field, v)),
    }
}

fn count(r: &Record, field: &str) -> Result<u32, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| malformed(field, v)),
    }
}

fn votes(r: &Record, field: &str) -> Result<i64, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v.as_i64().ok_or_else(|| malformed(field, v)),
    }
}

fn flag(r: &Record, field: &str) -> Result<bool, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(v) => Err(malformed(field, v)),
    }
}

fn time(r: &Record, field: &str) -> Result<Time, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(Utc::now()),
        Some(v) => v
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| malformed(field, v)),
    }
}

fn vote(r: &Record, field: &str) -> Result<Vote, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(Vote::None),
        Some(v) => v
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed(field, v)),
    }
}

fn post_type(r: &Record, field: &str) -> Result<PostType, Error> {
    match r.get(field) {
        None | Some(Value::Null) => Ok(PostType::Text),
        Some(v) => v
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed(field, v)),
    }
}

impl FromRecord for Post {
    const TABLE: Table = Table::Post;
    const FIELDS: &'static [&'static str] = POST_FIELDS;

    fn from_record(r: &Record) -> Result<Post, Error> {
        Ok(Post {
            id: PostId(record_id(r)?.0),
            title: string(r, "title")?,
            content: string(r, "content")?,
            post_type: post_type(r, "post_type")?,
            image_url: opt_string(r, "image_url")?,
            link_url: opt_string(r, "link_url")?,
            author_username: string(r, "author_username")?,
            community_name: string(r, "community_name")?,
            upvotes: votes(r, "upvotes")?,
            downvotes: votes(r, "downvotes")?,
            comment_count: count(r, "comment_count")?,
            created_at: time(r, "created_at")?,
            user_vote: vote(r, "user_vote")?,
            is_pinned: flag(r, "is_pinned")?,
        })
    }
}

impl FromRecord for Comment {
    const TABLE: Table = Table::Comment;
    const FIELDS: &'static [&'static str] = COMMENT_FIELDS;

    fn from_record(r: &Record) -> Result<Comment, Error> {
        Ok(Comment {
            id: CommentId(record_id(r)?.0),
            post_id: PostId(opt_id(r, "post_id")?.unwrap_or_default()),
            parent_id: opt_id(r, "parent_id")?.map(CommentId),
            content: string(r, "content")?,
            author_username: string(r, "author_username")?,
            upvotes: votes(r, "upvotes")?,
            downvotes: votes(r, "downvotes")?,
            created_at: time(r, "created_at")?,
            user_vote: vote(r, "user_vote")?,
            is_collapsed: flag(r, "is_collapsed")?,
            replies: Vec::new(),
        })
    }
}

impl FromRecord for Community {
    const TABLE: Table = Table::Community;
    const FIELDS: &'static [&'static str] = COMMUNITY_FIELDS;

    fn from_record(r: &Record) -> Result<Community, Error> {
        Ok(Community {
            id: CommunityId(record_id(r)?.0),
            name: string(r, "name")?,
            description: string(r, "description")?,
            member_count: count(r, "member_count")?,
            is_subscribed: flag(r, "is_subscribed")?,
            created_at: time(r, "created_at")?,
        })
    }
}

impl FromRecord for User {
    const TABLE: Table = Table::User;
    const FIELDS: &'static [&'static str] = USER_FIELDS;

    fn from_record(r: &Record) -> Result<User, Error> {
        Ok(User {
            id: UserId(record_id(r)?.0),
            username: string(r, "username")?,
            post_karma: count(r, "post_karma")?,
            comment_karma: count(r, "comment_karma")?,
            created_at: time(r, "created_at")?,
        })
    }
}

pub fn tally(r: &Record) -> Result<Tally, Error> {
    Ok(Tally::new(
        vote(r, "user_vote")?,
        votes(r, "upvotes")?,
        votes(r, "downvotes")?,
    ))
}

/// Builds an update record, skipping the fields set to `None`
struct Patch(Record);

impl Patch {
    fn new(id: RecordId) -> Patch {
        let mut r = Record::new();
        r.insert(String::from(ID_FIELD), Value::from(id.0));
        Patch(r)
    }

    fn set(mut self, field: &str, value: Option<impl Into<Value>>) -> Patch {
        if let Some(v) = value {
            self.0.insert(String::from(field), v.into());
        }
        self
    }
}

pub fn tally_record(id: RecordId, t: Tally) -> Record {
    Patch::new(id)
        .set("upvotes", Some(t.upvotes))
        .set("downvotes", Some(t.downvotes))
        .set("user_vote", Some(t.vote.as_str()))
        .0
}

/// The author of a new post or comment upvotes it
fn auto_upvoted(mut r: Record, now: Time) -> Record {
    r.insert(String::from("upvotes"), Value::from(1));
    r.insert(String::from("downvotes"), Value::from(0));
    r.insert(String::from("user_vote"), Value::from(Vote::Up.as_str()));
    r.insert(String::from("created_at"), Value::from(now.to_rfc3339()));
    r
}

pub fn new_post_record(p: &NewPost, now: Time) -> Record {
    let mut r = Record::new();
    r.insert(String::from("title"), Value::from(p.title.clone()));
    r.insert(String::from("content"), Value::from(p.content.clone()));
    r.insert(String::from("post_type"), Value::from(p.post_type.as_str()));
    r.insert(String::from("image_url"), Value::from(p.image_url.clone()));
    r.insert(String::from("link_url"), Value::from(p.link_url.clone()));
    r.insert(
        String::from("author_username"),
        Value::from(p.author_username.clone()),
    );
    r.insert(
        String::from("community_name"),
        Value::from(p.community_name.clone()),
    );
    r.insert(String::from("comment_count"), Value::from(0));
    r.insert(String::from("is_pinned"), Value::from(false));
    auto_upvoted(r, now)
}

pub fn post_patch_record(id: PostId, p: &PostPatch) -> Record {
    Patch::new(id.into())
        .set("title", p.title.clone())
        .set("content", p.content.clone())
        .set("post_type", p.post_type.map(|t| t.as_str()))
        .set("image_url", p.image_url.clone())
        .set("link_url", p.link_url.clone())
        .set("upvotes", p.upvotes)
        .set("downvotes", p.downvotes)
        .set("comment_count", p.comment_count)
        .set("user_vote", p.user_vote.map(|v| v.as_str()))
        .set("is_pinned", p.is_pinned)
        .0
}

pub fn new_comment_record(c: &NewComment, now: Time) -> Record {
    let mut r = Record::new();
    r.insert(String::from("post_id"), Value::from(c.post_id.0));
    r.insert(String::from("parent_id"), Value::from(c.parent_id.map(|p| p.0)));
    r.insert(String::from("content"), Value::from(c.content.clone()));
    r.insert(
        String::from("author_username"),
        Value::from(c.author_username.clone()),
    );
    r.insert(String::from("is_collapsed"), Value::from(false));
    auto_upvoted(r, now)
}

pub fn comment_patch_record(id: CommentId, c: &CommentPatch) -> Record {
    Patch::new(id.into())
        .set("content", c.content.clone())
        .set("upvotes", c.upvotes)
        .set("downvotes", c.downvotes)
        .set("user_vote", c.user_vote.map(|v| v.as_str()))
        .set("is_collapsed", c.is_collapsed)
        .0
}

/// `name` must already be normalized
pub fn new_community_record(name: &str, description: &str, now: Time) -> Record {
    let mut r = Record::new();
    r.insert(String::from("name"), Value::from(name));
    r.insert(String::from("description"), Value::from(description));
    r.insert(String::from("member_count"), Value::from(1));
    r.insert(String::from("is_subscribed"), Value::from(true));
    r.insert(String::from("created_at"), Value::from(now.to_rfc3339()));
    r
}

pub fn community_patch_record(id: CommunityId, c: &CommunityPatch) -> Record {
    Patch::new(id.into())
        .set("name", c.name.clone())
        .set("description", c.description.clone())
        .set("member_count", c.member_count)
        .set("is_subscribed", c.is_subscribed)
        .0
}

pub fn new_user_record(username: &str, now: Time) -> Record {
    let mut r = Record::new();
    r.insert(String::from("username"), Value::from(username));
    r.insert(String::from("post_karma"), Value::from(0));
    r.insert(String::from("comment_karma"), Value::from(0));
    r.insert(String::from("created_at"), Value::from(now.to_rfc3339()));
    r
}

pub fn user_patch_record(id: UserId, u: &UserPatch) -> Record {
    Patch::new(id.into())
        .set("post_karma", u.post_karma)
        .set("comment_karma", u.comment_karma)
        .0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c = Comment::from_record(&record(json!({ "Id": 4, "post_id": 2 }))).unwrap();
        assert_eq!(c.id, CommentId(4));
        assert_eq!(c.post_id, PostId(2));
        assert_eq!(c.parent_id, None);
        assert_eq!(c.content, "");
        assert_eq!(c.tally(), Tally::new(Vote::None, 0, 0));
        assert!(!c.is_collapsed);
    }

    #[test]
    fn full_post() {
        let p = Post::from_record(&record(json!({
            "Id": 9,
            "title": "hello",
            "post_type": "link",
            "link_url": "https://example.org",
            "image_url": null,
            "upvotes": 3,
            "downvotes": 1,
            "comment_count": 2,
            "created_at": "2022-03-04T05:06:07Z",
            "user_vote": "down",
            "is_pinned": true,
        })))
        .unwrap();
        assert_eq!(p.id, PostId(9));
        assert_eq!(p.post_type, PostType::Link);
        assert_eq!(p.link_url.as_deref(), Some("https://example.org"));
        assert_eq!(p.image_url, None);
        assert_eq!(p.tally(), Tally::new(Vote::Down, 3, 1));
        assert_eq!(p.comment_count, 2);
        assert_eq!(p.created_at, Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap());
        assert!(p.is_pinned);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(Post::from_record(&record(json!({ "title": "no id" }))).is_err());
        assert!(Post::from_record(&record(json!({ "Id": 1, "upvotes": 1.5 }))).is_err());
        assert!(Post::from_record(&record(json!({ "Id": 1, "comment_count": -1 }))).is_err());
        assert!(Post::from_record(&record(json!({ "Id": 1, "user_vote": "sideways" }))).is_err());
        assert!(User::from_record(&record(json!({ "Id": 1, "created_at": "yesterday" }))).is_err());
        assert!(
            Community::from_record(&record(json!({ "Id": 1, "member_count": 1u64 << 40 })))
                .is_err()
        );
    }

    #[test]
    fn drifted_vote_counters_still_read() {
        let p = Post::from_record(&record(json!({ "Id": 1, "upvotes": 2, "downvotes": -1 })))
            .unwrap();
        assert_eq!(p.tally(), Tally::new(Vote::None, 2, -1));
        assert_eq!(p.score(), 3);
        let t = tally(&record(json!({ "Id": 1, "upvotes": -4, "user_vote": "up" }))).unwrap();
        assert_eq!(t, Tally::new(Vote::Up, -4, 0));
    }

    #[test]
    fn patches_only_write_set_fields() {
        let r = post_patch_record(
            PostId(3),
            &PostPatch {
                title: Some(String::from("edited")),
                is_pinned: Some(false),
                ..PostPatch::default()
            },
        );
        assert_eq!(
            Value::Object(r),
            json!({ "Id": 3, "title": "edited", "is_pinned": false })
        );
        assert_eq!(
            Value::Object(tally_record(RecordId(5), Tally::new(Vote::Up, 2, 0))),
            json!({ "Id": 5, "upvotes": 2, "downvotes": 0, "user_vote": "up" })
        );
    }

    #[test]
    fn new_comments_are_upvoted_by_their_author() {
        let now = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let r = new_comment_record(
            &NewComment {
                post_id: PostId(1),
                parent_id: Some(CommentId(7)),
                content: String::from("first"),
                author_username: String::from("bob"),
            },
            now,
        );
        let mut with_id = r.clone();
        with_id.insert(String::from(ID_FIELD), Value::from(12));
        let c = Comment::from_record(&with_id).unwrap();
        assert_eq!(c.tally(), Tally::new(Vote::Up, 1, 0));
        assert_eq!(c.parent_id, Some(CommentId(7)));
        assert_eq!(c.created_at, now);
    }
}
