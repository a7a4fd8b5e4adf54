use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{Comment, CommentId, CommentPatch, NewComment};

mod community;
pub use community::{Community, CommunityId, CommunityPatch, NewCommunity};

mod error;
pub use error::Error;

mod post;
pub use post::{NewPost, Post, PostId, PostPatch, PostType};

mod query;
pub use query::{Condition, FetchQuery, GroupOperator, Operator, OrderBy, OrderType, Paging, WhereGroup};

mod store;
pub use store::{CreateOutcome, FieldError, Record, RecordId, RecordStore, Table, ID_FIELD};

mod user;
pub use user::{User, UserId, UserPatch};

mod vote;
pub use vote::{Tally, Vote};

// Strings end up in a third-party store that we do not control, so keep them
// to what every backend is known to accept.
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}

/// Usernames and community names are used as lookup keys and in urls
pub fn validate_name(name: &str) -> Result<(), Error> {
    validate_string(name)?;
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::InvalidName(String::from(name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_bytes_are_rejected() {
        assert_eq!(validate_string("hello"), Ok(()));
        assert_eq!(
            validate_string("hel\0lo"),
            Err(Error::NullByteInString(String::from("hel\0lo")))
        );
    }

    #[test]
    fn names() {
        assert_eq!(validate_name("rust_lang-2"), Ok(()));
        assert_eq!(validate_name(""), Err(Error::InvalidName(String::new())));
        assert_eq!(
            validate_name("two words"),
            Err(Error::InvalidName(String::from("two words")))
        );
        assert_eq!(
            validate_name("a/b"),
            Err(Error::InvalidName(String::from("a/b")))
        );
    }
}
