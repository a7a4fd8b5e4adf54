use crate::api::Error;

/// Who is using the client, if anyone. Only signed-in users may vote.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn anonymous() -> Session {
        Session { user: None }
    }

    pub fn signed_in(user: String) -> Session {
        Session { user: Some(user) }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn require_user(&self) -> Result<&str, Error> {
        self.user().ok_or(Error::NotAuthenticated)
    }
}

impl From<Option<String>> for Session {
    fn from(user: Option<String>) -> Session {
        Session { user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate() {
        assert_eq!(Session::anonymous().require_user(), Err(Error::NotAuthenticated));
        assert_eq!(
            Session::signed_in(String::from("alice")).require_user(),
            Ok("alice")
        );
        assert_eq!(Session::from(None), Session::default());
    }
}
