use std::fmt;

use crate::{Error, RecordId, Time};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommunityId(pub u64);

impl From<CommunityId> for RecordId {
    fn from(id: CommunityId) -> RecordId {
        RecordId(id.0)
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub description: String,
    pub member_count: u32,
    pub is_subscribed: bool,
    pub created_at: Time,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
}

impl NewCommunity {
    /// Community names are stored lowercased and without any whitespace
    pub fn normalized_name(&self) -> String {
        self.name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_name(&self.normalized_name())?;
        crate::validate_string(&self.description)?;
        Ok(())
    }
}

/// Fields left to `None` are not written
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommunityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub member_count: Option<u32>,
    pub is_subscribed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalized() {
        let c = NewCommunity {
            name: String::from(" Rust Lang\tFans "),
            description: String::new(),
        };
        assert_eq!(c.normalized_name(), "rustlangfans");
        assert_eq!(c.validate(), Ok(()));

        let c = NewCommunity {
            name: String::from("   "),
            description: String::new(),
        };
        assert_eq!(c.validate(), Err(Error::InvalidName(String::new())));
    }
}
