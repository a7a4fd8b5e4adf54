use bolero::generator::TypeGenerator;
use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{RecordId, Table, Tally};

#[derive(Clone, Debug, Eq, PartialEq, bolero::generator::TypeGenerator, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Record store failure: {0}")]
    Store(String),

    #[error("No {table} with id {id}")]
    NotFound { table: Table, id: RecordId },

    #[error("No {table} named {name:?}")]
    NameNotFound { table: Table, name: String },

    #[error("Name already used {0}")]
    NameAlreadyUsed(String),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Invalid character in name {0:?}")]
    InvalidName(String),

    #[error("Vote counters are inconsistent with the current vote {0:?}")]
    InconsistentTally(Tally),

    #[error("A vote is already being submitted")]
    VotePending,
}

impl Error {
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::NotAuthenticated => json!({
                "message": "not signed in",
                "type": "not-authenticated",
            }),
            Error::Store(msg) => json!({
                "message": msg,
                "type": "store",
            }),
            Error::NotFound { table, id } => json!({
                "message": "record not found",
                "type": "not-found",
                "table": table,
                "id": id,
            }),
            Error::NameNotFound { table, name } => json!({
                "message": "no record with this name",
                "type": "name-not-found",
                "table": table,
                "name": name,
            }),
            Error::NameAlreadyUsed(n) => json!({
                "message": "name already used",
                "type": "conflict-name",
                "name": n,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidName(n) => json!({
                "message": "there was an invalid character in a name",
                "type": "invalid-name",
                "name": n,
            }),
            Error::InconsistentTally(t) => json!({
                "message": "vote counters are inconsistent",
                "type": "inconsistent-tally",
                "tally": t,
            }),
            Error::VotePending => json!({
                "message": "a vote is already being submitted",
                "type": "vote-pending",
            }),
        })
        .expect("serializing error")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| {
            data.get(name)
                .cloned()
                .ok_or_else(|| anyhow!("error contents has no {name:?} field"))
        };
        let string = |name: &str| -> anyhow::Result<String> {
            field(name)?
                .as_str()
                .map(String::from)
                .ok_or_else(|| anyhow!("error field {name:?} is not a string"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "not-authenticated" => Error::NotAuthenticated,
                "store" => Error::Store(string("message")?),
                "not-found" => Error::NotFound {
                    table: serde_json::from_value(field("table")?)
                        .context("parsing not-found table")?,
                    id: serde_json::from_value(field("id")?).context("parsing not-found id")?,
                },
                "name-not-found" => Error::NameNotFound {
                    table: serde_json::from_value(field("table")?)
                        .context("parsing name-not-found table")?,
                    name: string("name")?,
                },
                "conflict-name" => Error::NameAlreadyUsed(string("name")?),
                "null-byte" => Error::NullByteInString(string("string")?),
                "invalid-name" => Error::InvalidName(string("name")?),
                "inconsistent-tally" => Error::InconsistentTally(
                    serde_json::from_value(field("tally")?).context("parsing tally")?,
                ),
                "vote-pending" => Error::VotePending,
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        bolero::check!()
            .with_type::<Error>()
            .cloned()
            .for_each(|err| {
                let parsed = Error::parse(&err.contents()).expect("parsing serialized error");
                assert_eq!(parsed, err);
            })
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Error::parse(b"not json").is_err());
        assert!(Error::parse(br#"{"type": "bogus"}"#).is_err());
        assert!(Error::parse(br#"{"type": "conflict-name"}"#).is_err());
    }
}
