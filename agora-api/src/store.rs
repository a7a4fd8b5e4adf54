use bolero::generator::TypeGenerator;
use std::{fmt, rc::Rc};

use async_trait::async_trait;

use crate::{Error, FetchQuery};

/// Name of the field holding the store-assigned id of every record
pub const ID_FIELD: &str = "Id";

/// A raw row of the record store, before mapping to one of our types
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Post,
    Comment,
    Community,
    User,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Post => "post",
            Table::Comment => "comment",
            Table::Community => "community",
            Table::User => "user",
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        match name {
            "post" => Some(Table::Post),
            "comment" => Some(Table::Comment),
            "community" => Some(Table::Community),
            "user" => Some(Table::User),
            _ => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

/// Per-record result of a create call
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CreateOutcome {
    pub success: bool,
    pub data: Option<Record>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
    pub message: Option<String>,
}

impl CreateOutcome {
    pub fn created(data: Record) -> CreateOutcome {
        CreateOutcome {
            success: true,
            data: Some(data),
            errors: Vec::new(),
            message: None,
        }
    }

    pub fn failed(message: String, errors: Vec<FieldError>) -> CreateOutcome {
        CreateOutcome {
            success: false,
            data: None,
            errors,
            message: Some(message),
        }
    }
}

/// The hosted backend holding all posts, comments, communities and users.
///
/// Every call either succeeds as a whole or fails with `Error::Store`. Not
/// `Send`, as the browser implementation cannot be.
#[async_trait(?Send)]
pub trait RecordStore {
    async fn fetch_records(&self, table: Table, query: &FetchQuery) -> Result<Vec<Record>, Error>;
    async fn get_record_by_id(
        &self,
        table: Table,
        id: RecordId,
        fields: &[String],
    ) -> Result<Option<Record>, Error>;
    async fn create_records(
        &self,
        table: Table,
        records: Vec<Record>,
    ) -> Result<Vec<CreateOutcome>, Error>;
    async fn update_records(&self, table: Table, records: Vec<Record>) -> Result<(), Error>;
    async fn delete_records(&self, table: Table, ids: Vec<RecordId>) -> Result<(), Error>;
}

macro_rules! forward_record_store {
    ($($generics:tt)*) => {
        #[async_trait(?Send)]
        impl $($generics)* {
            async fn fetch_records(
                &self,
                table: Table,
                query: &FetchQuery,
            ) -> Result<Vec<Record>, Error> {
                (**self).fetch_records(table, query).await
            }

            async fn get_record_by_id(
                &self,
                table: Table,
                id: RecordId,
                fields: &[String],
            ) -> Result<Option<Record>, Error> {
                (**self).get_record_by_id(table, id, fields).await
            }

            async fn create_records(
                &self,
                table: Table,
                records: Vec<Record>,
            ) -> Result<Vec<CreateOutcome>, Error> {
                (**self).create_records(table, records).await
            }

            async fn update_records(&self, table: Table, records: Vec<Record>) -> Result<(), Error> {
                (**self).update_records(table, records).await
            }

            async fn delete_records(&self, table: Table, ids: Vec<RecordId>) -> Result<(), Error> {
                (**self).delete_records(table, ids).await
            }
        }
    };
}

forward_record_store!(<'a, S: RecordStore + ?Sized> RecordStore for &'a S);
forward_record_store!(<S: RecordStore + ?Sized> RecordStore for Rc<S>);
