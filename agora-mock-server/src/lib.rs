use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, HashSet},
};

use agora_api::{
    CreateOutcome, Error, FetchQuery, FieldError, Record, RecordId, RecordStore, Table, ID_FIELD,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::Value;

mod query;
pub use query::QueryExt;

/// The store calls that can be made to fail
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    Fetch,
    Get,
    Create,
    Update,
    Delete,
}

/// In-memory `RecordStore`, with every table kept ordered by id.
///
/// Names of users and communities are unique, as on the hosted store.
pub struct MockServer(RefCell<Db>);

#[derive(Debug, Default)]
struct Db {
    tables: HashMap<Table, DbTable>,
    failing: HashSet<Operation>,
    calls: HashMap<Operation, usize>,
}

#[derive(Debug, Default)]
struct DbTable {
    next_id: u64,
    records: BTreeMap<RecordId, Record>,
}

impl DbTable {
    fn insert(&mut self, mut r: Record) -> RecordId {
        let id = match r.get(ID_FIELD).and_then(Value::as_u64) {
            Some(id) => RecordId(id),
            None => RecordId(self.next_id.max(1)),
        };
        self.next_id = self.next_id.max(id.0 + 1);
        r.insert(String::from(ID_FIELD), Value::from(id.0));
        self.records.insert(id, r);
        id
    }
}

/// Field holding the unique name of the records of a table, if any
fn unique_field(table: Table) -> Option<&'static str> {
    match table {
        Table::User => Some("username"),
        Table::Community => Some("name"),
        Table::Post | Table::Comment => None,
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(RefCell::new(Db::default()))
    }

    /// Loads a json object mapping table names to arrays of records
    pub fn from_seed(seed: &str) -> anyhow::Result<MockServer> {
        let seed: BTreeMap<String, Vec<Record>> =
            serde_json::from_str(seed).context("parsing seed")?;
        let server = MockServer::new();
        {
            let mut db = server.0.borrow_mut();
            for (name, records) in seed {
                let table =
                    Table::from_name(&name).ok_or_else(|| anyhow!("unknown table {name:?}"))?;
                let t = db.tables.entry(table).or_default();
                for r in records {
                    t.insert(r);
                }
            }
        }
        Ok(server)
    }

    /// Make every following call of this kind fail, until `heal`
    pub fn fail(&self, op: Operation) {
        self.0.borrow_mut().failing.insert(op);
    }

    pub fn heal(&self) {
        self.0.borrow_mut().failing.clear();
    }

    /// Number of calls of this kind received so far, failed ones included
    pub fn test_num_calls(&self, op: Operation) -> usize {
        self.0.borrow().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn test_records(&self, table: Table) -> Vec<Record> {
        self.0
            .borrow()
            .tables
            .get(&table)
            .map(|t| t.records.values().cloned().collect())
            .unwrap_or_default()
    }

    fn call(&self, op: Operation) -> Result<(), Error> {
        let mut db = self.0.borrow_mut();
        *db.calls.entry(op).or_default() += 1;
        if db.failing.contains(&op) {
            tracing::debug!(?op, "injecting failure");
            return Err(Error::Store(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait(?Send)]
impl RecordStore for MockServer {
    async fn fetch_records(&self, table: Table, q: &FetchQuery) -> Result<Vec<Record>, Error> {
        self.call(Operation::Fetch)?;
        q.validate()?;
        let db = self.0.borrow();
        let mut res = db
            .tables
            .get(&table)
            .map(|t| {
                t.records
                    .values()
                    .filter(|r| q.matches(r))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        query::sort(&mut res, &q.order_by);
        let (offset, limit) = match q.paging {
            Some(p) => (p.offset, p.limit),
            None => (0, usize::MAX),
        };
        Ok(res
            .iter()
            .skip(offset)
            .take(limit)
            .map(|r| query::project(r, &q.fields))
            .collect())
    }

    async fn get_record_by_id(
        &self,
        table: Table,
        id: RecordId,
        fields: &[String],
    ) -> Result<Option<Record>, Error> {
        self.call(Operation::Get)?;
        Ok(self
            .0
            .borrow()
            .tables
            .get(&table)
            .and_then(|t| t.records.get(&id))
            .map(|r| query::project(r, fields)))
    }

    async fn create_records(
        &self,
        table: Table,
        records: Vec<Record>,
    ) -> Result<Vec<CreateOutcome>, Error> {
        self.call(Operation::Create)?;
        let mut db = self.0.borrow_mut();
        let t = db.tables.entry(table).or_default();
        let mut res = Vec::with_capacity(records.len());
        for mut r in records {
            // Ids are always assigned by the store
            r.remove(ID_FIELD);
            if let Some(field) = unique_field(table) {
                let name = r.get(field).cloned().unwrap_or(Value::Null);
                if t.records.values().any(|o| o.get(field) == Some(&name)) {
                    res.push(CreateOutcome::failed(
                        format!("{table} {name} already exists"),
                        vec![FieldError {
                            field_label: String::from(field),
                            message: String::from("must be unique"),
                        }],
                    ));
                    continue;
                }
            }
            let id = t.insert(r);
            res.push(CreateOutcome::created(t.records[&id].clone()));
        }
        Ok(res)
    }

    async fn update_records(&self, table: Table, records: Vec<Record>) -> Result<(), Error> {
        self.call(Operation::Update)?;
        let mut db = self.0.borrow_mut();
        let t = db.tables.entry(table).or_default();
        let mut ids = Vec::with_capacity(records.len());
        for r in &records {
            let id = r
                .get(ID_FIELD)
                .and_then(Value::as_u64)
                .map(RecordId)
                .ok_or_else(|| Error::Store(String::from("updated record has no id")))?;
            if !t.records.contains_key(&id) {
                return Err(Error::NotFound { table, id });
            }
            ids.push(id);
        }
        for (id, r) in ids.into_iter().zip(records) {
            if let Some(stored) = t.records.get_mut(&id) {
                stored.extend(r);
            }
        }
        Ok(())
    }

    async fn delete_records(&self, table: Table, ids: Vec<RecordId>) -> Result<(), Error> {
        self.call(Operation::Delete)?;
        let mut db = self.0.borrow_mut();
        let t = db.tables.entry(table).or_default();
        if let Some(id) = ids.iter().find(|id| !t.records.contains_key(id)) {
            return Err(Error::NotFound { table, id: *id });
        }
        for id in ids {
            t.records.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use agora_api::{Condition, OrderType};
    use serde_json::json;

    use super::*;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records
            .iter()
            .map(|r| r[ID_FIELD].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn seeded_fetch() {
        let server = MockServer::from_seed(
            r#"{
                "community": [
                    { "Id": 4, "name": "rust", "member_count": 10 },
                    { "Id": 2, "name": "cats", "member_count": 30 },
                    { "Id": 9, "name": "trust", "member_count": 20 }
                ]
            }"#,
        )
        .unwrap();
        let res = server
            .fetch_records(
                Table::Community,
                &FetchQuery::new(&["name"])
                    .filter(Condition::contains("name", "RUST"))
                    .order("member_count", OrderType::Desc),
            )
            .await
            .unwrap();
        assert_eq!(ids(&res), vec![9, 4]);
        assert_eq!(res[0].get("member_count"), None);

        let page = server
            .fetch_records(
                Table::Community,
                &FetchQuery::new(&[]).order("Id", OrderType::Asc).page(2, 1),
            )
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![4, 9]);

        // New ids never collide with seeded ones
        let created = server
            .create_records(Table::Community, vec![record(json!({ "name": "dogs" }))])
            .await
            .unwrap();
        assert_eq!(created[0].data.as_ref().unwrap()[ID_FIELD], json!(10));
    }

    #[test]
    fn bad_seeds() {
        assert!(MockServer::from_seed("[]").is_err());
        assert!(MockServer::from_seed(r#"{ "posts_c": [] }"#).is_err());
    }

    #[tokio::test]
    async fn names_are_unique() {
        let server = MockServer::new();
        let res = server
            .create_records(
                Table::User,
                vec![
                    record(json!({ "username": "alice" })),
                    record(json!({ "username": "bob" })),
                    record(json!({ "username": "alice" })),
                ],
            )
            .await
            .unwrap();
        assert_eq!(
            res.iter().map(|o| o.success).collect::<Vec<_>>(),
            vec![true, true, false]
        );
        assert_eq!(res[2].errors[0].field_label, "username");
        assert_eq!(server.test_records(Table::User).len(), 2);
    }

    #[tokio::test]
    async fn updates_merge_and_are_atomic() {
        let server = MockServer::new();
        server
            .create_records(Table::Post, vec![record(json!({ "title": "a", "upvotes": 1 }))])
            .await
            .unwrap();
        server
            .update_records(Table::Post, vec![record(json!({ "Id": 1, "upvotes": 2 }))])
            .await
            .unwrap();
        let stored = server
            .get_record_by_id(Table::Post, RecordId(1), &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Value::Object(stored), json!({ "Id": 1, "title": "a", "upvotes": 2 }));

        let res = server
            .update_records(
                Table::Post,
                vec![
                    record(json!({ "Id": 1, "upvotes": 3 })),
                    record(json!({ "Id": 5, "upvotes": 3 })),
                ],
            )
            .await;
        assert_eq!(
            res,
            Err(Error::NotFound {
                table: Table::Post,
                id: RecordId(5)
            })
        );
        assert_eq!(server.test_records(Table::Post)[0]["upvotes"], json!(2));
    }

    #[tokio::test]
    async fn injected_failures() {
        let server = MockServer::new();
        server.fail(Operation::Update);
        server
            .create_records(Table::Comment, vec![record(json!({ "content": "hi" }))])
            .await
            .unwrap();
        assert!(matches!(
            server
                .update_records(Table::Comment, vec![record(json!({ "Id": 1 }))])
                .await,
            Err(Error::Store(_))
        ));
        assert_eq!(server.test_num_calls(Operation::Update), 1);
        server.heal();
        server
            .update_records(Table::Comment, vec![record(json!({ "Id": 1 }))])
            .await
            .unwrap();
        server
            .delete_records(Table::Comment, vec![RecordId(1)])
            .await
            .unwrap();
        assert!(server.test_records(Table::Comment).is_empty());
        assert_eq!(server.test_num_calls(Operation::Delete), 1);
    }
}
