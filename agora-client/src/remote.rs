use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{CreateOutcome, Error, FetchQuery, Record, RecordId, RecordStore, Table};

/// `RecordStore` reached over HTTP.
///
/// Every call is a `POST {host}/api/tables/{table}/{call}` with a json body,
/// answered by an `Envelope`. Failed calls are not retried.
#[derive(Clone, Debug)]
pub struct RemoteStore {
    host: String,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    results: Option<Vec<CreateOutcome>>,
}

fn transport(e: reqwest::Error) -> Error {
    Error::Store(e.to_string())
}

impl RemoteStore {
    pub fn new(host: String) -> RemoteStore {
        RemoteStore {
            host,
            client: reqwest::Client::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn call(&self, table: Table, call: &str, body: Value) -> Result<Envelope, Error> {
        let url = format!("{}/api/tables/{table}/{call}", self.host);
        tracing::debug!(%url, "calling record store");
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.map_err(transport)?;
            let err = Error::parse(&body)
                .unwrap_or_else(|_| Error::Store(format!("record store answered {status}")));
            tracing::error!(%url, %status, ?err, "record store call failed");
            return Err(err);
        }
        let envelope: Envelope = resp.json().await.map_err(transport)?;
        if !envelope.success {
            let msg = envelope
                .message
                .unwrap_or_else(|| format!("{call} on {table} failed"));
            tracing::error!(%url, %msg, "record store rejected call");
            return Err(Error::Store(msg));
        }
        Ok(envelope)
    }
}

fn decode<T: serde::de::DeserializeOwned>(data: Option<Value>, what: &str) -> Result<T, Error> {
    serde_json::from_value(data.unwrap_or(Value::Null))
        .map_err(|e| Error::Store(format!("malformed {what} in record store answer: {e}")))
}

#[async_trait(?Send)]
impl RecordStore for RemoteStore {
    async fn fetch_records(&self, table: Table, query: &FetchQuery) -> Result<Vec<Record>, Error> {
        let body = serde_json::to_value(query).map_err(|e| Error::Unknown(e.to_string()))?;
        let env = self.call(table, "fetch", body).await?;
        // An empty result set may come back without any data at all
        match env.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            data => decode(data, "records"),
        }
    }

    async fn get_record_by_id(
        &self,
        table: Table,
        id: RecordId,
        fields: &[String],
    ) -> Result<Option<Record>, Error> {
        let env = self
            .call(table, "get", json!({ "id": id, "fields": fields }))
            .await?;
        decode(env.data, "record")
    }

    async fn create_records(
        &self,
        table: Table,
        records: Vec<Record>,
    ) -> Result<Vec<CreateOutcome>, Error> {
        let env = self
            .call(table, "create", json!({ "records": records }))
            .await?;
        env.results
            .ok_or_else(|| Error::Store(String::from("record store returned no creation results")))
    }

    async fn update_records(&self, table: Table, records: Vec<Record>) -> Result<(), Error> {
        self.call(table, "update", json!({ "records": records }))
            .await?;
        Ok(())
    }

    async fn delete_records(&self, table: Table, ids: Vec<RecordId>) -> Result<(), Error> {
        self.call(table, "delete", json!({ "record_ids": ids }))
            .await?;
        Ok(())
    }
}
