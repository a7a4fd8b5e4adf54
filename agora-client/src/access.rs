//! Typed helpers over the raw `RecordStore` calls, shared by the services

use crate::{
    api::{CreateOutcome, Error, FetchQuery, Record, RecordId, RecordStore, Table},
    schema::{self, FromRecord},
};

pub(crate) async fn fetch<T, S>(store: &S, query: &FetchQuery) -> Result<Vec<T>, Error>
where
    T: FromRecord,
    S: RecordStore,
{
    query.validate()?;
    let records = store.fetch_records(T::TABLE, query).await.map_err(|err| {
        tracing::error!(table = %T::TABLE, ?err, "failed fetching records");
        err
    })?;
    schema::parse_all(&records)
}

pub(crate) async fn get<T, S>(store: &S, id: RecordId) -> Result<T, Error>
where
    T: FromRecord,
    S: RecordStore,
{
    let record = store
        .get_record_by_id(T::TABLE, id, &schema::field_list(T::FIELDS))
        .await?
        .ok_or(Error::NotFound {
            table: T::TABLE,
            id,
        })?;
    T::from_record(&record)
}

/// Creates a single record, returning the store's outcome untouched
pub(crate) async fn create_one<S: RecordStore>(
    store: &S,
    table: Table,
    record: Record,
) -> Result<CreateOutcome, Error> {
    store
        .create_records(table, vec![record])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Store(format!("no outcome returned for {table} creation")))
}

pub(crate) fn created<T: FromRecord>(outcome: CreateOutcome) -> Result<T, Error> {
    match outcome {
        CreateOutcome {
            success: true,
            data: Some(data),
            ..
        } => T::from_record(&data),
        CreateOutcome {
            message, errors, ..
        } => {
            let mut msg = message.unwrap_or_else(|| format!("failed creating {}", T::TABLE));
            for e in errors {
                msg += &format!("; {}: {}", e.field_label, e.message);
            }
            tracing::error!(table = %T::TABLE, %msg, "record creation rejected");
            Err(Error::Store(msg))
        }
    }
}

pub(crate) async fn update_one<S: RecordStore>(
    store: &S,
    table: Table,
    record: Record,
) -> Result<(), Error> {
    store.update_records(table, vec![record]).await.map_err(|err| {
        tracing::error!(%table, ?err, "failed updating record");
        err
    })
}

pub(crate) async fn delete_one<S: RecordStore>(
    store: &S,
    table: Table,
    id: RecordId,
) -> Result<(), Error> {
    store.delete_records(table, vec![id]).await.map_err(|err| {
        tracing::error!(%table, %id, ?err, "failed deleting record");
        err
    })
}

/// Applies a signed delta to a counter that cannot go below zero
pub(crate) fn floored(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floored_counters() {
        assert_eq!(floored(5, -2), 3);
        assert_eq!(floored(1, -10), 0);
        assert_eq!(floored(0, 3), 3);
        assert_eq!(floored(u32::MAX, 1), u32::MAX);
        assert_eq!(floored(7, i64::MIN), 0);
    }
}
