//! Typed row helpers
//!
//! Convert between backend rows and the domain types in [`crate::models`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{DataError, DataResult, DataSource, Query, Row, Table};

/// Serialize a record into a row
pub fn to_row<T: Serialize>(record: &T) -> DataResult<Row> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(DataError::Decode(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Deserialize a row into a record
pub fn from_row<T: DeserializeOwned>(row: Row) -> DataResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Select rows and decode each
pub async fn fetch_all<T: DeserializeOwned>(
    data: &dyn DataSource,
    query: &Query,
) -> DataResult<Vec<T>> {
    data.list(query)
        .await?
        .into_iter()
        .map(from_row)
        .collect()
}

/// Fetch one row by id and decode it
pub async fn fetch_one<T: DeserializeOwned>(
    data: &dyn DataSource,
    table: Table,
    id: &str,
) -> DataResult<Option<T>> {
    data.get(table, id).await?.map(from_row).transpose()
}

/// Insert a record and decode the stored row
pub async fn insert_record<T: Serialize + DeserializeOwned>(
    data: &dyn DataSource,
    table: Table,
    record: &T,
) -> DataResult<T> {
    let stored = data.insert(table, to_row(record)?).await?;
    from_row(stored)
}

/// Update columns of one row and decode the stored row
pub async fn update_record<T: DeserializeOwned>(
    data: &dyn DataSource,
    table: Table,
    id: &str,
    changes: Row,
) -> DataResult<T> {
    let stored = data.update(table, id, changes).await?;
    from_row(stored)
}
