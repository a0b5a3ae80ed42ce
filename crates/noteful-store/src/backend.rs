//! The query interface shared by every backend.
//!
//! Services never build SQL themselves. They hand a [`ResourceDef`] and a
//! [`Record`] to a [`QueryBackend`], which owns statement construction and
//! value coercion for its engine.

use async_trait::async_trait;
use noteful_core::{Field, FieldKind, Record, ResourceDef, ResourceId};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Select / insert-returning / update / delete over one resource table.
///
/// Each call is a single independent statement; there are no transactions
/// spanning calls.
#[async_trait]
pub trait QueryBackend: Send + Sync + std::fmt::Debug {
    /// Every row of the table.
    async fn select_all(&self, resource: &'static ResourceDef) -> StoreResult<Vec<Record>>;

    /// The row with `id`, if any.
    async fn select_by_id(
        &self,
        resource: &'static ResourceDef,
        id: ResourceId,
    ) -> StoreResult<Option<Record>>;

    /// Insert `values` and return the persisted row, generated `id` included.
    async fn insert_returning(
        &self,
        resource: &'static ResourceDef,
        values: &Record,
    ) -> StoreResult<Record>;

    /// Set `values` on the row with `id`. Returns the number of rows affected.
    async fn update(
        &self,
        resource: &'static ResourceDef,
        id: ResourceId,
        values: &Record,
    ) -> StoreResult<u64>;

    /// Delete the row with `id`. Returns the number of rows affected.
    async fn delete(&self, resource: &'static ResourceDef, id: ResourceId) -> StoreResult<u64>;
}

/// Convert a JSON value into what `field`'s column stores.
///
/// Text columns take strings verbatim and any other non-null value as its JSON
/// text. Integer columns take integers and integer strings. `null` passes
/// through so the column constraint decides.
pub fn coerce(resource: &ResourceDef, field: &Field, value: &Value) -> StoreResult<Value> {
    match (field.kind, value) {
        (_, Value::Null) => Ok(Value::Null),
        (FieldKind::Text, Value::String(_)) => Ok(value.clone()),
        (FieldKind::Text, other) => Ok(Value::String(other.to_string())),
        (FieldKind::Integer, Value::Number(n)) => n.as_i64().map(Value::from).ok_or_else(|| {
            invalid(resource, field, format!("{n} is not a 64-bit integer"))
        }),
        (FieldKind::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(resource, field, format!("{s:?} is not an integer"))),
        (FieldKind::Integer, other) => {
            Err(invalid(resource, field, format!("{other} is not an integer")))
        }
    }
}

/// Coerce every entry of `values`, rejecting columns the resource does not declare.
pub fn coerce_record(
    resource: &ResourceDef,
    values: &Record,
) -> StoreResult<Vec<(&'static Field, Value)>> {
    values
        .iter()
        .map(|(column, value)| {
            let field = resource
                .fields
                .iter()
                .find(|f| f.name == column.as_str())
                .ok_or_else(|| StoreError::UnknownColumn {
                    table: resource.table,
                    column: column.clone(),
                })?;
            Ok((field, coerce(resource, field, value)?))
        })
        .collect()
}

fn invalid(resource: &ResourceDef, field: &Field, reason: String) -> StoreError {
    StoreError::InvalidValue {
        table: resource.table,
        column: field.name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteful_core::{BOOKMARKS, NOTES};
    use serde_json::json;

    fn folderid() -> &'static Field {
        NOTES.field("folderid").unwrap()
    }

    #[test]
    fn text_columns_store_json_text() {
        let rating = BOOKMARKS.field("rating").unwrap();
        assert_eq!(coerce(&BOOKMARKS, rating, &json!("5")).unwrap(), json!("5"));
        assert_eq!(coerce(&BOOKMARKS, rating, &json!(5)).unwrap(), json!("5"));
        assert_eq!(coerce(&BOOKMARKS, rating, &json!(4.5)).unwrap(), json!("4.5"));
        assert_eq!(coerce(&BOOKMARKS, rating, &json!(true)).unwrap(), json!("true"));
        assert_eq!(coerce(&BOOKMARKS, rating, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn integer_columns_accept_numbers_and_numeric_strings() {
        assert_eq!(coerce(&NOTES, folderid(), &json!(3)).unwrap(), json!(3));
        assert_eq!(coerce(&NOTES, folderid(), &json!(" 12 ")).unwrap(), json!(12));
    }

    #[test]
    fn integer_columns_reject_other_values() {
        for value in [json!("abc"), json!(1.5), json!([1]), json!(true)] {
            let err = coerce(&NOTES, folderid(), &value).unwrap_err();
            assert!(matches!(err, StoreError::InvalidValue { column, .. } if column == "folderid"));
        }
    }

    #[test]
    fn coerce_record_rejects_unknown_columns() {
        let values = json!({ "title": "t", "owner": "x" });
        let err = coerce_record(&NOTES, values.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { column, .. } if column == "owner"));
    }
}
