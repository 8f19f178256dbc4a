use crate::error::DataError;
use crate::value::Value;
use serde::Serialize;

/// Identifier type shared by every entity: unique, monotonically assigned,
/// totally ordered. `0` means "not assigned yet".
pub type RecordId = u64;

/// Trait representing a stored record with a table name, id column, and column list.
///
/// Rows written to a store are derived from the record's `Serialize` output,
/// restricted to [`Entity::columns`].
///
/// # Example
///
/// ```ignore
/// impl Entity for Todo {
///     fn table_name() -> &'static str { "todos" }
///     fn columns() -> &'static [&'static str] { &["id", "title", "done"] }
///     fn id(&self) -> RecordId { self.id as RecordId }
///     fn set_id(&mut self, id: RecordId) { self.id = id as i64; }
/// }
/// ```
pub trait Entity: Serialize + Send + Sync + Unpin + 'static {
    fn table_name() -> &'static str;

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [&'static str];

    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);

    /// Whether `column` is one of this entity's columns.
    fn has_column(column: &str) -> bool {
        Self::columns().contains(&column)
    }
}

/// Column/value pairs of `entity`, in [`Entity::columns`] order.
///
/// The id column is left out when the record has no id yet so the store can
/// assign one.
pub fn row_of<T: Entity>(entity: &T) -> Result<Vec<(&'static str, Value)>, DataError> {
    let json = serde_json::to_value(entity)?;
    let serde_json::Value::Object(mut fields) = json else {
        return Err(DataError::Other(format!(
            "{} does not serialize to an object",
            T::table_name()
        )));
    };
    let skip_id = entity.id() == 0;
    let mut row = Vec::with_capacity(T::columns().len());
    for &column in T::columns() {
        if skip_id && column == T::id_column() {
            continue;
        }
        let value = fields.remove(column).map(Value::from).unwrap_or(Value::Null);
        row.push((column, value));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Note {
        id: u64,
        body: String,
        pinned: bool,
    }

    impl Entity for Note {
        fn table_name() -> &'static str {
            "notes"
        }
        fn columns() -> &'static [&'static str] {
            &["id", "body", "pinned"]
        }
        fn id(&self) -> RecordId {
            self.id
        }
        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }
    }

    #[test]
    fn test_row_skips_unassigned_id() {
        let note = Note { id: 0, body: "hi".into(), pinned: true };
        let row = row_of(&note).unwrap();
        assert_eq!(
            row,
            vec![("body", Value::Text("hi".into())), ("pinned", Value::Bool(true))]
        );
    }

    #[test]
    fn test_row_keeps_assigned_id() {
        let note = Note { id: 7, body: "hi".into(), pinned: false };
        let row = row_of(&note).unwrap();
        assert_eq!(row[0], ("id", Value::Int(7)));
        assert_eq!(row.len(), 3);
    }
}
