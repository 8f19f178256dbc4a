//! In-memory [`RecordStore`] for tests and prototypes.
//!
//! Records are kept as their serde JSON representation in id order, and
//! [`Query`] conditions are evaluated against those objects with SQL
//! semantics (`NULL` never compares equal, `LIKE` with `%` and `_`).

use crate::changes::Changes;
use crate::entity::{Entity, RecordId};
use crate::error::DataError;
use crate::query::{Condition, Direction, Order, Query};
use crate::store::RecordStore;
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Row = serde_json::Map<String, serde_json::Value>;

/// Ids are kept within the range SQL stores can hold.
const MAX_ID: RecordId = i64::MAX as RecordId;

/// A constraint rejected by the in-memory store (duplicate id, mistyped column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation(pub String);

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "constraint violation: {}", self.0)
    }
}

impl std::error::Error for ConstraintViolation {}

#[derive(Default)]
struct Table {
    rows: BTreeMap<RecordId, Row>,
    next_id: RecordId,
}

/// A thread-safe in-memory store. Clones share the same table.
pub struct MemoryStore<T> {
    inner: Arc<RwLock<Table>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
            _marker: PhantomData,
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, DataError> {
        self.inner
            .read()
            .map_err(|_| DataError::Other("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, DataError> {
        self.inner
            .write()
            .map_err(|_| DataError::Other("memory store lock poisoned".into()))
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity + DeserializeOwned> MemoryStore<T> {
    fn fetch_rows(&self, query: &Query) -> Result<Vec<T>, DataError> {
        let table = self.read()?;
        let mut rows: Vec<&Row> = table.rows.values().filter(|r| matches(query, r)).collect();
        sort_rows(&mut rows, query.order());
        let offset = usize::try_from(query.offset_value().unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit_value()
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        rows.into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| serde_json::from_value(serde_json::Value::Object(row.clone())).map_err(DataError::from))
            .collect()
    }

    fn count_rows(&self, query: &Query) -> Result<u64, DataError> {
        let table = self.read()?;
        Ok(table.rows.values().filter(|r| matches(query, r)).count() as u64)
    }

    fn insert_rows(&self, records: &mut [T]) -> Result<u64, DataError> {
        let mut table = self.write()?;
        let mut next_id = table.next_id;
        let mut staged = Vec::with_capacity(records.len());
        for record in records.iter_mut() {
            let id = match record.id() {
                0 => next_id,
                id => {
                    if table.rows.contains_key(&id) || staged.iter().any(|(s, _)| *s == id) {
                        return Err(DataError::database(ConstraintViolation(format!(
                            "duplicate {} id {id}",
                            T::table_name()
                        ))));
                    }
                    id
                }
            };
            if id > MAX_ID {
                return Err(DataError::database(ConstraintViolation(format!(
                    "{} id {id} is out of range",
                    T::table_name()
                ))));
            }
            next_id = next_id.max(id.checked_add(1).unwrap_or(RecordId::MAX));
            record.set_id(id);
            staged.push((id, to_row(record)?));
        }
        let inserted = staged.len() as u64;
        table.rows.extend(staged);
        table.next_id = next_id;
        Ok(inserted)
    }

    fn update_rows(&self, query: &Query, changes: &Changes) -> Result<u64, DataError> {
        let mut table = self.write()?;
        let id_column = T::id_column();
        let mut staged = Vec::new();
        for (id, row) in table.rows.iter().filter(|(_, r)| matches(query, r)) {
            let mut row = row.clone();
            for (column, value) in changes.iter() {
                row.insert(column.to_string(), value.clone().into());
            }
            // Reject values the record type cannot hold.
            serde_json::from_value::<T>(serde_json::Value::Object(row.clone())).map_err(|e| {
                DataError::database(ConstraintViolation(format!("{}: {e}", T::table_name())))
            })?;
            let new_id = match changes.get(id_column) {
                Some(Value::Int(new_id)) if *new_id > 0 => *new_id as RecordId,
                Some(other) => {
                    return Err(DataError::database(ConstraintViolation(format!(
                        "invalid {id_column} value {other}"
                    ))))
                }
                None => *id,
            };
            staged.push((*id, new_id, row));
        }
        for (old_id, new_id, _) in &staged {
            if old_id != new_id
                && table.rows.contains_key(new_id)
                && !staged.iter().any(|(o, _, _)| o == new_id)
            {
                return Err(DataError::database(ConstraintViolation(format!(
                    "duplicate {} id {new_id}",
                    T::table_name()
                ))));
            }
        }
        let updated = staged.len() as u64;
        for (old_id, _, _) in &staged {
            table.rows.remove(old_id);
        }
        for (_, new_id, row) in staged {
            table.next_id = table.next_id.max(new_id + 1);
            table.rows.insert(new_id, row);
        }
        Ok(updated)
    }

    fn delete_rows(&self, query: &Query) -> Result<u64, DataError> {
        let mut table = self.write()?;
        Ok(remove_matching(&mut table.rows, query))
    }

    fn delete_rows_atomic(&self, queries: &[Query]) -> Result<u64, DataError> {
        let mut table = self.write()?;
        let mut rows = table.rows.clone();
        let mut deleted = 0;
        for query in queries {
            match remove_matching(&mut rows, query) {
                0 => return Err(DataError::no_match(T::table_name())),
                n => deleted += n,
            }
        }
        table.rows = rows;
        Ok(deleted)
    }
}

impl<T: Entity + DeserializeOwned> RecordStore<T> for MemoryStore<T> {
    async fn fetch(&self, query: &Query) -> Result<Vec<T>, DataError> {
        self.fetch_rows(query)
    }

    async fn fetch_one(&self, query: &Query) -> Result<T, DataError> {
        self.fetch_rows(&query.clone().limit(1))?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::no_match(T::table_name()))
    }

    async fn count(&self, query: &Query) -> Result<u64, DataError> {
        self.count_rows(query)
    }

    async fn insert(&self, records: &mut [T]) -> Result<u64, DataError> {
        self.insert_rows(records)
    }

    async fn update(&self, query: &Query, changes: &Changes) -> Result<u64, DataError> {
        self.update_rows(query, changes)
    }

    async fn delete(&self, query: &Query) -> Result<u64, DataError> {
        self.delete_rows(query)
    }

    async fn delete_atomic(&self, queries: &[Query]) -> Result<u64, DataError> {
        self.delete_rows_atomic(queries)
    }
}

fn to_row<T: Entity>(record: &T) -> Result<Row, DataError> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(row) => Ok(row),
        _ => Err(DataError::Other(format!(
            "{} does not serialize to an object",
            T::table_name()
        ))),
    }
}

fn remove_matching(rows: &mut BTreeMap<RecordId, Row>, query: &Query) -> u64 {
    let before = rows.len();
    rows.retain(|_, row| !matches(query, row));
    (before - rows.len()) as u64
}

fn field(row: &Row, column: &str) -> Value {
    row.get(column).cloned().map(Value::from).unwrap_or(Value::Null)
}

fn matches(query: &Query, row: &Row) -> bool {
    query.conditions().iter().all(|c| condition_matches(c, row))
}

fn condition_matches(condition: &Condition, row: &Row) -> bool {
    let value = field(row, condition.column());
    match condition {
        Condition::Eq(_, v) => value.compare(v) == Some(Ordering::Equal),
        Condition::NotEq(_, v) => matches!(value.compare(v), Some(Ordering::Less | Ordering::Greater)),
        Condition::Gt(_, v) => value.compare(v) == Some(Ordering::Greater),
        Condition::Ge(_, v) => matches!(value.compare(v), Some(Ordering::Greater | Ordering::Equal)),
        Condition::Lt(_, v) => value.compare(v) == Some(Ordering::Less),
        Condition::Le(_, v) => matches!(value.compare(v), Some(Ordering::Less | Ordering::Equal)),
        Condition::Like(_, pattern) => !value.is_null() && like(&value.to_string(), pattern),
        Condition::In(_, vals) => vals.iter().any(|v| value.compare(v) == Some(Ordering::Equal)),
        Condition::IsNull(_) => value.is_null(),
        Condition::IsNotNull(_) => !value.is_null(),
    }
}

// NULLs sort first, as in SQLite and MySQL.
fn sort_rows(rows: &mut [&Row], order: &[Order]) {
    if order.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for o in order {
            let (x, y) = (field(a, &o.column), field(b, &o.column));
            let ord = match (x.is_null(), y.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => x.compare(&y).unwrap_or(Ordering::Equal),
            };
            let ord = match o.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// SQL `LIKE`: `%` matches any run, `_` one character; ASCII
/// case-insensitive like SQLite.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    // dp[j]: pattern[..i] matches text[..j]
    let mut dp = vec![false; text.len() + 1];
    dp[0] = true;
    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= dp[j];
                    next[j] = seen;
                }
            }
            _ => {
                for j in 1..=text.len() {
                    next[j] = dp[j - 1] && (*p == '_' || *p == text[j - 1]);
                }
            }
        }
        dp = next;
    }
    dp[text.len()]
}
