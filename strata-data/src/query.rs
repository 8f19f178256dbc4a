use crate::entity::{Entity, RecordId};
use crate::value::Value;

/// A typed, storage-independent query: the target table plus the conditions,
/// ordering and paging that narrow it.
///
/// Filters receive a `Query` and return a narrowed one. Stores either render
/// it to SQL (see [`crate::sql`]) or evaluate it directly.
///
/// # Example
///
/// ```ignore
/// let q = Query::for_entity::<Todo>()
///     .where_eq("done", false)
///     .where_like("title", "%milk%")
///     .order_by("id", Direction::Asc)
///     .limit(10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    id_column: String,
    conditions: Vec<Condition>,
    order: Vec<Order>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    NotEq(String, Value),
    Gt(String, Value),
    Ge(String, Value),
    Lt(String, Value),
    Le(String, Value),
    Like(String, String),
    In(String, Vec<Value>),
    IsNull(String),
    IsNotNull(String),
}

impl Condition {
    /// The column this condition restricts.
    pub fn column(&self) -> &str {
        match self {
            Condition::Eq(col, _)
            | Condition::NotEq(col, _)
            | Condition::Gt(col, _)
            | Condition::Ge(col, _)
            | Condition::Lt(col, _)
            | Condition::Le(col, _)
            | Condition::Like(col, _)
            | Condition::In(col, _)
            | Condition::IsNull(col)
            | Condition::IsNotNull(col) => col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: Direction::Desc,
        }
    }
}

impl Query {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            id_column: "id".to_string(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Create a query over `T`'s table, aware of its id column.
    pub fn for_entity<T: Entity>() -> Self {
        let mut query = Self::new(T::table_name());
        query.id_column = T::id_column().to_string();
        query
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn order(&self) -> &[Order] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit_val
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset_val
    }

    pub fn is_ordered(&self) -> bool {
        !self.order.is_empty()
    }

    // Identical conditions are kept once, so narrowing twice with the same
    // filter yields the same query.
    fn push(mut self, condition: Condition) -> Self {
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
        self
    }

    pub fn where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.push(Condition::Eq(column.to_string(), value.into()))
    }

    pub fn where_not_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.push(Condition::NotEq(column.to_string(), value.into()))
    }

    pub fn where_gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.push(Condition::Gt(column.to_string(), value.into()))
    }

    pub fn where_ge(self, column: &str, value: impl Into<Value>) -> Self {
        self.push(Condition::Ge(column.to_string(), value.into()))
    }

    pub fn where_lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.push(Condition::Lt(column.to_string(), value.into()))
    }

    pub fn where_le(self, column: &str, value: impl Into<Value>) -> Self {
        self.push(Condition::Le(column.to_string(), value.into()))
    }

    pub fn where_like(self, column: &str, pattern: &str) -> Self {
        self.push(Condition::Like(column.to_string(), pattern.to_string()))
    }

    pub fn where_in<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.push(Condition::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn where_null(self, column: &str) -> Self {
        self.push(Condition::IsNull(column.to_string()))
    }

    pub fn where_not_null(self, column: &str) -> Self {
        self.push(Condition::IsNotNull(column.to_string()))
    }

    /// Restrict to the record with the given id.
    ///
    /// Stored ids fit in an `i64`; a larger id matches nothing.
    pub fn where_id(self, id: RecordId) -> Self {
        let column = self.id_column.clone();
        match i64::try_from(id) {
            Ok(id) => self.where_eq(&column, id),
            Err(_) => self.push(Condition::In(column, Vec::new())),
        }
    }

    /// Restrict to records whose id is in `ids`. Ids above `i64::MAX` are
    /// dropped from the set.
    pub fn where_id_in(self, ids: &[RecordId]) -> Self {
        let column = self.id_column.clone();
        self.where_in(
            &column,
            ids.iter().filter_map(|id| i64::try_from(*id).ok()),
        )
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Append every order of `orders`.
    pub fn order_by_all(mut self, orders: &[Order]) -> Self {
        self.order.extend(orders.iter().cloned());
        self
    }

    pub fn clear_order(mut self) -> Self {
        self.order.clear();
        self
    }

    /// Order ascending by id unless an order is already present.
    pub fn ordered_by_id_if_unordered(self) -> Self {
        if self.is_ordered() {
            return self;
        }
        let column = self.id_column.clone();
        self.order_by(&column, Direction::Asc)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    /// Drop any limit/offset a filter may have set.
    pub fn without_paging(mut self) -> Self {
        self.limit_val = None;
        self.offset_val = None;
        self
    }
}
