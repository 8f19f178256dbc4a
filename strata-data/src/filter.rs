use crate::entity::RecordId;
use crate::query::Query;

/// A composable narrowing of a base [`Query`].
///
/// Filters only add conditions (or ordering); they never perform I/O. Every
/// mapper operation accepts one, so the same filter drives reads, counts,
/// updates and deletes alike.
///
/// Any `Fn(Query) -> Query` closure is a filter:
///
/// ```ignore
/// let open = |q: Query| q.where_eq("done", false);
/// let page = mapper.paginate_cursor(&open, CursorRequest::new(0, 20)).await?;
/// let n = mapper.count(&open).await?;
/// ```
pub trait Filter: Send + Sync {
    fn apply(&self, query: Query) -> Query;

    /// Narrow by `self`, then by `other`.
    fn and<F: Filter>(self, other: F) -> And<Self, F>
    where
        Self: Sized,
    {
        And(self, other)
    }
}

impl<F> Filter for F
where
    F: Fn(Query) -> Query + Send + Sync,
{
    fn apply(&self, query: Query) -> Query {
        self(query)
    }
}

/// The identity filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unfiltered;

impl Filter for Unfiltered {
    fn apply(&self, query: Query) -> Query {
        query
    }
}

/// Equality on the id column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ById(pub RecordId);

impl Filter for ById {
    fn apply(&self, query: Query) -> Query {
        query.where_id(self.0)
    }
}

/// Membership of the id column in a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByIds(pub Vec<RecordId>);

impl Filter for ByIds {
    fn apply(&self, query: Query) -> Query {
        query.where_id_in(&self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<A: Filter, B: Filter> Filter for And<A, B> {
    fn apply(&self, query: Query) -> Query {
        self.1.apply(self.0.apply(query))
    }
}

pub fn by_id(id: RecordId) -> ById {
    ById(id)
}

pub fn by_ids(ids: impl IntoIterator<Item = RecordId>) -> ByIds {
    ByIds(ids.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Condition;
    use crate::value::Value;

    #[test]
    fn test_closure_filter() {
        let f = |q: Query| q.where_eq("done", false);
        let q = f.apply(Query::new("todos"));
        assert_eq!(
            q.conditions(),
            &[Condition::Eq("done".into(), Value::Bool(false))]
        );
    }

    #[test]
    fn test_filters_are_idempotent() {
        let f = (|q: Query| q.where_like("title", "%a%")).and(by_id(3));
        let once = f.apply(Query::new("todos"));
        let twice = f.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unfiltered_is_identity() {
        let q = Query::new("todos").where_gt("id", 1);
        assert_eq!(Unfiltered.apply(q.clone()), q);
    }

    #[test]
    fn test_by_ids_uses_id_column() {
        let q = by_ids([1, 2]).apply(Query::new("todos"));
        assert_eq!(
            q.conditions(),
            &[Condition::In("id".into(), vec![Value::Int(1), Value::Int(2)])]
        );
    }
}
