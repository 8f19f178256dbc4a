use crate::changes::Changes;
use crate::cursor::{self, CursorPage, CursorRequest};
use crate::entity::{Entity, RecordId};
use crate::error::DataError;
use crate::filter::{by_id, Filter};
use crate::offset::{self, OffsetPage, OffsetRequest};
use crate::query::Query;
use crate::store::RecordStore;
use std::marker::PhantomData;

/// Generic CRUD and pagination for one entity type over one store.
///
/// Every operation takes a [`Filter`]; the `*_by_id` variants are the same
/// operation with an id-equality filter. Mutations that affect no row fail
/// with [`DataError::NotFound`].
///
/// # Example
///
/// ```ignore
/// let todos = Mapper::<Todo, _>::new(MemoryStore::new());
/// todos.create(&mut Todo::new("buy milk")).await?;
/// let open = |q: Query| q.where_eq("done", false);
/// let page = todos.paginate_cursor(&open, CursorRequest::new(0, 20)).await?;
/// ```
pub struct Mapper<T, S> {
    store: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> Mapper<T, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Get the underlying store reference.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<T, S: Clone> Clone for Mapper<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, S> Mapper<T, S>
where
    T: Entity,
    S: RecordStore<T>,
{
    fn query<F: Filter + ?Sized>(filter: &F) -> Query {
        filter.apply(Query::for_entity::<T>())
    }

    /// The first record matching `filter`.
    pub async fn one<F: Filter + ?Sized>(&self, filter: &F) -> Result<T, DataError> {
        let query = Self::query(filter).ordered_by_id_if_unordered();
        self.store.fetch_one(&query).await
    }

    pub async fn one_by_id(&self, id: RecordId) -> Result<T, DataError> {
        self.one(&by_id(id)).await
    }

    /// Every record matching `filter`, ordered by id unless the filter orders.
    pub async fn all<F: Filter + ?Sized>(&self, filter: &F) -> Result<Vec<T>, DataError> {
        let query = Self::query(filter).ordered_by_id_if_unordered();
        self.store.fetch(&query).await
    }

    pub async fn count<F: Filter + ?Sized>(&self, filter: &F) -> Result<u64, DataError> {
        self.store.count(&Self::query(filter).without_paging()).await
    }

    /// Insert `entity`; the store-assigned id is written back into it.
    pub async fn create(&self, entity: &mut T) -> Result<(), DataError> {
        self.store.insert(std::slice::from_mut(entity)).await?;
        Ok(())
    }

    pub async fn delete<F: Filter + ?Sized>(&self, filter: &F) -> Result<(), DataError> {
        let query = Self::query(filter);
        match self.store.delete(&query).await? {
            0 => {
                tracing::warn!(table = T::table_name(), "delete matched no record");
                Err(DataError::no_match(T::table_name()))
            }
            _ => Ok(()),
        }
    }

    pub async fn delete_by_id(&self, id: RecordId) -> Result<(), DataError> {
        self.delete(&by_id(id)).await
    }

    /// Apply `changes` to every record matching `filter`.
    ///
    /// The id column is stripped from `changes` first. Unknown columns are a
    /// validation error. When nothing is left to set, the call only checks
    /// that a matching record exists.
    pub async fn update<F: Filter + ?Sized>(
        &self,
        filter: &F,
        changes: Changes,
    ) -> Result<(), DataError> {
        let changes = changes.without(T::id_column());
        if let Some((column, _)) = changes.iter().find(|(c, _)| !T::has_column(c)) {
            return Err(DataError::Validation(format!(
                "unknown column {column} for {}",
                T::table_name()
            )));
        }
        let query = Self::query(filter);
        let affected = if changes.is_empty() {
            self.store.count(&query.without_paging()).await?
        } else {
            self.store.update(&query, &changes).await?
        };
        if affected == 0 {
            tracing::warn!(table = T::table_name(), "update matched no record");
            return Err(DataError::no_match(T::table_name()));
        }
        Ok(())
    }

    pub async fn update_by_id(&self, id: RecordId, changes: Changes) -> Result<(), DataError> {
        self.update(&by_id(id), changes).await
    }

    /// Cursor page after `request.start_id` under `filter`.
    pub async fn paginate_cursor<F: Filter + ?Sized>(
        &self,
        filter: &F,
        request: CursorRequest,
    ) -> Result<CursorPage<T>, DataError> {
        cursor::paginate(&self.store, filter, request).await
    }

    /// Numbered page under `filter`, with the total count.
    pub async fn paginate_offset<F: Filter + ?Sized>(
        &self,
        filter: &F,
        request: OffsetRequest,
    ) -> Result<OffsetPage<T>, DataError> {
        offset::paginate(&self.store, filter, request).await
    }
}
