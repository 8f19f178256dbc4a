use crate::entity::{Entity, RecordId};
use crate::error::DataError;
use crate::filter::{by_id, by_ids, Filter, Unfiltered};
use crate::mapper::Mapper;
use crate::page::{Page, Pageable, Sort};
use crate::query::Query;
use crate::store::RecordStore;
use std::future::Future;

/// Generic async repository trait for CRUD operations.
///
/// Uses RPITIT (return-position `impl Trait` in traits), so no `async-trait` is needed.
pub trait CrudRepository<T>: Send + Sync
where
    T: Entity,
{
    /// Insert `entity` and return it with its assigned id.
    fn save(&self, entity: T) -> impl Future<Output = Result<T, DataError>> + Send;
    /// Insert every entity with one store call.
    fn save_all(&self, entities: Vec<T>) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;
    fn find_by_id(&self, id: RecordId) -> impl Future<Output = Result<T, DataError>> + Send;
    /// `false` when [`CrudRepository::find_by_id`] reports `NotFound`; other
    /// errors propagate.
    fn exists_by_id(&self, id: RecordId) -> impl Future<Output = Result<bool, DataError>> + Send;
    fn find_all(&self) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;
    fn find_all_by_id(&self, ids: &[RecordId]) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;
    fn count(&self) -> impl Future<Output = Result<u64, DataError>> + Send;
    fn delete_by_id(&self, id: RecordId) -> impl Future<Output = Result<(), DataError>> + Send;
    fn delete(&self, entity: &T) -> impl Future<Output = Result<(), DataError>> + Send;
    /// One batch delete by id membership; returns how many rows went away.
    fn delete_all_by_id(&self, ids: &[RecordId]) -> impl Future<Output = Result<u64, DataError>> + Send;
    /// Delete each entity inside one transaction: all or nothing.
    fn delete_all(&self, entities: &[T]) -> impl Future<Output = Result<(), DataError>> + Send;
}

/// Sort- and page-aware listing on top of [`CrudRepository`].
pub trait PagingRepository<T>: CrudRepository<T>
where
    T: Entity,
{
    fn find_all_by_sort(&self, sort: &Sort) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;
    fn find_all_by_page(&self, pageable: &Pageable) -> impl Future<Output = Result<Page<T>, DataError>> + Send;
}

/// The repository facade over a [`Mapper`].
///
/// # Example
///
/// ```ignore
/// let repo = MapperRepository::<Todo, _>::new(MemoryStore::new());
/// let saved = repo.save_all(vec![Todo::new("a"), Todo::new("b")]).await?;
/// let page = repo.find_all_by_page(&Pageable::of(0, 10)).await?;
/// ```
pub struct MapperRepository<T, S> {
    mapper: Mapper<T, S>,
}

impl<T, S> MapperRepository<T, S> {
    pub fn new(store: S) -> Self {
        Self {
            mapper: Mapper::new(store),
        }
    }

    pub fn mapper(&self) -> &Mapper<T, S> {
        &self.mapper
    }
}

impl<T, S: Clone> Clone for MapperRepository<T, S> {
    fn clone(&self) -> Self {
        Self {
            mapper: self.mapper.clone(),
        }
    }
}

impl<T: Entity, S> From<Mapper<T, S>> for MapperRepository<T, S> {
    fn from(mapper: Mapper<T, S>) -> Self {
        Self { mapper }
    }
}

fn sorted_query<T: Entity>(sort: &Sort) -> Result<Query, DataError> {
    if let Some(order) = sort.orders().iter().find(|o| !T::has_column(&o.column)) {
        return Err(DataError::Validation(format!(
            "cannot sort {} by unknown column {}",
            T::table_name(),
            order.column
        )));
    }
    Ok(Query::for_entity::<T>()
        .order_by_all(sort.orders())
        .ordered_by_id_if_unordered())
}

impl<T, S> CrudRepository<T> for MapperRepository<T, S>
where
    T: Entity,
    S: RecordStore<T>,
{
    async fn save(&self, mut entity: T) -> Result<T, DataError> {
        self.mapper.create(&mut entity).await?;
        Ok(entity)
    }

    async fn save_all(&self, mut entities: Vec<T>) -> Result<Vec<T>, DataError> {
        if entities.is_empty() {
            return Ok(entities);
        }
        self.mapper.store().insert(&mut entities).await?;
        Ok(entities)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<T, DataError> {
        self.mapper.one_by_id(id).await
    }

    async fn exists_by_id(&self, id: RecordId) -> Result<bool, DataError> {
        match self.find_by_id(id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn find_all(&self) -> Result<Vec<T>, DataError> {
        self.mapper.all(&Unfiltered).await
    }

    async fn find_all_by_id(&self, ids: &[RecordId]) -> Result<Vec<T>, DataError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.mapper.all(&by_ids(ids.iter().copied())).await
    }

    async fn count(&self) -> Result<u64, DataError> {
        self.mapper.count(&Unfiltered).await
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<(), DataError> {
        self.mapper.delete_by_id(id).await
    }

    async fn delete(&self, entity: &T) -> Result<(), DataError> {
        self.mapper.delete_by_id(entity.id()).await
    }

    async fn delete_all_by_id(&self, ids: &[RecordId]) -> Result<u64, DataError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let query = by_ids(ids.iter().copied()).apply(Query::for_entity::<T>());
        self.mapper.store().delete(&query).await
    }

    async fn delete_all(&self, entities: &[T]) -> Result<(), DataError> {
        if entities.is_empty() {
            return Ok(());
        }
        let queries: Vec<Query> = entities
            .iter()
            .map(|e| by_id(e.id()).apply(Query::for_entity::<T>()))
            .collect();
        let deleted = self.mapper.store().delete_atomic(&queries).await?;
        tracing::debug!(table = T::table_name(), deleted, "batch delete committed");
        Ok(())
    }
}

impl<T, S> PagingRepository<T> for MapperRepository<T, S>
where
    T: Entity,
    S: RecordStore<T>,
{
    async fn find_all_by_sort(&self, sort: &Sort) -> Result<Vec<T>, DataError> {
        let query = sorted_query::<T>(sort)?;
        self.mapper.store().fetch(&query).await
    }

    /// Fetch one sorted page (limit/offset pushed to the store) and the total.
    async fn find_all_by_page(&self, pageable: &Pageable) -> Result<Page<T>, DataError> {
        let mut query = sorted_query::<T>(&pageable.sort)?;
        if pageable.is_paged() {
            query = query.limit(pageable.size).offset(pageable.offset());
        }
        let content = self.mapper.store().fetch(&query).await?;
        let total = self.mapper.count(&Unfiltered).await?;
        Ok(Page::new(content, pageable, total))
    }
}
