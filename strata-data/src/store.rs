use crate::changes::Changes;
use crate::entity::Entity;
use crate::error::DataError;
use crate::query::Query;
use std::future::Future;

/// The storage-execution contract every backend implements.
///
/// Stores execute already-composed [`Query`] values; they know nothing about
/// pagination or filters. Uses RPITIT (return-position `impl Trait` in
/// traits), so no `async-trait` is needed.
///
/// Errors: driver and constraint failures surface as
/// [`DataError::Database`]. A query matching nothing is success with an
/// empty result, except for [`RecordStore::fetch_one`].
pub trait RecordStore<T: Entity>: Send + Sync {
    /// Every record matching `query`, in the query's order, honoring its
    /// limit and offset.
    fn fetch(&self, query: &Query) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    /// The first record matching `query`, or [`DataError::NotFound`].
    fn fetch_one(&self, query: &Query) -> impl Future<Output = Result<T, DataError>> + Send;

    /// The number of records matching `query`'s conditions.
    fn count(&self, query: &Query) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Insert `records` in a single call, writing assigned ids back into
    /// them. Returns the affected-row count.
    fn insert(&self, records: &mut [T]) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Apply `changes` to every record matching `query`.
    fn update(
        &self,
        query: &Query,
        changes: &Changes,
    ) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Delete every record matching `query`.
    fn delete(&self, query: &Query) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Run one delete per query inside a single transaction.
    ///
    /// If any delete fails or affects zero rows ([`DataError::NotFound`]),
    /// every delete of the batch is rolled back.
    fn delete_atomic(
        &self,
        queries: &[Query],
    ) -> impl Future<Output = Result<u64, DataError>> + Send;
}
