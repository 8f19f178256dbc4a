use crate::backend::{arguments, Backend};
use crate::error::SqlxErrorExt;
use crate::tx::Tx;
use sqlx::{Database, Executor, FromRow, IntoArguments, Pool};
use std::marker::PhantomData;
use strata_data::entity::row_of;
use strata_data::{Changes, DataError, Entity, Query, RecordId, RecordStore, SqlRenderer, Value};

/// A generic SQL-backed [`RecordStore`].
///
/// Wraps an `sqlx::Pool<DB>` for a given entity type; every [`Query`] is
/// rendered to parameterized SQL in the backend's dialect.
///
/// # Example
///
/// ```ignore
/// let store = SqlxStore::<Todo, Sqlite>::new(pool.clone());
/// let todos = Mapper::new(store);
/// ```
pub struct SqlxStore<T, DB: Database> {
    pool: Pool<DB>,
    renderer: SqlRenderer,
    _marker: PhantomData<fn() -> T>,
}

impl<T, DB: Backend> SqlxStore<T, DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self {
            pool,
            renderer: SqlRenderer::new(DB::DIALECT),
            _marker: PhantomData,
        }
    }
}

impl<T, DB: Database> SqlxStore<T, DB> {
    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    pub fn renderer(&self) -> &SqlRenderer {
        &self.renderer
    }
}

impl<T, DB: Database> Clone for SqlxStore<T, DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            renderer: self.renderer,
            _marker: PhantomData,
        }
    }
}

impl<T, DB> SqlxStore<T, DB>
where
    T: Entity,
    DB: Backend,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    (i64,): for<'r> FromRow<'r, DB::Row>,
{
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DataError> {
        tracing::debug!(sql, params = params.len(), "execute");
        let args = arguments::<DB>(params)?;
        let result = sqlx::query_with::<DB, _>(sql, args)
            .execute(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        Ok(DB::rows_affected(&result))
    }

    /// Insert rows that carry no column at all: one `DEFAULT VALUES`
    /// statement per record, in one transaction.
    async fn insert_defaults(&self, count: usize) -> Result<Vec<i64>, DataError> {
        let stmt = self
            .renderer
            .insert(T::table_name(), &[], &[Vec::new()], Some(T::id_column()))?;
        let mut tx = Tx::begin(&self.pool).await?;
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            tracing::debug!(sql = %stmt.sql, "insert");
            let args = arguments::<DB>(&stmt.params)?;
            let id = sqlx::query_scalar_with::<DB, i64, _>(&stmt.sql, args)
                .fetch_one(tx.as_mut())
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            ids.push(id);
        }
        tx.commit().await?;
        Ok(ids)
    }
}

impl<T, DB> RecordStore<T> for SqlxStore<T, DB>
where
    T: Entity + for<'r> FromRow<'r, DB::Row>,
    DB: Backend,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    (i64,): for<'r> FromRow<'r, DB::Row>,
{
    async fn fetch(&self, query: &Query) -> Result<Vec<T>, DataError> {
        let stmt = self.renderer.select(query, T::columns())?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "fetch");
        let args = arguments::<DB>(&stmt.params)?;
        let rows = sqlx::query_as_with::<DB, T, _>(&stmt.sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        Ok(rows)
    }

    async fn fetch_one(&self, query: &Query) -> Result<T, DataError> {
        let stmt = self.renderer.select(&query.clone().limit(1), T::columns())?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "fetch one");
        let args = arguments::<DB>(&stmt.params)?;
        let row = sqlx::query_as_with::<DB, T, _>(&stmt.sql, args)
            .fetch_optional(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        row.ok_or_else(|| DataError::no_match(T::table_name()))
    }

    async fn count(&self, query: &Query) -> Result<u64, DataError> {
        let stmt = self.renderer.count(query)?;
        tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), "count");
        let args = arguments::<DB>(&stmt.params)?;
        let count = sqlx::query_scalar_with::<DB, i64, _>(&stmt.sql, args)
            .fetch_one(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn insert(&self, records: &mut [T]) -> Result<u64, DataError> {
        if records.is_empty() {
            return Ok(0);
        }
        let assigned = records.iter().filter(|r| r.id() != 0).count();
        if assigned != 0 && assigned != records.len() {
            return Err(DataError::Validation(format!(
                "cannot mix assigned and unassigned ids in one {} insert",
                T::table_name()
            )));
        }

        let rows = records.iter().map(row_of).collect::<Result<Vec<_>, _>>()?;
        let columns: Vec<&str> = rows
            .first()
            .map(|row| row.iter().map(|(c, _)| *c).collect())
            .unwrap_or_default();
        let ids = if columns.is_empty() {
            self.insert_defaults(records.len()).await?
        } else {
            let values: Vec<Vec<Value>> = rows
                .into_iter()
                .map(|row| row.into_iter().map(|(_, v)| v).collect())
                .collect();
            let stmt =
                self.renderer
                    .insert(T::table_name(), &columns, &values, Some(T::id_column()))?;
            tracing::debug!(sql = %stmt.sql, rows = values.len(), "insert");
            let args = arguments::<DB>(&stmt.params)?;
            let ids = sqlx::query_scalar_with::<DB, i64, _>(&stmt.sql, args)
                .fetch_all(&self.pool)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            ids
        };

        if ids.len() != records.len() {
            return Err(DataError::Other(format!(
                "insert into {} returned {} ids for {} rows",
                T::table_name(),
                ids.len(),
                records.len()
            )));
        }
        for (record, id) in records.iter_mut().zip(ids) {
            let id = RecordId::try_from(id)
                .map_err(|_| DataError::Other(format!("negative id {id} returned")))?;
            record.set_id(id);
        }
        Ok(records.len() as u64)
    }

    async fn update(&self, query: &Query, changes: &Changes) -> Result<u64, DataError> {
        let stmt = self.renderer.update(query, changes)?;
        self.execute(&stmt.sql, &stmt.params).await
    }

    async fn delete(&self, query: &Query) -> Result<u64, DataError> {
        let stmt = self.renderer.delete(query)?;
        self.execute(&stmt.sql, &stmt.params).await
    }

    async fn delete_atomic(&self, queries: &[Query]) -> Result<u64, DataError> {
        let mut tx = Tx::begin(&self.pool).await?;
        let mut deleted = 0;
        for query in queries {
            let stmt = self.renderer.delete(query)?;
            tracing::debug!(sql = %stmt.sql, "delete in transaction");
            let args = arguments::<DB>(&stmt.params)?;
            let result = sqlx::query_with::<DB, _>(&stmt.sql, args)
                .execute(tx.as_mut())
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            match DB::rows_affected(&result) {
                0 => {
                    tracing::warn!(table = T::table_name(), "batch delete matched no record, rolling back");
                    return Err(DataError::no_match(T::table_name()));
                }
                n => deleted += n,
            }
        }
        tx.commit().await?;
        Ok(deleted)
    }
}
