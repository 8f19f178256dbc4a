//! Transaction wrapper used for all-or-nothing batches.

use crate::error::SqlxErrorExt;
use sqlx::{Database, Pool, Transaction};
use std::ops::{Deref, DerefMut};
use strata_data::DataError;

/// A wrapper around SQLx [`Transaction`].
///
/// The transaction is:
/// - Begun from a pool with [`Tx::begin`]
/// - Committed only by an explicit [`Tx::commit`]
/// - Rolled back (on drop) if it goes out of scope first, e.g. on an early `?`
///
/// # Example
///
/// ```ignore
/// let mut tx = Tx::begin(store.pool()).await?;
/// sqlx::query("DELETE FROM todos WHERE id = ?")
///     .bind(1_i64)
///     .execute(tx.as_mut())
///     .await
///     .map_err(|e| e.into_data_error())?;
/// tx.commit().await?;
/// ```
pub struct Tx<'a, DB: Database>(pub Transaction<'a, DB>);

impl<'a, DB: Database> Deref for Tx<'a, DB> {
    type Target = Transaction<'a, DB>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, DB: Database> DerefMut for Tx<'a, DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<DB: Database> Tx<'static, DB> {
    pub async fn begin(pool: &Pool<DB>) -> Result<Self, DataError> {
        let tx = pool.begin().await.map_err(SqlxErrorExt::into_data_error)?;
        Ok(Tx(tx))
    }
}

impl<'a, DB: Database> Tx<'a, DB> {
    /// Unwraps the `Tx` into the inner `Transaction`.
    pub fn into_inner(self) -> Transaction<'a, DB> {
        self.0
    }

    /// Returns a mutable reference to the underlying connection.
    pub fn as_mut(&mut self) -> &mut <DB as Database>::Connection {
        &mut *self.0
    }

    pub async fn commit(self) -> Result<(), DataError> {
        self.into_inner()
            .commit()
            .await
            .map_err(SqlxErrorExt::into_data_error)
    }

    pub async fn rollback(self) -> Result<(), DataError> {
        self.into_inner()
            .rollback()
            .await
            .map_err(SqlxErrorExt::into_data_error)
    }
}
