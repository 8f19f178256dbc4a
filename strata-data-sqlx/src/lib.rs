//! # strata-data-sqlx: SQLx backend for the Strata data layer
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-specific
//! implementations for Strata's data access layer. It depends on
//! [`strata-data`] for the abstract traits and types, and adds the store,
//! transaction utilities, and error bridging needed to talk to a real
//! database.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxStore`] | [`RecordStore`](strata_data::RecordStore) over an `sqlx::Pool<DB>` |
//! | [`Backend`] | Per-driver dialect, binding and affected-row glue |
//! | [`Tx`] | Transaction wrapper: explicit commit, rollback on drop |
//! | [`connect`] | Pool setup from a [`DatabaseConfig`](strata_data::DatabaseConfig) |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` (default) |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//!
//! MySQL has no `INSERT ... RETURNING`, so it is not offered as a backend.
//!
//! # Quick start
//!
//! ```ignore
//! use strata_data::prelude::*;
//! use strata_data_sqlx::{connect, SqlxStore};
//! use sqlx::Sqlite;
//!
//! let pool = connect::<Sqlite>(&config.database).await?;
//! let todos = Mapper::new(SqlxStore::<Todo, Sqlite>::new(pool));
//! let page = todos.paginate_cursor(&Unfiltered, CursorRequest::new(0, 20)).await?;
//! ```
//!
//! Entities used with [`SqlxStore`] also derive `sqlx::FromRow`; the store
//! selects exactly [`Entity::columns`](strata_data::Entity::columns).

pub mod backend;
pub mod error;
pub mod pool;
pub mod store;
pub mod tx;

pub use backend::Backend;
pub use error::SqlxErrorExt;
pub use pool::connect;
pub use store::SqlxStore;
pub use tx::Tx;

/// Re-exports of the most commonly used types from both `strata-data` and this crate.
pub mod prelude {
    pub use crate::{connect, Backend, SqlxErrorExt, SqlxStore, Tx};
    pub use strata_data::prelude::*;
}
