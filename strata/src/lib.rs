//! Strata: generic data access with cursor and offset pagination.
//!
//! This facade crate re-exports the Strata sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use strata::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature    | Default | Crate                        |
//! |------------|---------|------------------------------|
//! | `sqlx`     | no      | `strata-data-sqlx`           |
//! | `sqlite`   | no      | `strata-data-sqlx/sqlite`    |
//! | `postgres` | no      | `strata-data-sqlx/postgres`  |
//! | `http`     | no      | `strata-http`                |
//! | `full`     | no      | All of the above             |

// Re-export everything from strata-data at the top level for convenience.
pub use strata_data::*;

pub use strata_data;

#[cfg(feature = "sqlx")]
pub use strata_data_sqlx;

#[cfg(feature = "http")]
pub use strata_http;

/// Unified prelude: import everything with `use strata::prelude::*`.
///
/// Includes the data prelude plus types from all enabled feature crates.
pub mod prelude {
    pub use strata_data::prelude::*;
    pub use strata_data::{PaginationConfig, StrataConfig};

    #[cfg(feature = "sqlx")]
    pub use strata_data_sqlx::{connect, Backend, SqlxErrorExt, SqlxStore, Tx};

    #[cfg(feature = "http")]
    pub use strata_http::prelude::*;
}
