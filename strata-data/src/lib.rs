pub mod changes;
pub mod config;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod memory;
pub mod offset;
pub mod page;
pub mod query;
pub mod repository;
pub mod sql;
pub mod store;
pub mod value;

pub use changes::Changes;
pub use config::{ConfigError, DatabaseConfig, PaginationConfig, StrataConfig};
pub use cursor::{CursorPage, CursorRequest};
pub use entity::{Entity, RecordId};
pub use error::DataError;
pub use filter::{by_id, by_ids, Filter, Unfiltered};
pub use mapper::Mapper;
pub use memory::MemoryStore;
pub use offset::{OffsetPage, OffsetRequest};
pub use page::{Page, Pageable, Sort};
pub use query::{Condition, Direction, Order, Query};
pub use repository::{CrudRepository, MapperRepository, PagingRepository};
pub use sql::{Dialect, SqlRenderer, Statement};
pub use store::RecordStore;
pub use value::Value;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        by_id, by_ids, Changes, CrudRepository, CursorPage, CursorRequest, DataError, Direction,
        Entity, Filter, Mapper, MapperRepository, MemoryStore, OffsetPage, OffsetRequest, Page,
        Pageable, PagingRepository, Query, RecordId, RecordStore, Sort, Unfiltered, Value,
    };
}
