//! Request bodies accepted by the REST routes.

use serde::Deserialize;
use strata_data::{Changes, Entity};

/// `{"data": {...}}` body of a create call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest<T> {
    pub data: T,
}

impl<T: Entity> CreateRequest<T> {
    /// The record to insert. Any client-supplied id is cleared so the store
    /// assigns one.
    pub fn into_record(self) -> T {
        let mut record = self.data;
        record.set_id(0);
        record
    }
}

/// `{"data": {...}}` body of an update call: the columns to change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub data: Changes,
}

impl UpdateRequest {
    /// The change set with the identifier column stripped.
    pub fn into_changes<T: Entity>(self) -> Changes {
        self.data.without(T::id_column())
    }
}
