//! Cursor (keyset) pagination keyed on the last seen id.

use crate::entity::{Entity, RecordId};
use crate::error::DataError;
use crate::filter::Filter;
use crate::query::{Direction, Query};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};

/// Where a cursor page starts and how many records it may hold.
///
/// `start_id = 0` starts from the beginning; otherwise only records with an
/// id strictly greater than `start_id` are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorRequest {
    #[serde(default)]
    pub start_id: RecordId,
    #[serde(default)]
    pub limit: i64,
}

impl CursorRequest {
    pub fn new(start_id: RecordId, limit: i64) -> Self {
        Self { start_id, limit }
    }

    /// The limit as a row count; a non-positive limit is rejected so a page
    /// is never unbounded.
    pub fn checked_limit(&self) -> Result<u64, DataError> {
        u64::try_from(self.limit)
            .ok()
            .filter(|l| *l > 0)
            .ok_or_else(|| {
                DataError::Validation(format!("limit must be positive, got {}", self.limit))
            })
    }
}

/// One cursor page: up to `limit` records in ascending id order, and whether
/// more records follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub start_id: RecordId,
    pub limit: i64,
    pub more: bool,
    pub data: Vec<T>,
}

impl<T: Entity> CursorPage<T> {
    /// The request that fetches the page after this one, if any.
    pub fn next_request(&self) -> Option<CursorRequest> {
        if !self.more {
            return None;
        }
        self.data
            .last()
            .map(|last| CursorRequest::new(last.id(), self.limit))
    }
}

/// Fetch the page described by `request` under `filter`.
///
/// Reads `limit + 1` rows in one query: the extra row only signals that more
/// data exists and is dropped from the page.
pub async fn paginate<T, S, F>(
    store: &S,
    filter: &F,
    request: CursorRequest,
) -> Result<CursorPage<T>, DataError>
where
    T: Entity,
    S: RecordStore<T>,
    F: Filter + ?Sized,
{
    let limit = request.checked_limit()?;
    let mut query = filter.apply(Query::for_entity::<T>());
    if request.start_id > 0 {
        query = query.where_gt(T::id_column(), request.start_id);
    }
    let query = query
        .clear_order()
        .order_by(T::id_column(), Direction::Asc)
        .without_paging()
        .limit(limit + 1);

    let mut data = store.fetch(&query).await?;
    let more = data.len() as u64 > limit;
    if more {
        data.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    tracing::debug!(
        table = T::table_name(),
        start_id = request.start_id,
        limit,
        returned = data.len(),
        more,
        "cursor page fetched"
    );

    Ok(CursorPage {
        start_id: request.start_id,
        limit: request.limit,
        more,
        data,
    })
}
