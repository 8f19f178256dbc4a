//! Offset pagination keyed on a 1-based page number.

use crate::entity::Entity;
use crate::error::DataError;
use crate::filter::Filter;
use crate::query::Query;
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};

/// A page number and page size. `page_size = 0` asks for every matching
/// record, unpaged; otherwise `page = 0` is treated as page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OffsetRequest {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub page_size: u64,
}

impl OffsetRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// Every matching record in one response.
    pub fn unpaged() -> Self {
        Self::default()
    }

    pub fn is_paged(&self) -> bool {
        self.page_size > 0
    }

    /// Rows to skip before this page, saturating for absurd page numbers.
    pub fn offset(&self) -> u64 {
        self.page.max(1).saturating_sub(1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetPage<T> {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_page: u64,
    pub data: Vec<T>,
}

/// `ceil(total / page_size)`, or 0 when either is 0.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 || total == 0 {
        return 0;
    }
    (total - 1) / page_size + 1
}

/// Fetch the page described by `request` under `filter`, plus the total
/// count of matching records.
///
/// The slice and the count are two separate queries; either failing fails
/// the whole call.
pub async fn paginate<T, S, F>(
    store: &S,
    filter: &F,
    request: OffsetRequest,
) -> Result<OffsetPage<T>, DataError>
where
    T: Entity,
    S: RecordStore<T>,
    F: Filter + ?Sized,
{
    let base = filter
        .apply(Query::for_entity::<T>())
        .without_paging()
        .ordered_by_id_if_unordered();

    if !request.is_paged() {
        let data = store.fetch(&base).await?;
        let total = store.count(&base).await?;
        tracing::debug!(table = T::table_name(), total, "unpaged listing fetched");
        return Ok(OffsetPage {
            page: request.page,
            page_size: 0,
            total,
            total_page: 0,
            data,
        });
    }

    let page = request.page.max(1);
    let slice = base
        .clone()
        .limit(request.page_size)
        .offset(request.offset());
    let data = store.fetch(&slice).await?;
    let total = store.count(&base).await?;
    let total_page = total_pages(total, request.page_size);
    tracing::debug!(
        table = T::table_name(),
        page,
        page_size = request.page_size,
        total,
        total_page,
        returned = data.len(),
        "offset page fetched"
    );

    Ok(OffsetPage {
        page,
        page_size: request.page_size,
        total,
        total_page,
        data,
    })
}
