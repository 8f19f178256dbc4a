use crate::error::HttpError;
use crate::request::{CreateRequest, UpdateRequest};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use strata_data::{
    CursorPage, CursorRequest, Entity, Mapper, OffsetPage, OffsetRequest, PaginationConfig,
    RecordId, RecordStore, Unfiltered,
};

const SUCCESS: &str = "success";

/// CRUD and paginated listing of one entity collection over HTTP.
///
/// Routes registered by [`RestService::router`] for a `source` name:
///
/// | Method | Path | Body / params | Response |
/// |--------|------|---------------|----------|
/// | `GET` | `/{source}` | `start_id`, `limit` | cursor page |
/// | `GET` | `/{source}/pages` | `page`, `page_size` | offset page |
/// | `POST` | `/{source}` | `{"data": record}` | `"success"` |
/// | `GET` | `/{source}/{id}` | | record |
/// | `PUT` | `/{source}/{id}` | `{"data": changes}` | `"success"` |
/// | `DELETE` | `/{source}/{id}` | | `"success"` |
///
/// Listing limits are normalized with the [`PaginationConfig`] first.
///
/// # Example
///
/// ```ignore
/// let todos = RestService::<Todo, _>::new(store, config.pagination.clone());
/// let app = Router::new().merge(todos.router("todos")).layer(default_trace());
/// ```
pub struct RestService<T, S> {
    mapper: Mapper<T, S>,
    pagination: PaginationConfig,
}

impl<T, S: Clone> Clone for RestService<T, S> {
    fn clone(&self) -> Self {
        Self {
            mapper: self.mapper.clone(),
            pagination: self.pagination.clone(),
        }
    }
}

impl<T, S> RestService<T, S>
where
    T: Entity + DeserializeOwned,
    S: RecordStore<T> + Clone + 'static,
{
    pub fn new(store: S, pagination: PaginationConfig) -> Self {
        Self {
            mapper: Mapper::new(store),
            pagination,
        }
    }

    pub fn mapper(&self) -> &Mapper<T, S> {
        &self.mapper
    }

    /// Build the routes for this collection under `/{source}`.
    pub fn router(self, source: &str) -> Router {
        let collection = format!("/{source}");
        let pages = format!("/{source}/pages");
        let item = format!("/{source}/{{id}}");
        Router::new()
            .route(&collection, get(list::<T, S>).post(create::<T, S>))
            .route(&pages, get(list_pages::<T, S>))
            .route(
                &item,
                get(fetch::<T, S>).put(update::<T, S>).delete(remove::<T, S>),
            )
            .with_state(self)
    }
}

async fn list<T, S>(
    State(svc): State<RestService<T, S>>,
    params: Result<Query<CursorRequest>, QueryRejection>,
) -> Result<Json<CursorPage<T>>, HttpError>
where
    T: Entity + DeserializeOwned,
    S: RecordStore<T> + Clone + 'static,
{
    let Query(request) = params.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let request = svc.pagination.normalize_cursor(request);
    let page = svc.mapper.paginate_cursor(&Unfiltered, request).await?;
    Ok(Json(page))
}

async fn list_pages<T, S>(
    State(svc): State<RestService<T, S>>,
    params: Result<Query<OffsetRequest>, QueryRejection>,
) -> Result<Json<OffsetPage<T>>, HttpError>
where
    T: Entity + DeserializeOwned,
    S: RecordStore<T> + Clone + 'static,
{
    let Query(request) = params.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let request = svc.pagination.normalize_offset(request);
    let page = svc.mapper.paginate_offset(&Unfiltered, request).await?;
    Ok(Json(page))
}

async fn create<T, S>(
    State(svc): State<RestService<T, S>>,
    body: Result<Json<CreateRequest<T>>, JsonRejection>,
) -> Result<Json<&'static str>, HttpError>
where
    T: Entity + DeserializeOwned,
    S: RecordStore<T> + Clone + 'static,
{
    let Json(request) = body.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let mut record = request.into_record();
    svc.mapper.create(&mut record).await?;
    tracing::info!(table = T::table_name(), id = record.id(), "record created");
    Ok(Json(SUCCESS))
}

async fn fetch<T, S>(
    State(svc): State<RestService<T, S>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<T>, HttpError>
where
    T: Entity + DeserializeOwned,
    S: RecordStore<T> + Clone + 'static,
{
    let Path(id) = id.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    Ok(Json(svc.mapper.one_by_id(id).await?))
}

async fn update<T, S>(
    State(svc): State<RestService<T, S>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<&'static str>, HttpError>
where
    T: Entity + DeserializeOwned,
    S: RecordStore<T> + Clone + 'static,
{
    let Path(id) = id.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let Json(request) = body.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    svc.mapper
        .update_by_id(id, request.into_changes::<T>())
        .await?;
    Ok(Json(SUCCESS))
}

async fn remove<T, S>(
    State(svc): State<RestService<T, S>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<&'static str>, HttpError>
where
    T: Entity + DeserializeOwned,
    S: RecordStore<T> + Clone + 'static,
{
    let Path(id) = id.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    svc.mapper.delete_by_id(id).await?;
    Ok(Json(SUCCESS))
}
