//! # strata-http: REST binding for the Strata data layer
//!
//! Exposes one entity collection as axum routes through [`RestService`]:
//! cursor and offset listing, create, read, update and delete. Data-layer
//! errors become JSON `{ "error": message }` responses (`NotFound` → 404,
//! `Validation` → 400, anything else → 500).

pub mod error;
pub mod layers;
pub mod request;
pub mod service;

pub use error::{error_response, HttpError};
pub use layers::{default_trace, init_tracing};
pub use request::{CreateRequest, UpdateRequest};
pub use service::RestService;

pub mod prelude {
    //! Re-exports of the most commonly used HTTP types.
    pub use crate::{default_trace, init_tracing, HttpError, RestService};
}
