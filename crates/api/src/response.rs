//! Shared response envelope types for API handlers.
//!
//! Single resources use a `{ "data": ... }` envelope. Index endpoints return
//! [`erasmus_core::listing::Page`], which already serializes as
//! `{ "data": [...], "meta": {...} }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: call }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
