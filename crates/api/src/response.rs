//! `{ "data": ... }` envelope shared by the timeline, activity, geocode and
//! integration handlers. Errors use the `{ "error", "code" }` shape from
//! [`crate::error`] instead.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
