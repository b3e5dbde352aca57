use axum::extract::{FromRequest, FromRequestParts};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// `Json` that rejects with our JSON error body instead of axum's plain text
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` with the same treatment
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `{ "name": ... }` body shared by folders and tags. Anything but a string counts as missing.
#[derive(Debug, Default, Deserialize)]
pub struct NameBody {
    #[serde(default)]
    pub name: Value,
}

impl NameBody {
    pub fn name(&self) -> Option<&str> {
        self.name.as_str()
    }
}

/// Parse a path id, 400 when it is not a UUID
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("The `id` is not valid"))
}

/// Parse an optional query-string id; empty means absent
pub fn parse_filter_id(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("The `{}` is not valid", field))),
    }
}
