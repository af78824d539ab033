use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json`, with rejections reported as [`ApiError`] JSON bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
