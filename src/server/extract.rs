use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// Form body whose rejections are answered like every other API error.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct ApiForm<T>(pub T);

/// Query string whose rejections are answered like every other API error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
