//! Body and query-string extractors whose rejections render as the API error body.

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// `axum::Json` with malformed bodies reported as `AppError::Validation`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with bad parameters reported as `AppError::Validation`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
