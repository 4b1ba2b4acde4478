//! Route tables and the assembled application router.

pub mod api;
pub mod common;
pub mod web;

pub use api::api_routes;
pub use common::common_routes;
pub use web::web_routes;

use crate::config::ServiceConfig;
use crate::error::ConfigError;
use crate::state::AppState;
use axum::http::{header, HeaderValue};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Full application: common routes, the JSON API under `/api/v1`, and the HTML pages,
/// wrapped in the session layer, a body limit, and no-cache response headers.
pub fn app(state: AppState, config: &ServiceConfig) -> Result<Router, ConfigError> {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            config.session_ttl_minutes,
        )))
        .with_signed(config.session_key()?);

    Ok(Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", api_routes(state.clone()))
        .merge(web_routes(state))
        .layer(sessions)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(TraceLayer::new_for_http()))
}
