//! JSON API routes, nested under `/api/v1`.

use crate::handlers::countries::{
    by_language, create, delete as delete_handler, list, read, same_region, search, update,
};
use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/countries", get(list).post(create))
        .route("/countries/search", get(search))
        .route("/countries/language/:token", get(by_language))
        .route(
            "/countries/:code",
            get(read).put(update).delete(delete_handler),
        )
        .route("/countries/:code/region", get(same_region))
        .with_state(state)
}
