//! HTML routes. Everything except the auth pages sits behind the session gate.

use crate::handlers::auth::{login, login_page, logout, signup, signup_page};
use crate::handlers::pages::{
    create_country, delete_country, detail, edit_country_page, index, new_country_page,
    update_country,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn web_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/new_country", get(new_country_page).post(create_country))
        .route("/countries/:code", get(detail))
        .route(
            "/countries/:code/edit",
            get(edit_country_page).post(update_country),
        )
        .route("/countries/:code/delete", post(delete_country))
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .with_state(state)
}
