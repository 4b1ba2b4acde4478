//! Signup, login and logout for the HTML interface.

use crate::error::AppError;
use crate::extractors::{log_in, log_out, LOGIN_PATH};
use crate::handlers::pages::PageError;
use crate::model::NewUser;
use crate::service::{hash_password, verify_password};
use crate::state::AppState;
use crate::views;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use maud::Markup;
use serde::Deserialize;
use tower_sessions::Session;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USER_EXISTS: &str = "User already exists";

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn signup_page() -> Markup {
    views::signup_page(None)
}

pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Ok(views::signup_page(Some("Username and password are required")).into_response());
    }
    if state.users.find_by_username(username).await?.is_some() {
        return Ok(views::signup_page(Some(USER_EXISTS)).into_response());
    }
    let new = NewUser {
        username: username.to_string(),
        email: form.email.trim().to_string(),
        hashed_password: hash_password(&form.password)?,
    };
    match state.users.create_user(&new).await {
        Ok(user) => tracing::info!(username = %user.username, "user signed up"),
        // lost a race with a concurrent signup for the same name
        Err(AppError::Conflict(_)) => {
            return Ok(views::signup_page(Some(USER_EXISTS)).into_response());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to(LOGIN_PATH).into_response())
}

pub async fn login_page() -> Markup {
    views::login_page(None)
}

/// Unknown user and wrong password produce the same response.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let user = state.users.find_by_username(form.username.trim()).await?;
    let user = match user {
        Some(u) if verify_password(&form.password, &u.hashed_password) => u,
        _ => {
            tracing::warn!(username = %form.username, "rejected login");
            return Ok(views::login_page(Some(INVALID_CREDENTIALS)).into_response());
        }
    };
    log_in(&session, &user.username).await?;
    tracing::info!(username = %user.username, "logged in");
    Ok(Redirect::to("/").into_response())
}

pub async fn logout(session: Session) -> Result<Redirect, PageError> {
    log_out(&session).await?;
    Ok(Redirect::to(LOGIN_PATH))
}
