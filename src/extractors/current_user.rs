//! Session gate: the logged-in username, or a redirect to the login page.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Session key holding the username.
pub const SESSION_USER_KEY: &str = "user";

pub const LOGIN_PATH: &str = "/login";

/// Username of the logged-in operator.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let user: Option<String> = session
            .get(SESSION_USER_KEY)
            .await
            .map_err(|e| AppError::from(e).into_response())?;
        match user {
            Some(name) if !name.is_empty() => Ok(CurrentUser(name)),
            _ => Err(Redirect::to(LOGIN_PATH).into_response()),
        }
    }
}

/// Bind `username` to the session under a fresh id.
pub async fn log_in(session: &Session, username: &str) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, username).await?;
    Ok(())
}

/// Drop all session data and the cookie.
pub async fn log_out(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
