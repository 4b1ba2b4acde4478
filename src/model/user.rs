//! Operator accounts for the browsing interface.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string; never rendered.
    #[serde(skip)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// Insert shape. The password is already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}
