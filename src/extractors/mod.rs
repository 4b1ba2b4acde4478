//! Request extractors.

pub mod current_user;
pub mod payload;
pub use current_user::{log_in, log_out, CurrentUser, LOGIN_PATH, SESSION_USER_KEY};
pub use payload::{ApiJson, ApiQuery};
