//! Persistence ports and their adapters.

use crate::error::AppError;
use crate::model::{Country, CountryUpdate, NewCountry, NewUser, User};
use crate::service::{LanguageFilter, Page};
use async_trait::async_trait;

mod postgres;
pub use postgres::{ensure_database_exists, ensure_tables, PgStore};

#[cfg(any(test, feature = "test-support"))]
mod memory;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryCatalog;

/// Country data access. Lists come back in insertion (`id`) order.
#[async_trait]
pub trait CountryRepository: Send + Sync {
    async fn get_by_code(&self, cca2: &str) -> Result<Option<Country>, AppError>;

    async fn list(&self, page: Page) -> Result<Vec<Country>, AppError>;

    /// Duplicate codes fail with `AppError::Conflict`.
    async fn create(&self, new: &NewCountry) -> Result<Country, AppError>;

    /// `None` when no country has this code.
    async fn update(&self, cca2: &str, patch: &CountryUpdate) -> Result<Option<Country>, AppError>;

    /// Whether a row was removed.
    async fn delete(&self, cca2: &str) -> Result<bool, AppError>;

    async fn by_region(&self, region: &str) -> Result<Vec<Country>, AppError>;

    async fn by_language(&self, filter: &LanguageFilter) -> Result<Vec<Country>, AppError>;

    /// Substring match on `name_common`, folding ASCII case only.
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Country>, AppError>;

    /// Distinct non-empty regions, sorted.
    async fn regions(&self) -> Result<Vec<String>, AppError>;

    /// Distinct language names across all countries, sorted.
    async fn language_names(&self) -> Result<Vec<String>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Duplicate usernames fail with `AppError::Conflict`.
    async fn create_user(&self, new: &NewUser) -> Result<User, AppError>;

    async fn any_user_exists(&self) -> Result<bool, AppError>;
}
