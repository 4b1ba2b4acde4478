//! Country catalog: JSON API, session-gated HTML pages and an import program
//! over a PostgreSQL country table.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod import;
pub mod model;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod views;

pub use config::ServiceConfig;
pub use error::{AppError, ConfigError, ImportError};
pub use routes::app;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, CountryRepository, PgStore, UserRepository};
