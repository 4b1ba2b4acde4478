//! Request-independent rules: filters, payload validation, password hashing.

pub mod filter;
mod password;
mod validation;
pub use filter::{contains_pattern, LanguageFilter, LanguageMatch, ListFilter, Page};
pub use password::{hash_password, verify_password};
pub use validation::CountryValidator;
