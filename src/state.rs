//! Shared application state for all routes.

use crate::store::{CountryRepository, UserRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub countries: Arc<dyn CountryRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// State backed by one store serving both repositories.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CountryRepository + UserRepository + 'static,
    {
        Self {
            countries: store.clone(),
            users: store,
        }
    }
}
