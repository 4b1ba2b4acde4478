//! In-process store with the same observable behaviour as the Postgres adapter, for router tests.

use super::{CountryRepository, UserRepository};
use crate::error::AppError;
use crate::model::{Country, CountryUpdate, NewCountry, NewUser, User};
use crate::service::{LanguageFilter, Page};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Inner {
    countries: Vec<Country>,
    users: Vec<User>,
    next_country_id: i64,
    next_user_id: i64,
}

#[derive(Default)]
pub struct MemoryCatalog {
    inner: Mutex<Inner>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn filtered(&self, keep: impl Fn(&Country) -> bool) -> Result<Vec<Country>, AppError> {
        Ok(self.lock().countries.iter().filter(|c| keep(c)).cloned().collect())
    }
}

#[async_trait]
impl CountryRepository for MemoryCatalog {
    async fn get_by_code(&self, cca2: &str) -> Result<Option<Country>, AppError> {
        Ok(self.lock().countries.iter().find(|c| c.cca2 == cca2).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Country>, AppError> {
        let skip = usize::try_from(page.skip).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        Ok(self.lock().countries.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn create(&self, new: &NewCountry) -> Result<Country, AppError> {
        let mut inner = self.lock();
        if inner.countries.iter().any(|c| c.cca2 == new.cca2) {
            return Err(AppError::Conflict("duplicate value violates countries_cca2_key".into()));
        }
        if new.cca3.is_some() && inner.countries.iter().any(|c| c.cca3 == new.cca3) {
            return Err(AppError::Conflict("duplicate value violates countries_cca3_key".into()));
        }
        inner.next_country_id += 1;
        let country = new.clone().into_country(inner.next_country_id);
        inner.countries.push(country.clone());
        Ok(country)
    }

    async fn update(&self, cca2: &str, patch: &CountryUpdate) -> Result<Option<Country>, AppError> {
        let mut inner = self.lock();
        Ok(inner.countries.iter_mut().find(|c| c.cca2 == cca2).map(|c| {
            c.apply(patch);
            c.clone()
        }))
    }

    async fn delete(&self, cca2: &str) -> Result<bool, AppError> {
        let mut inner = self.lock();
        let before = inner.countries.len();
        inner.countries.retain(|c| c.cca2 != cca2);
        Ok(inner.countries.len() < before)
    }

    async fn by_region(&self, region: &str) -> Result<Vec<Country>, AppError> {
        self.filtered(|c| c.region == region)
    }

    async fn by_language(&self, filter: &LanguageFilter) -> Result<Vec<Country>, AppError> {
        self.filtered(|c| filter.matches(&c.languages))
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Country>, AppError> {
        let needle = fragment.to_ascii_lowercase();
        self.filtered(|c| c.name_common.to_ascii_lowercase().contains(&needle))
    }

    async fn regions(&self) -> Result<Vec<String>, AppError> {
        let set: BTreeSet<String> = self
            .lock()
            .countries
            .iter()
            .filter(|c| !c.region.is_empty())
            .map(|c| c.region.clone())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn language_names(&self) -> Result<Vec<String>, AppError> {
        let set: BTreeSet<String> = self
            .lock()
            .countries
            .iter()
            .flat_map(|c| c.languages.values().cloned())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryCatalog {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.username == new.username) {
            return Err(AppError::Conflict("duplicate value violates users_username_key".into()));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: new.username.clone(),
            email: new.email.clone(),
            hashed_password: new.hashed_password.clone(),
            created_at: chrono::Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn any_user_exists(&self) -> Result<bool, AppError> {
        Ok(!self.lock().users.is_empty())
    }
}
