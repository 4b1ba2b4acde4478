//! Session-gated HTML pages for browsing and editing countries.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::model::{Country, CountryUpdate, NewCountry};
use crate::service::{CountryValidator, ListFilter, Page};
use crate::state::AppState;
use crate::views::{self, ListView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use maud::Markup;
use serde::Deserialize;

/// Handler error rendered as an HTML page instead of the JSON error body.
/// Carries the signed-in user, if any, so the page keeps their navigation.
pub struct PageError {
    error: AppError,
    user: Option<String>,
}

impl From<AppError> for PageError {
    fn from(error: AppError) -> Self {
        PageError { error, user: None }
    }
}

/// Attach the signed-in user to a failed page result.
pub(crate) trait SignedIn<T> {
    fn signed_in(self, user: &str) -> Result<T, PageError>;
}

impl<T> SignedIn<T> for Result<T, AppError> {
    fn signed_in(self, user: &str) -> Result<T, PageError> {
        self.map_err(|error| PageError {
            error,
            user: Some(user.to_string()),
        })
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self.error, "page failed");
            "Something went wrong. Please try again.".to_string()
        } else {
            self.error.to_string()
        };
        (status, views::error_page(self.user.as_deref(), status, &message)).into_response()
    }
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn country_not_found(code: &str) -> AppError {
    AppError::NotFound(format!("no country with code '{}'", code))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
}

pub async fn index(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Markup, PageError> {
    let regions = state.countries.regions().await.signed_in(&user)?;
    let languages = state.countries.language_names().await.signed_in(&user)?;
    let filter = ListFilter::resolve(
        query.q.as_deref(),
        query.region.as_deref(),
        query.language.as_deref(),
    );
    let countries = match &filter {
        ListFilter::Name(q) => state.countries.search_by_name(q).await,
        ListFilter::Region(r) => state.countries.by_region(r).await,
        ListFilter::Language(l) => state.countries.by_language(l).await,
        ListFilter::All => state.countries.list(Page::default()).await,
    }
    .signed_in(&user)?;
    let view = ListView {
        query: query.q.as_deref(),
        regions: &regions,
        languages: &languages,
        selected_region: query.region.as_deref(),
        selected_language: query.language.as_deref(),
    };
    Ok(views::countries_page(&user, &countries, &view))
}

pub async fn detail(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Markup, PageError> {
    let country = state
        .countries
        .get_by_code(&code)
        .await
        .and_then(|c| c.ok_or_else(|| country_not_found(&code)))
        .signed_in(&user)?;
    let same_region = state
        .countries
        .by_region(&country.region)
        .await
        .signed_in(&user)?;
    Ok(views::country_detail(&user, &country, &same_region))
}

#[derive(Debug, Default, Deserialize)]
pub struct NewCountryForm {
    pub name_common: String,
    pub name_official: String,
    pub cca2: String,
    pub capital: Option<String>,
}

impl NewCountryForm {
    /// Form fields plus the fixed defaults: population 0 and a flagcdn image URL.
    fn to_new_country(&self) -> NewCountry {
        let cca2 = self.cca2.trim();
        let mut new = NewCountry::new(
            self.name_common.trim(),
            self.name_official.trim(),
            cca2,
            0,
        );
        new.capital = blank_to_none(self.capital.clone());
        new.flag_url = Some(format!("https://flagcdn.com/{}.svg", cca2.to_lowercase()));
        new
    }
}

pub async fn new_country_page(CurrentUser(user): CurrentUser) -> Markup {
    views::new_country_form(&user, &NewCountryForm::default(), None)
}

pub async fn create_country(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Form(form): Form<NewCountryForm>,
) -> Result<Response, PageError> {
    let new = form.to_new_country();
    let created = match CountryValidator::validate_new(&new) {
        Ok(()) => state.countries.create(&new).await,
        Err(e) => Err(e),
    };
    match created {
        Ok(country) => {
            tracing::info!(cca2 = %country.cca2, user = %user, "country created from form");
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AppError::Validation(_) | AppError::Conflict(_))) => {
            let page = views::new_country_form(&user, &form, Some(&e.to_string()));
            Ok((e.status(), page).into_response())
        }
        Err(e) => Err::<Response, _>(e).signed_in(&user),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EditCountryForm {
    pub name_common: String,
    pub name_official: String,
    pub capital: Option<String>,
    /// Raw field text; blank means 0.
    pub population: Option<String>,
}

impl From<&Country> for EditCountryForm {
    fn from(c: &Country) -> Self {
        Self {
            name_common: c.name_common.clone(),
            name_official: c.name_official.clone(),
            capital: c.capital.clone(),
            population: Some(c.population.to_string()),
        }
    }
}

impl EditCountryForm {
    fn to_update(&self) -> Result<CountryUpdate, AppError> {
        let population = match blank_to_none(self.population.clone()) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::Validation("population must be a whole number".into()))?,
            None => 0,
        };
        Ok(CountryUpdate {
            name_common: Some(self.name_common.trim().to_string()),
            name_official: Some(self.name_official.trim().to_string()),
            capital: Some(blank_to_none(self.capital.clone())),
            population: Some(population),
            ..CountryUpdate::default()
        })
    }
}

pub async fn edit_country_page(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Markup, PageError> {
    let country = state
        .countries
        .get_by_code(&code)
        .await
        .and_then(|c| c.ok_or_else(|| country_not_found(&code)))
        .signed_in(&user)?;
    Ok(views::edit_country_form(
        &user,
        &country.cca2,
        &EditCountryForm::from(&country),
        None,
    ))
}

pub async fn update_country(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Form(form): Form<EditCountryForm>,
) -> Result<Response, PageError> {
    let patch = form
        .to_update()
        .and_then(|p| CountryValidator::validate_update(&p).map(|()| p));
    let patch = match patch {
        Ok(p) => p,
        Err(e) => {
            let page = views::edit_country_form(&user, &code, &form, Some(&e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };
    state
        .countries
        .update(&code, &patch)
        .await
        .and_then(|c| c.ok_or_else(|| country_not_found(&code)))
        .signed_in(&user)?;
    Ok(Redirect::to(&format!("/countries/{}", code)).into_response())
}

pub async fn delete_country(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Redirect, PageError> {
    let removed = state.countries.delete(&code).await.signed_in(&user)?;
    tracing::info!(cca2 = %code, user = %user, removed, "country delete from form");
    Ok(Redirect::to("/"))
}
