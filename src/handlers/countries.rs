//! JSON handlers for country CRUD and lookups.

use crate::error::{AppError, ErrorBody};
use crate::extractors::{ApiJson, ApiQuery};
use crate::model::{Country, CountryUpdate, NewCountry};
use crate::service::{CountryValidator, LanguageFilter, LanguageMatch, Page};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Rows to skip (default 0).
    pub skip: Option<i64>,
    /// Maximum rows (default 100, capped at 1000).
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Fragment of the common name; ASCII case is ignored.
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LanguageParams {
    /// Force code or name matching instead of the length heuristic.
    pub by: Option<LanguageMatch>,
}

fn country_not_found(code: &str) -> AppError {
    AppError::NotFound(format!("no country with code '{}'", code))
}

#[utoipa::path(
    get,
    path = "/api/v1/countries",
    params(ListParams),
    responses((status = 200, description = "Page of countries in insertion order", body = [Country])),
    tag = "countries"
)]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Country>>, AppError> {
    let page = Page::new(params.skip, params.limit);
    let rows = state.countries.list(page).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/countries/{code}",
    params(("code" = String, Path, description = "2-letter country code")),
    responses(
        (status = 200, description = "The country", body = Country),
        (status = 404, description = "Unknown code", body = ErrorBody)
    ),
    tag = "countries"
)]
pub async fn read(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Country>, AppError> {
    let country = state
        .countries
        .get_by_code(&code)
        .await?
        .ok_or_else(|| country_not_found(&code))?;
    Ok(Json(country))
}

#[utoipa::path(
    post,
    path = "/api/v1/countries",
    request_body = NewCountry,
    responses(
        (status = 201, description = "Created", body = Country),
        (status = 409, description = "Code already exists", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    ),
    tag = "countries"
)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewCountry>,
) -> Result<(StatusCode, Json<Country>), AppError> {
    CountryValidator::validate_new(&body)?;
    let country = state.countries.create(&body).await?;
    tracing::info!(cca2 = %country.cca2, id = country.id, "country created");
    Ok((StatusCode::CREATED, Json(country)))
}

#[utoipa::path(
    put,
    path = "/api/v1/countries/{code}",
    params(("code" = String, Path, description = "2-letter country code")),
    request_body = CountryUpdate,
    responses(
        (status = 200, description = "Updated", body = Country),
        (status = 404, description = "Unknown code", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    ),
    tag = "countries"
)]
pub async fn update(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(patch): ApiJson<CountryUpdate>,
) -> Result<Json<Country>, AppError> {
    CountryValidator::validate_update(&patch)?;
    // nothing to write
    let updated = if patch.is_empty() {
        state.countries.get_by_code(&code).await?
    } else {
        state.countries.update(&code, &patch).await?
    };
    let country = updated.ok_or_else(|| country_not_found(&code))?;
    Ok(Json(country))
}

#[utoipa::path(
    delete,
    path = "/api/v1/countries/{code}",
    params(("code" = String, Path, description = "2-letter country code")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown code", body = ErrorBody)
    ),
    tag = "countries"
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.countries.delete(&code).await? {
        return Err(country_not_found(&code));
    }
    tracing::info!(cca2 = %code, "country deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/countries/{code}/region",
    params(("code" = String, Path, description = "2-letter country code")),
    responses(
        (status = 200, description = "Countries sharing the target's region, target included", body = [Country]),
        (status = 404, description = "Unknown code", body = ErrorBody)
    ),
    tag = "countries"
)]
pub async fn same_region(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<Country>>, AppError> {
    let country = state
        .countries
        .get_by_code(&code)
        .await?
        .ok_or_else(|| country_not_found(&code))?;
    let rows = state.countries.by_region(&country.region).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/countries/language/{token}",
    params(
        ("token" = String, Path, description = "Language code (3 chars or fewer) or language name"),
        LanguageParams
    ),
    responses(
        (status = 200, description = "Countries speaking the language", body = [Country]),
        (status = 404, description = "No match", body = ErrorBody)
    ),
    tag = "countries"
)]
pub async fn by_language(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ApiQuery(params): ApiQuery<LanguageParams>,
) -> Result<Json<Vec<Country>>, AppError> {
    let filter = LanguageFilter::with_mode(&token, params.by);
    let rows = state.countries.by_language(&filter).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(format!(
            "no countries found for language '{}'",
            filter.token()
        )));
    }
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/countries/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Countries whose common name contains the fragment", body = [Country]),
        (status = 404, description = "No match", body = ErrorBody)
    ),
    tag = "countries"
)]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<Country>>, AppError> {
    let rows = state.countries.search_by_name(&params.name).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(format!(
            "no countries found matching '{}'",
            params.name
        )));
    }
    Ok(Json(rows))
}
