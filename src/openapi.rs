//! OpenAPI document for the JSON API.

use crate::error::{ErrorBody, ErrorDetail};
use crate::model::{Country, CountryUpdate, NewCountry};
use crate::service::LanguageMatch;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Country catalog API",
        description = "CRUD and filtered lookups over country reference data."
    ),
    paths(
        crate::handlers::countries::list,
        crate::handlers::countries::read,
        crate::handlers::countries::create,
        crate::handlers::countries::update,
        crate::handlers::countries::delete,
        crate::handlers::countries::same_region,
        crate::handlers::countries::by_language,
        crate::handlers::countries::search,
    ),
    components(schemas(Country, NewCountry, CountryUpdate, ErrorBody, ErrorDetail, LanguageMatch)),
    tags((name = "countries", description = "Country records and lookups"))
)]
pub struct ApiDoc;

/// GET /api/v1/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_country_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/v1/countries",
            "/api/v1/countries/{code}",
            "/api/v1/countries/{code}/region",
            "/api/v1/countries/language/{token}",
            "/api/v1/countries/search",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("Country"));
        assert!(schemas.contains_key("ErrorBody"));
    }
}
