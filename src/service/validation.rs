//! Field rules for country payloads, checked after deserialization.

use crate::error::AppError;
use crate::model::{CountryUpdate, NewCountry};
use regex::Regex;

const NAME_COMMON_MAX: usize = 100;
const NAME_OFFICIAL_MAX: usize = 200;
const SHORT_TEXT_MAX: usize = 100;

const CCA2_PATTERN: &str = r"^[A-Za-z]{2}$";
const CCA3_PATTERN: &str = r"^[A-Za-z]{3}$";

fn code(col: &str, value: &str, pattern: &str, letters: usize) -> Result<(), AppError> {
    let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
    if !re.is_match(value) {
        return Err(AppError::Validation(format!(
            "{} must be exactly {} letters",
            col, letters
        )));
    }
    Ok(())
}

pub struct CountryValidator;

impl CountryValidator {
    /// Validate a create payload. All rules apply.
    pub fn validate_new(body: &NewCountry) -> Result<(), AppError> {
        required_text("name_common", &body.name_common, NAME_COMMON_MAX)?;
        required_text("name_official", &body.name_official, NAME_OFFICIAL_MAX)?;
        code("cca2", &body.cca2, CCA2_PATTERN, 2)?;
        if let Some(cca3) = &body.cca3 {
            code("cca3", cca3, CCA3_PATTERN, 3)?;
        }
        max_len("region", &body.region, SHORT_TEXT_MAX)?;
        optional_text("subregion", body.subregion.as_deref())?;
        optional_text("capital", body.capital.as_deref())?;
        non_negative_population(body.population)?;
        non_negative_area(body.area)?;
        Ok(())
    }

    /// Validate only the fields present in a partial update.
    pub fn validate_update(patch: &CountryUpdate) -> Result<(), AppError> {
        if let Some(name) = &patch.name_common {
            required_text("name_common", name, NAME_COMMON_MAX)?;
        }
        if let Some(name) = &patch.name_official {
            required_text("name_official", name, NAME_OFFICIAL_MAX)?;
        }
        if let Some(region) = &patch.region {
            max_len("region", region, SHORT_TEXT_MAX)?;
        }
        if let Some(subregion) = &patch.subregion {
            optional_text("subregion", subregion.as_deref())?;
        }
        if let Some(capital) = &patch.capital {
            optional_text("capital", capital.as_deref())?;
        }
        if let Some(population) = patch.population {
            non_negative_population(population)?;
        }
        if let Some(area) = patch.area {
            non_negative_area(area)?;
        }
        Ok(())
    }
}

fn required_text(col: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", col)));
    }
    max_len(col, value, max)
}

fn optional_text(col: &str, value: Option<&str>) -> Result<(), AppError> {
    match value {
        Some(v) => max_len(col, v, SHORT_TEXT_MAX),
        None => Ok(()),
    }
}

fn max_len(col: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            col, max
        )));
    }
    Ok(())
}

fn non_negative_population(population: i64) -> Result<(), AppError> {
    if population < 0 {
        return Err(AppError::Validation("population must be at least 0".into()));
    }
    Ok(())
}

fn non_negative_area(area: Option<f64>) -> Result<(), AppError> {
    match area {
        Some(a) if !a.is_finite() || a < 0.0 => {
            Err(AppError::Validation("area must be a non-negative number".into()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewCountry {
        NewCountry::new("Testland", "Republic of Testland", "TL", 1000)
    }

    #[test]
    fn accepts_minimal_payload() {
        assert!(CountryValidator::validate_new(&valid()).is_ok());
    }

    #[test]
    fn rejects_bad_codes() {
        let mut body = valid();
        body.cca2 = "TLX".into();
        assert!(matches!(
            CountryValidator::validate_new(&body),
            Err(AppError::Validation(_))
        ));
        let mut body = valid();
        body.cca3 = Some("T1D".into());
        assert!(CountryValidator::validate_new(&body).is_err());
    }

    #[test]
    fn rejects_blank_name_and_negative_population() {
        let mut body = valid();
        body.name_common = "   ".into();
        assert!(CountryValidator::validate_new(&body).is_err());
        let mut body = valid();
        body.population = -1;
        assert!(CountryValidator::validate_new(&body).is_err());
    }

    #[test]
    fn update_checks_only_present_fields() {
        assert!(CountryValidator::validate_update(&CountryUpdate::default()).is_ok());
        let patch = CountryUpdate {
            area: Some(Some(-3.0)),
            ..CountryUpdate::default()
        };
        assert!(CountryValidator::validate_update(&patch).is_err());
        let patch = CountryUpdate {
            capital: Some(None),
            population: Some(0),
            ..CountryUpdate::default()
        };
        assert!(CountryValidator::validate_update(&patch).is_ok());
    }
}
