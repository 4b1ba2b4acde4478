//! Country record shapes: the stored/read view, the create payload, and the partial update.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A stored country as returned by every read endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Country {
    pub id: i64,
    pub name_common: String,
    pub name_official: String,
    /// ISO 3166-1 alpha-2 code; the external identifier.
    pub cca2: String,
    pub cca3: Option<String>,
    pub independent: Option<bool>,
    pub un_member: bool,
    pub region: String,
    pub subregion: Option<String>,
    pub area: Option<f64>,
    pub population: i64,
    pub flag_url: Option<String>,
    pub capital: Option<String>,
    #[sqlx(json)]
    pub timezones: Vec<String>,
    /// Language code to language name, e.g. `{"fra": "French"}`.
    #[sqlx(json)]
    pub languages: BTreeMap<String, String>,
}

pub fn default_timezones() -> Vec<String> {
    vec!["UTC".to_string()]
}

pub fn default_languages() -> BTreeMap<String, String> {
    BTreeMap::from([("eng".to_string(), "English".to_string())])
}

/// Create payload. Unset optional fields take the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewCountry {
    pub name_common: String,
    pub name_official: String,
    pub cca2: String,
    #[serde(default)]
    pub cca3: Option<String>,
    #[serde(default)]
    pub independent: Option<bool>,
    #[serde(default)]
    pub un_member: bool,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub area: Option<f64>,
    pub population: i64,
    #[serde(default)]
    pub flag_url: Option<String>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default = "default_timezones")]
    pub timezones: Vec<String>,
    #[serde(default = "default_languages")]
    pub languages: BTreeMap<String, String>,
}

impl NewCountry {
    /// Minimal record with every optional field at its default.
    pub fn new(
        name_common: impl Into<String>,
        name_official: impl Into<String>,
        cca2: impl Into<String>,
        population: i64,
    ) -> Self {
        Self {
            name_common: name_common.into(),
            name_official: name_official.into(),
            cca2: cca2.into(),
            cca3: None,
            independent: None,
            un_member: false,
            region: String::new(),
            subregion: None,
            area: None,
            population,
            flag_url: None,
            capital: None,
            timezones: default_timezones(),
            languages: default_languages(),
        }
    }

    pub fn into_country(self, id: i64) -> Country {
        Country {
            id,
            name_common: self.name_common,
            name_official: self.name_official,
            cca2: self.cca2,
            cca3: self.cca3,
            independent: self.independent,
            un_member: self.un_member,
            region: self.region,
            subregion: self.subregion,
            area: self.area,
            population: self.population,
            flag_url: self.flag_url,
            capital: self.capital,
            timezones: self.timezones,
            languages: self.languages,
        }
    }
}

/// Partial update. Absent keys leave the stored value alone. For nullable
/// columns the outer `Option` tracks presence and the inner one carries an
/// explicit `null`. Codes are not updatable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CountryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_common: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_official: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<bool>, nullable)]
    pub independent: Option<Option<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub un_member: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub subregion: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>, nullable)]
    pub area: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub flag_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub capital: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezones: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<BTreeMap<String, String>>,
}

/// A key that is present deserializes to `Some`, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CountryUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Country {
    /// Merge the fields present in `patch` into this record.
    pub fn apply(&mut self, patch: &CountryUpdate) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        set(&mut self.name_common, &patch.name_common);
        set(&mut self.name_official, &patch.name_official);
        set(&mut self.independent, &patch.independent);
        set(&mut self.un_member, &patch.un_member);
        set(&mut self.region, &patch.region);
        set(&mut self.subregion, &patch.subregion);
        set(&mut self.area, &patch.area);
        set(&mut self.population, &patch.population);
        set(&mut self.flag_url, &patch.flag_url);
        set(&mut self.capital, &patch.capital);
        set(&mut self.timezones, &patch.timezones);
        set(&mut self.languages, &patch.languages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn testland() -> Country {
        let mut new = NewCountry::new("Testland", "Republic of Testland", "TL", 1000);
        new.cca3 = Some("TLD".into());
        new.region = "Europe".into();
        new.capital = Some("Testville".into());
        new.into_country(1)
    }

    #[test]
    fn create_payload_applies_defaults() {
        let new: NewCountry = serde_json::from_value(json!({
            "name_common": "Testland",
            "name_official": "Republic of Testland",
            "cca2": "TL",
            "cca3": "TLD",
            "population": 1000
        }))
        .unwrap();
        assert_eq!(new.timezones, vec!["UTC".to_string()]);
        assert_eq!(new.languages.get("eng").map(String::as_str), Some("English"));
        assert!(!new.un_member);
        assert_eq!(new.region, "");
        assert_eq!(new.capital, None);
    }

    #[test]
    fn create_payload_requires_population() {
        let res = serde_json::from_value::<NewCountry>(json!({
            "name_common": "Testland",
            "name_official": "Republic of Testland",
            "cca2": "TL"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn population_only_patch_leaves_the_rest() {
        let mut country = testland();
        let before = country.clone();
        let patch: CountryUpdate = serde_json::from_value(json!({ "population": 5 })).unwrap();
        country.apply(&patch);
        assert_eq!(country.population, 5);
        assert_eq!(country.name_common, before.name_common);
        assert_eq!(country.name_official, before.name_official);
        assert_eq!(country.cca2, before.cca2);
        assert_eq!(country.cca3, before.cca3);
        assert_eq!(country.region, before.region);
        assert_eq!(country.capital, before.capital);
    }

    #[test]
    fn explicit_null_clears_nullable_fields() {
        let mut country = testland();
        let patch: CountryUpdate = serde_json::from_value(json!({ "capital": null })).unwrap();
        assert_eq!(patch.capital, Some(None));
        country.apply(&patch);
        assert_eq!(country.capital, None);
    }

    #[test]
    fn absent_key_differs_from_null() {
        let patch: CountryUpdate = serde_json::from_value(json!({})).unwrap();
        assert_eq!(patch.capital, None);
        assert!(patch.is_empty());
    }

    #[test]
    fn codes_in_update_body_are_ignored() {
        let mut country = testland();
        let patch: CountryUpdate =
            serde_json::from_value(json!({ "cca2": "XX", "name_common": "Newland" })).unwrap();
        country.apply(&patch);
        assert_eq!(country.cca2, "TL");
        assert_eq!(country.name_common, "Newland");
    }
}
