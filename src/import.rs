//! Offline seeding: pull country records from the public REST Countries API
//! and create the demo operator account.

use crate::error::ImportError;
use crate::model::{NewCountry, NewUser};
use crate::service::hash_password;
use crate::store::UserRepository;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_SOURCE_URL: &str = "https://restcountries.com/v3.1/all";

#[derive(Debug, Default, Deserialize)]
struct RestName {
    #[serde(default)]
    common: String,
    #[serde(default)]
    official: String,
}

#[derive(Debug, Default, Deserialize)]
struct RestFlags {
    png: Option<String>,
}

/// One record as served by the source API. Only the fields we store are read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestCountry {
    #[serde(default)]
    name: RestName,
    #[serde(default)]
    cca2: String,
    cca3: Option<String>,
    independent: Option<bool>,
    #[serde(default)]
    un_member: bool,
    #[serde(default)]
    region: String,
    subregion: Option<String>,
    area: Option<f64>,
    #[serde(default)]
    population: i64,
    #[serde(default)]
    flags: RestFlags,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    timezones: Vec<String>,
    #[serde(default)]
    languages: BTreeMap<String, String>,
}

impl From<RestCountry> for NewCountry {
    fn from(r: RestCountry) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());
        NewCountry {
            name_common: r.name.common,
            name_official: r.name.official,
            cca2: r.cca2,
            cca3: non_empty(r.cca3),
            independent: r.independent,
            un_member: r.un_member,
            region: r.region,
            subregion: non_empty(r.subregion),
            area: r.area,
            population: r.population,
            flag_url: non_empty(r.flags.png),
            capital: r.capital.into_iter().next(),
            timezones: r.timezones,
            languages: r.languages,
        }
    }
}

/// Map source records, dropping those without a 2-letter code.
pub fn to_new_countries(records: Vec<RestCountry>) -> Vec<NewCountry> {
    let total = records.len();
    let rows: Vec<NewCountry> = records
        .into_iter()
        .filter(|r| !r.cca2.trim().is_empty())
        .map(NewCountry::from)
        .collect();
    if rows.len() < total {
        tracing::warn!(skipped = total - rows.len(), "records without cca2 skipped");
    }
    rows
}

pub async fn fetch_countries(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<NewCountry>, ImportError> {
    let fetch_err = |source| ImportError::Fetch {
        url: url.to_string(),
        source,
    };
    tracing::info!(url = %url, "fetching countries");
    let resp = client.get(url).send().await.map_err(fetch_err)?;
    if !resp.status().is_success() {
        return Err(ImportError::Status(resp.status()));
    }
    let records: Vec<RestCountry> = resp.json().await.map_err(fetch_err)?;
    Ok(to_new_countries(records))
}

/// Credentials for the first operator account.
#[derive(Clone, Debug)]
pub struct DemoUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Bootstrap {
    Created(String),
    UsersExist,
    NoCredentials,
}

/// Create the demo user only when the users table is empty.
pub async fn bootstrap_demo_user(
    users: &dyn UserRepository,
    demo: Option<DemoUser>,
) -> Result<Bootstrap, ImportError> {
    if users.any_user_exists().await? {
        tracing::info!("users already exist, skipping demo user");
        return Ok(Bootstrap::UsersExist);
    }
    let Some(demo) = demo else {
        tracing::warn!("no users exist and no demo credentials were given");
        return Ok(Bootstrap::NoCredentials);
    };
    let new = NewUser {
        username: demo.username.trim().to_string(),
        email: demo.email.trim().to_string(),
        hashed_password: hash_password(&demo.password)?,
    };
    let user = users.create_user(&new).await?;
    tracing::info!(username = %user.username, "demo user created");
    Ok(Bootstrap::Created(user.username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::verify_password;
    use crate::store::MemoryCatalog;

    const FIXTURE: &str = r#"[
        {
            "name": {"common": "France", "official": "French Republic"},
            "cca2": "FR", "cca3": "FRA", "independent": true, "unMember": true,
            "region": "Europe", "subregion": "Western Europe", "area": 551695.0,
            "population": 67391582,
            "flags": {"png": "https://flagcdn.com/w320/fr.png", "svg": "x"},
            "capital": ["Paris"], "timezones": ["UTC-10:00", "UTC+01:00"],
            "languages": {"fra": "French"}
        },
        {
            "name": {"common": "Antarctica", "official": "Antarctica"},
            "cca2": "AQ", "region": "Antarctic"
        },
        {
            "name": {"common": "Nowhere", "official": "Nowhere"}
        }
    ]"#;

    fn parsed() -> Vec<NewCountry> {
        let records: Vec<RestCountry> = serde_json::from_str(FIXTURE).unwrap();
        to_new_countries(records)
    }

    #[test]
    fn maps_full_record() {
        let rows = parsed();
        let fr = &rows[0];
        assert_eq!(fr.name_common, "France");
        assert_eq!(fr.cca3.as_deref(), Some("FRA"));
        assert!(fr.un_member);
        assert_eq!(fr.capital.as_deref(), Some("Paris"));
        assert_eq!(fr.flag_url.as_deref(), Some("https://flagcdn.com/w320/fr.png"));
        assert_eq!(fr.timezones.len(), 2);
        assert_eq!(fr.languages.get("fra").map(String::as_str), Some("French"));
    }

    #[test]
    fn sparse_record_takes_empty_defaults() {
        let rows = parsed();
        let aq = &rows[1];
        assert_eq!(aq.population, 0);
        assert!(!aq.un_member);
        assert_eq!(aq.capital, None);
        assert!(aq.timezones.is_empty());
        assert!(aq.languages.is_empty());
    }

    #[test]
    fn record_without_code_is_dropped() {
        assert_eq!(parsed().len(), 2);
    }

    fn demo() -> DemoUser {
        DemoUser {
            username: "demo".into(),
            email: "demo@example.com".into(),
            password: "demo-pass".into(),
        }
    }

    #[tokio::test]
    async fn bootstrap_creates_first_user_once() {
        let store = MemoryCatalog::default();
        let first = bootstrap_demo_user(&store, Some(demo())).await.unwrap();
        assert_eq!(first, Bootstrap::Created("demo".into()));
        let user = store.find_by_username("demo").await.unwrap().unwrap();
        assert!(verify_password("demo-pass", &user.hashed_password));

        let second = bootstrap_demo_user(&store, Some(demo())).await.unwrap();
        assert_eq!(second, Bootstrap::UsersExist);
    }

    #[tokio::test]
    async fn bootstrap_without_credentials_creates_nothing() {
        let store = MemoryCatalog::default();
        let outcome = bootstrap_demo_user(&store, None).await.unwrap();
        assert_eq!(outcome, Bootstrap::NoCredentials);
        assert!(!store.any_user_exists().await.unwrap());
    }
}
