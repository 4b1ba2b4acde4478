//! Service settings read from the environment.

use crate::error::ConfigError;
use std::net::SocketAddr;
use tower_sessions::cookie::Key;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/country_catalog";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const MIN_SECRET_BYTES: usize = 64;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    /// Signs the session cookie. Supplied per environment, never defaulted.
    pub session_secret: String,
    /// Sessions expire after this much inactivity.
    pub session_ttl_minutes: i64,
    pub secure_cookies: bool,
    pub max_body_bytes: usize,
}

impl ServiceConfig {
    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the raw value for a variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let bind_addr = parse("BIND_ADDR", lookup("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;
        let session_secret = lookup("SESSION_SECRET").ok_or(ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::SecretTooShort(session_secret.len()));
        }
        let config = Self {
            database_url,
            bind_addr,
            db_max_connections: parse("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), Some(5))?,
            session_secret,
            session_ttl_minutes: parse("SESSION_TTL_MINUTES", lookup("SESSION_TTL_MINUTES"), Some(60))?,
            secure_cookies: parse("SECURE_COOKIES", lookup("SECURE_COOKIES"), Some(false))?,
            max_body_bytes: parse("MAX_BODY_BYTES", lookup("MAX_BODY_BYTES"), Some(64 * 1024))?,
        };
        if config.session_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_MINUTES",
                message: "must be positive".into(),
            });
        }
        Ok(config)
    }

    /// Cookie signing key derived from the configured secret.
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        Key::try_from(self.session_secret.as_bytes())
            .map_err(|_| ConfigError::SecretTooShort(self.session_secret.len()))
    }
}

fn parse<T>(key: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => default.ok_or(ConfigError::Missing(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn secret() -> String {
        "s".repeat(64)
    }

    fn config_from(pairs: &[(&str, String)]) -> Result<ServiceConfig, ConfigError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        ServiceConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("SESSION_SECRET", secret())]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.session_ttl_minutes, 60);
        assert!(!config.secure_cookies);
        assert!(config.session_key().is_ok());
    }

    #[test]
    fn secret_is_required_and_long() {
        assert!(matches!(
            config_from(&[]),
            Err(ConfigError::Missing("SESSION_SECRET"))
        ));
        assert!(matches!(
            config_from(&[("SESSION_SECRET", "short".into())]),
            Err(ConfigError::SecretTooShort(5))
        ));
    }

    #[test]
    fn malformed_numbers_are_reported_by_key() {
        let err = config_from(&[
            ("SESSION_SECRET", secret()),
            ("DB_MAX_CONNECTIONS", "many".into()),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                ..
            }
        ));
    }
}
