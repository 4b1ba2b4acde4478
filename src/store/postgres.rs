//! PostgreSQL adapter: table DDL, database bootstrap, and the repository implementations.

use super::{CountryRepository, UserRepository};
use crate::error::{AppError, ConfigError};
use crate::model::{Country, CountryUpdate, NewCountry, NewUser, User};
use crate::service::{contains_pattern, LanguageFilter, Page};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const COUNTRY_COLUMNS: &str = "id, name_common, name_official, cca2, cca3, independent, un_member, \
     region, subregion, area, population, flag_url, capital, timezones, languages";

const INSERT_COUNTRY: &str = "INSERT INTO countries (name_common, name_official, cca2, cca3, independent, \
     un_member, region, subregion, area, population, flag_url, capital, timezones, languages) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)";

const USER_COLUMNS: &str = "id, username, email, hashed_password, created_at";

/// Create `countries` and `users` if missing. Safe to run on every start.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS countries (
            id BIGSERIAL PRIMARY KEY,
            name_common VARCHAR(100) NOT NULL,
            name_official VARCHAR(200) NOT NULL,
            cca2 VARCHAR(2) NOT NULL UNIQUE,
            cca3 VARCHAR(3) UNIQUE,
            independent BOOLEAN,
            un_member BOOLEAN NOT NULL DEFAULT FALSE,
            region VARCHAR(100) NOT NULL DEFAULT '',
            subregion VARCHAR(100),
            area DOUBLE PRECISION,
            population BIGINT NOT NULL DEFAULT 0,
            flag_url TEXT,
            capital VARCHAR(100),
            timezones JSONB NOT NULL DEFAULT '[]'::jsonb,
            languages JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS countries_region_idx ON countries (region)")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(100) NOT NULL UNIQUE,
            email VARCHAR(255) NOT NULL,
            hashed_password TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database if it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|e| {
        ConfigError::Invalid {
            key: "DATABASE_URL",
            message: e.to_string(),
        }
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or(ConfigError::Invalid {
        key: "DATABASE_URL",
        message: "no database path".into(),
    })? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Pooled store backing both repositories. Each call borrows a connection for its query or transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a batch in one transaction. Rows whose codes already exist are skipped.
    /// Returns the number of rows inserted.
    pub async fn import_countries(&self, rows: &[NewCountry]) -> Result<u64, AppError> {
        let sql = format!("{} ON CONFLICT DO NOTHING", INSERT_COUNTRY);
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for row in rows {
            let done = bind_new_country(sqlx::query(&sql), row)
                .execute(&mut *tx)
                .await?;
            inserted += done.rows_affected();
        }
        tx.commit().await?;
        tracing::debug!(total = rows.len(), inserted, "import batch committed");
        Ok(inserted)
    }

    async fn fetch_countries(&self, sql: &str, param: &str) -> Result<Vec<Country>, AppError> {
        tracing::debug!(sql = %sql, param = %param, "query");
        let rows = sqlx::query_as::<_, Country>(sql)
            .bind(param)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

fn bind_new_country<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    row: &'q NewCountry,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(&row.name_common)
        .bind(&row.name_official)
        .bind(&row.cca2)
        .bind(&row.cca3)
        .bind(row.independent)
        .bind(row.un_member)
        .bind(&row.region)
        .bind(&row.subregion)
        .bind(row.area)
        .bind(row.population)
        .bind(&row.flag_url)
        .bind(&row.capital)
        .bind(Json(&row.timezones))
        .bind(Json(&row.languages))
}

#[async_trait]
impl CountryRepository for PgStore {
    async fn get_by_code(&self, cca2: &str) -> Result<Option<Country>, AppError> {
        let sql = format!("SELECT {} FROM countries WHERE cca2 = $1", COUNTRY_COLUMNS);
        tracing::debug!(sql = %sql, cca2 = %cca2, "query");
        let row = sqlx::query_as::<_, Country>(&sql)
            .bind(cca2)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self, page: Page) -> Result<Vec<Country>, AppError> {
        let sql = format!(
            "SELECT {} FROM countries ORDER BY id OFFSET $1 LIMIT $2",
            COUNTRY_COLUMNS
        );
        tracing::debug!(sql = %sql, skip = page.skip, limit = page.limit, "query");
        let rows = sqlx::query_as::<_, Country>(&sql)
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, new: &NewCountry) -> Result<Country, AppError> {
        let sql = format!("{} RETURNING {}", INSERT_COUNTRY, COUNTRY_COLUMNS);
        tracing::debug!(sql = %sql, cca2 = %new.cca2, "insert");
        let row = bind_new_country(sqlx::query(&sql), new)
            .fetch_one(&self.pool)
            .await?;
        let country = <Country as sqlx::FromRow<_>>::from_row(&row)?;
        Ok(country)
    }

    async fn update(&self, cca2: &str, patch: &CountryUpdate) -> Result<Option<Country>, AppError> {
        let mut tx = self.pool.begin().await?;
        let select = format!(
            "SELECT {} FROM countries WHERE cca2 = $1 FOR UPDATE",
            COUNTRY_COLUMNS
        );
        let current = sqlx::query_as::<_, Country>(&select)
            .bind(cca2)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut country) = current else {
            return Ok(None);
        };
        country.apply(patch);
        let sql = format!(
            "UPDATE countries SET name_common = $2, name_official = $3, independent = $4, \
             un_member = $5, region = $6, subregion = $7, area = $8, population = $9, \
             flag_url = $10, capital = $11, timezones = $12, languages = $13, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            COUNTRY_COLUMNS
        );
        tracing::debug!(sql = %sql, cca2 = %cca2, "update");
        let updated = sqlx::query_as::<_, Country>(&sql)
            .bind(country.id)
            .bind(&country.name_common)
            .bind(&country.name_official)
            .bind(country.independent)
            .bind(country.un_member)
            .bind(&country.region)
            .bind(&country.subregion)
            .bind(country.area)
            .bind(country.population)
            .bind(&country.flag_url)
            .bind(&country.capital)
            .bind(Json(&country.timezones))
            .bind(Json(&country.languages))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete(&self, cca2: &str) -> Result<bool, AppError> {
        tracing::debug!(cca2 = %cca2, "delete");
        let done = sqlx::query("DELETE FROM countries WHERE cca2 = $1")
            .bind(cca2)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn by_region(&self, region: &str) -> Result<Vec<Country>, AppError> {
        let sql = format!(
            "SELECT {} FROM countries WHERE region = $1 ORDER BY id",
            COUNTRY_COLUMNS
        );
        self.fetch_countries(&sql, region).await
    }

    async fn by_language(&self, filter: &LanguageFilter) -> Result<Vec<Country>, AppError> {
        match filter {
            LanguageFilter::Code(code) => {
                let sql = format!(
                    "SELECT {} FROM countries WHERE EXISTS \
                     (SELECT 1 FROM jsonb_object_keys(languages) AS k WHERE lower(k) = lower($1)) \
                     ORDER BY id",
                    COUNTRY_COLUMNS
                );
                self.fetch_countries(&sql, code).await
            }
            LanguageFilter::Name(name) => {
                let sql = format!(
                    "SELECT {} FROM countries WHERE languages::text ILIKE $1 ESCAPE '\\' ORDER BY id",
                    COUNTRY_COLUMNS
                );
                let quoted = format!("\"{}\"", name);
                self.fetch_countries(&sql, &contains_pattern(&quoted)).await
            }
        }
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Country>, AppError> {
        let sql = format!(
            "SELECT {} FROM countries WHERE name_common ILIKE $1 ESCAPE '\\' ORDER BY id",
            COUNTRY_COLUMNS
        );
        self.fetch_countries(&sql, &contains_pattern(fragment)).await
    }

    async fn regions(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT region FROM countries WHERE region <> '' ORDER BY region",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn language_names(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT l.value FROM countries, jsonb_each_text(countries.languages) AS l ORDER BY l.value",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        tracing::debug!(username = %new.username, "insert user");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.hashed_password)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn any_user_exists(&self) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_url_targets_postgres_database() {
        let (admin, name) =
            parse_db_name_from_url("postgres://u:p@localhost:5432/country_catalog?sslmode=disable")
                .unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "country_catalog");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("cat\"alog"), "\"cat\"\"alog\"");
    }
}
