//! One-shot import: create tables, bootstrap the demo user, then seed countries.

use clap::Parser;
use country_catalog::import::{bootstrap_demo_user, fetch_countries, DemoUser, DEFAULT_SOURCE_URL};
use country_catalog::{ensure_database_exists, ensure_tables, ImportError, PgStore};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "import-countries",
    about = "Seed the country catalog from the REST Countries API",
    version
)]
struct CliArgs {
    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://localhost/country_catalog")]
    database_url: String,
    /// Endpoint returning the full country list as JSON.
    #[arg(long, env = "SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    source_url: String,
    #[arg(long, env = "DEMO_USERNAME")]
    demo_username: Option<String>,
    #[arg(long, env = "DEMO_EMAIL")]
    demo_email: Option<String>,
    #[arg(long, env = "DEMO_PASSWORD", hide_env_values = true)]
    demo_password: Option<String>,
    /// Only prepare tables and the demo user.
    #[arg(long)]
    skip_fetch: bool,
}

impl CliArgs {
    fn demo_user(&self) -> Option<DemoUser> {
        match (&self.demo_username, &self.demo_password) {
            (Some(username), Some(password)) => Some(DemoUser {
                username: username.clone(),
                email: self.demo_email.clone().unwrap_or_default(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

async fn run(args: CliArgs) -> Result<(), ImportError> {
    ensure_database_exists(&args.database_url).await?;
    let store = PgStore::connect(&args.database_url, 1).await?;
    ensure_tables(store.pool()).await?;

    bootstrap_demo_user(&store, args.demo_user()).await?;

    if args.skip_fetch {
        tracing::info!("fetch skipped");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let rows = fetch_countries(&client, &args.source_url).await?;
    let inserted = store.import_countries(&rows).await?;
    tracing::info!(fetched = rows.len(), inserted, "import finished");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("country_catalog=info")),
        )
        .init();

    match run(CliArgs::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "import failed");
            ExitCode::FAILURE
        }
    }
}
