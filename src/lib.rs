//! Watches how PostgreSQL and the driver treat `timestamp` and `timestamptz` columns when the
//! session timezone changes between writes and reads.

pub mod config;
pub mod database;
pub mod errors;
pub mod format;
pub mod models;
pub mod runner;
pub mod timezone;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Profile, Settings};
use crate::runner::Runner;

/// Log to stderr so stdout carries only the demo output
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tz_session_demo=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Connects with the loaded settings and runs `profile` against stdout
pub async fn run_profile(profile: Profile) -> anyhow::Result<()> {
    let settings = Settings::from_env(profile);

    let mut conn = database::connect(&settings.database_url).await?;
    info!("🔌 Connected to PostgreSQL");
    database::ensure_schema(&mut conn).await?;

    let mut runner = Runner::new(
        conn,
        settings.profile,
        StdRng::from_entropy(),
        std::io::stdout(),
    );
    runner.run().await?;

    Ok(())
}
