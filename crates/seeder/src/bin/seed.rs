//! Seeds the development database with synthetic users.
//!
//! Run with:
//! ```
//! ENV=local cargo run -p seeder --bin seed -- --config-dir . --users 250
//! ```

use std::path::PathBuf;

use clap::Parser;
use seeder::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Populate the database with synthetic test data")]
struct Args {
    /// Environment whose `chaty.<env>.yaml` is loaded.
    #[arg(long, env = "ENV", value_enum, default_value_t = Environment::Local)]
    env: Environment,

    /// Directory holding the config files.
    #[arg(long, env = "SEED_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    /// Overrides `seed.users` from the config file.
    #[arg(long)]
    users: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!("App data seeder");

    let mut config = SeederConfig::load(args.env, &args.config_dir)?;
    if let Some(users) = args.users {
        config.seed.users = users;
    }
    tracing::info!(
        "Loaded config for environment: {} ({})",
        config.environment_label(),
        args.env
    );

    let seeder = Seeder::new(PoolManager::new()).with_routine(UsersTable::new()?);

    let report = match seeder.run(&config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Seeding failed: {e}");
            return Err(e.into());
        }
    };

    tracing::info!("Seed completed!");
    for (routine, rows) in &report.routines {
        tracing::info!("  {}: {}", routine, rows);
    }
    tracing::info!("  Elapsed: {} ms", report.elapsed_ms);

    Ok(())
}
