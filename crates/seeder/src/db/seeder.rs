//! Transactional seeding runs.

use std::time::Instant;

use sqlx::Connection;
use tracing::{info, warn};

use super::dsn::ConnectionParams;
use super::pool::{PoolManager, PooledConnection};
use crate::config::SeederConfig;
use crate::errors::SeedError;
use crate::routines::SeedRoutine;

/// Connections opened when a run starts.
pub const MIN_CONNECTIONS: u32 = 1;
/// Upper bound on pool size during a run.
pub const MAX_CONNECTIONS: u32 = 10;
/// Reported as the failing routine when the final commit fails.
pub const COMMIT_STEP: &str = "commit";

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    /// Rows inserted per routine, in execution order.
    pub routines: Vec<(&'static str, u64)>,
    pub elapsed_ms: u64,
}

impl SeedReport {
    pub fn total_rows(&self) -> u64 {
        self.routines.iter().map(|(_, rows)| rows).sum()
    }
}

/// Runs seed routines against one connection inside one transaction.
///
/// Either every routine's rows are committed or none are. The pool is
/// initialized at the start of [`Seeder::run`] and shut down before it
/// returns, on success and on failure.
pub struct Seeder {
    pools: PoolManager,
    routines: Vec<Box<dyn SeedRoutine>>,
}

impl Seeder {
    /// Creates a seeder with no routines.
    pub fn new(pools: PoolManager) -> Self {
        Self {
            pools,
            routines: Vec::new(),
        }
    }

    /// Appends a routine. Routines run in the order they are added.
    pub fn with_routine(mut self, routine: impl SeedRoutine + 'static) -> Self {
        self.routines.push(Box::new(routine));
        self
    }

    /// Names of the registered routines, in execution order.
    pub fn routine_names(&self) -> Vec<&'static str> {
        self.routines.iter().map(|r| r.name()).collect()
    }

    /// Returns the pool manager for advanced usage.
    pub fn pools(&self) -> &PoolManager {
        &self.pools
    }

    /// Performs one seeding run.
    ///
    /// DSN and pool lifecycle errors are returned as-is. A failing routine
    /// rolls the whole transaction back and surfaces as
    /// [`SeedError::SeedingFailed`]. A rejected commit is reported the same
    /// way, with [`COMMIT_STEP`] as the routine name.
    pub async fn run(&self, config: &SeederConfig) -> Result<SeedReport, SeedError> {
        let started = Instant::now();

        let params = ConnectionParams::parse(&config.database.postgres)?;
        self.pools
            .initialize(MIN_CONNECTIONS, MAX_CONNECTIONS, &params)
            .await?;
        info!("Connected to {}:{}/{}", params.host, params.port, params.database);

        let outcome = self.seed_with_connection(config).await;
        self.pools.shutdown().await;

        let routines = outcome?;
        let report = SeedReport {
            routines,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "Database seeding completed: {} rows in {} ms",
            report.total_rows(),
            report.elapsed_ms
        );
        Ok(report)
    }

    async fn seed_with_connection(
        &self,
        config: &SeederConfig,
    ) -> Result<Vec<(&'static str, u64)>, SeedError> {
        let mut conn = self.pools.acquire().await?;
        let outcome = self.seed_in_transaction(&mut conn, config).await;
        self.pools.release(conn);
        outcome
    }

    async fn seed_in_transaction(
        &self,
        conn: &mut PooledConnection,
        config: &SeederConfig,
    ) -> Result<Vec<(&'static str, u64)>, SeedError> {
        let mut tx = conn.begin().await?;
        let mut counts = Vec::with_capacity(self.routines.len());

        for routine in &self.routines {
            match routine.seed(&mut tx, config).await {
                Ok(rows) => counts.push((routine.name(), rows)),
                Err(e) => {
                    warn!("Seed routine `{}` failed, rolling back: {e}", routine.name());
                    if let Err(rollback) = tx.rollback().await {
                        warn!("Rollback failed: {rollback}");
                    }
                    return Err(SeedError::seeding_failed(routine.name(), e));
                }
            }
        }

        if let Err(e) = tx.commit().await {
            warn!("Commit failed, transaction rolled back: {e}");
            return Err(SeedError::seeding_failed(COMMIT_STEP, e.into()));
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sqlx::PgConnection;

    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl SeedRoutine for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn seed(&self, _: &mut PgConnection, _: &SeederConfig) -> Result<u64, SeedError> {
            Ok(0)
        }
    }

    #[test]
    fn test_routines_keep_registration_order() {
        let seeder = Seeder::new(PoolManager::new())
            .with_routine(Named("users"))
            .with_routine(Named("servers"))
            .with_routine(Named("channels"));

        assert_eq!(seeder.routine_names(), vec!["users", "servers", "channels"]);
    }

    #[tokio::test]
    async fn test_invalid_dsn_is_returned_unwrapped() {
        let seeder = Seeder::new(PoolManager::new()).with_routine(Named("users"));
        let config = SeederConfig::for_url("definitely not a url");

        let result = seeder.run(&config).await;

        assert!(matches!(result, Err(SeedError::InvalidDsn(_))));
        assert!(!seeder.pools().is_initialized().await);
    }

    #[tokio::test]
    async fn test_already_initialized_pool_is_not_reused() {
        let seeder = Seeder::new(PoolManager::new()).with_routine(Named("users"));
        let params = ConnectionParams::parse("postgresql://localhost:1/nowhere").unwrap();
        seeder.pools().initialize_lazy(1, 1, &params).await.unwrap();

        let result = seeder
            .run(&SeederConfig::for_url("postgresql://localhost:1/nowhere"))
            .await;

        assert!(matches!(result, Err(SeedError::AlreadyInitialized)));
        seeder.pools().shutdown().await;
    }

    #[tokio::test]
    async fn test_unreachable_database_fails_and_shuts_down() {
        let seeder = Seeder::new(PoolManager::new()).with_routine(Named("users"));
        let config = SeederConfig::for_url("postgresql://postgres@127.0.0.1:1/nowhere");

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), seeder.run(&config))
            .await
            .expect("run did not return");

        assert!(matches!(result, Err(SeedError::Database(_))));
        assert!(!seeder.pools().is_initialized().await);
    }

    #[test]
    fn test_report_totals() {
        let report = SeedReport {
            routines: vec![("users", 100), ("servers", 20)],
            elapsed_ms: 5,
        };

        assert_eq!(report.total_rows(), 120);
    }
}
