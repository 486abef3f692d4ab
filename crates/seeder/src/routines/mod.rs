//! Seed routines: one per table, all run inside the orchestrator's transaction.
//!
//! A routine inserts rows through the connection it is handed and reports how
//! many it wrote. Routines never commit or roll back; [`crate::db::Seeder`]
//! owns the transaction boundary.

pub mod users;

use async_trait::async_trait;
use sqlx::PgConnection;

use crate::config::SeederConfig;
use crate::errors::SeedError;

pub use users::UsersTable;

#[async_trait]
pub trait SeedRoutine: Send + Sync {
    /// Short name used in logs and in [`SeedError::SeedingFailed`].
    fn name(&self) -> &'static str;

    /// Inserts this routine's rows and returns how many were written.
    async fn seed(&self, conn: &mut PgConnection, config: &SeederConfig) -> Result<u64, SeedError>;
}
