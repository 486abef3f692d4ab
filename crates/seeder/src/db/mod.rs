//! Database integration for seeding runs.
//!
//! - [`ConnectionParams`]: parses a Postgres DSN
//! - [`PoolManager`]: owns the connection pool's lifecycle
//! - [`Seeder`]: runs seed routines in a single transaction

mod dsn;
mod pool;
mod seeder;

pub use dsn::ConnectionParams;
pub use pool::{ACQUIRE_TIMEOUT, CONNECT_TIMEOUT, PoolManager, PooledConnection};
pub use seeder::{COMMIT_STEP, MAX_CONNECTIONS, MIN_CONNECTIONS, SeedReport, Seeder};
