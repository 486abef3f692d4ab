//! Development data seeding for Postgres.
//!
//! A run parses the configured DSN, brings up a connection pool, checks out a
//! single connection and executes every registered seed routine inside one
//! transaction. Any routine failure rolls back all of them.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seeder::prelude::*;
//!
//! let config = SeederConfig::load(Environment::Local, Path::new("."))?;
//! let report = Seeder::new(PoolManager::new())
//!     .with_routine(UsersTable::new()?)
//!     .run(&config)
//!     .await?;
//! ```

pub mod config;
pub mod db;
pub mod errors;
pub mod generators;
pub mod password;
pub mod routines;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{Environment, SeedSettings, SeederConfig};
    pub use crate::db::{ConnectionParams, PoolManager, SeedReport, Seeder};
    pub use crate::errors::{ConfigError, SeedError};
    pub use crate::generators::{GeneratedUser, UserGenConfig, UserGenerator};
    pub use crate::password::{Argon2Hasher, CredentialHasher};
    pub use crate::routines::{SeedRoutine, UsersTable};
}
