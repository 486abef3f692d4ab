use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Invalid connection string: {0}")]
    InvalidDsn(#[from] url::ParseError),

    #[error("Invalid pool bounds: min {min}, max {max} (need 1 <= min <= max)")]
    InvalidPoolBounds { min: u32, max: u32 },

    #[error("Connection pool is not initialized")]
    NotInitialized,

    #[error("Connection pool is already initialized")]
    AlreadyInitialized,

    #[error("Could not generate a unique {field} after {attempts} attempts")]
    GenerationExhausted { field: &'static str, attempts: usize },

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),

    #[error("Failed to generate id: {0}")]
    IdGeneration(#[from] ulid::MonotonicError),

    #[error("Seed routine `{routine}` failed, transaction rolled back: {source}")]
    SeedingFailed {
        routine: &'static str,
        source: Box<SeedError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SeedError {
    /// Wraps a routine failure after its transaction has been rolled back.
    pub fn seeding_failed(routine: &'static str, cause: SeedError) -> Self {
        Self::SeedingFailed {
            routine,
            source: Box::new(cause),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment: {0}. Must be one of: dev, local, production")]
    InvalidEnvironment(String),

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
