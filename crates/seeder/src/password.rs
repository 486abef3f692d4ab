//! Password hashing for seeded accounts.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use crate::errors::SeedError;

/// Argon2 memory cost in KiB.
pub const MEMORY_COST_KIB: u32 = 19_456;
/// Argon2 iterations.
pub const TIME_COST: u32 = 2;
/// Argon2 lanes.
pub const PARALLELISM: u32 = 1;
/// Hash output length in bytes.
pub const OUTPUT_LEN: usize = 32;

/// Turns a plaintext password into a storable hash string.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, SeedError>;
}

/// Argon2id with the cost parameters the auth service verifies against.
///
/// Every call draws a fresh 16-byte salt, so hashing the same password twice
/// yields different strings.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Result<Self, SeedError> {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
            .map_err(|e| SeedError::PasswordHash(format!("invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, SeedError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| SeedError::PasswordHash(e.to_string()))?;
        Ok(hash.to_string())
    }
}
