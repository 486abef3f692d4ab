//! The `users` table routine.

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use sqlx::PgConnection;
use tracing::info;

use super::SeedRoutine;
use crate::config::SeederConfig;
use crate::errors::SeedError;
use crate::generators::{GeneratedUser, UserGenConfig, UserGenerator};
use crate::password::{Argon2Hasher, CredentialHasher};

/// Log progress every this many rows.
const PROGRESS_INTERVAL: usize = 100;

/// Inserts `config.seed.users` generated users, one row at a time.
#[derive(Clone)]
pub struct UsersTable<H = Argon2Hasher> {
    hasher: H,
}

impl UsersTable<Argon2Hasher> {
    /// Routine hashing with production Argon2 parameters.
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            hasher: Argon2Hasher::new()?,
        })
    }
}

impl<H> UsersTable<H>
where
    H: CredentialHasher + Clone,
{
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }
}

#[async_trait]
impl<H> SeedRoutine for UsersTable<H>
where
    H: CredentialHasher + Clone,
{
    fn name(&self) -> &'static str {
        "users"
    }

    async fn seed(&self, conn: &mut PgConnection, config: &SeederConfig) -> Result<u64, SeedError> {
        let count = config.seed.users;
        info!("Seeding {} users...", count);

        let mut rng = match config.seed.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut generator = UserGenerator::new(
            UserGenConfig::from_settings(&config.seed),
            self.hasher.clone(),
        );

        let mut inserted = 0;
        for i in 0..count {
            let user = generator.generate(&mut rng)?;
            inserted += insert_user(conn, &user).await?;

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("  Seeded {}/{} users", i + 1, count);
            }
        }

        info!("Seeded {} users", inserted);
        Ok(inserted)
    }
}

/// Inserts a single user and returns the affected row count.
pub async fn insert_user(conn: &mut PgConnection, user: &GeneratedUser) -> Result<u64, SeedError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (
            id, username, email, password_hash, display_name, badges,
            status_text, status_presence, profile_content, profile_background_id,
            privileged, suspended_until, created_at, updated_at, verified
        )
        VALUES (
            $1, $2, $3, $4, $5, $6,
            $7, $8, $9, $10,
            $11, $12, $13, $14, $15
        )
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.display_name)
    .bind(user.badges)
    .bind(&user.status_text)
    .bind(&user.status_presence)
    .bind(&user.profile_content)
    .bind(&user.profile_background_id)
    .bind(user.privileged)
    .bind(user.suspended_until)
    .bind(user.created_at)
    .bind(user.updated_at)
    .bind(user.verified)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
