//! Synthetic user generation.

use fake::{
    Fake,
    faker::{
        internet::en::{FreeEmail, Username},
        lorem::en::{Paragraph, Sentence},
        name::en::Name,
    },
};
use rand::Rng;
use time::OffsetDateTime;
use ulid::Ulid;

use super::unique::UniqueValues;
use crate::config::SeedSettings;
use crate::errors::SeedError;
use crate::password::{Argon2Hasher, CredentialHasher};

/// Generated user data ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedUser {
    pub id: Ulid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub badges: i32,
    pub status_text: String,
    pub status_presence: String,
    pub profile_content: String,
    pub profile_background_id: Option<String>,
    pub privileged: bool,
    pub suspended_until: Option<i64>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
    pub verified: bool,
}

/// Configuration for user generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    /// Plaintext password hashed into every user.
    pub password: String,
    /// Probability that a user is privileged.
    pub privileged_rate: f64,
    /// Probability that a user is verified.
    pub verified_rate: f64,
    /// Badges are drawn uniformly from `0..=max_badges`.
    pub max_badges: i32,
    /// Maximum status text length, in characters.
    pub status_text_limit: usize,
    pub status_presence: String,
    /// Attempts allowed per unique username or email.
    pub max_unique_attempts: usize,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            password: "password123".to_string(),
            privileged_rate: 0.10,
            verified_rate: 0.80,
            max_badges: 5,
            status_text_limit: 510,
            status_presence: "online".to_string(),
            max_unique_attempts: 1000,
        }
    }
}

impl UserGenConfig {
    pub fn from_settings(settings: &SeedSettings) -> Self {
        Self {
            password: settings.password.clone(),
            max_unique_attempts: settings.max_unique_attempts,
            ..Self::default()
        }
    }
}

/// Generates users whose usernames and emails are unique for the lifetime of
/// the generator.
///
/// All users from one generator share the same `created_at`/`updated_at`,
/// captured when the generator is built.
pub struct UserGenerator<H = Argon2Hasher> {
    config: UserGenConfig,
    hasher: H,
    ids: ulid::Generator,
    usernames: UniqueValues,
    emails: UniqueValues,
    timestamp_ms: i64,
}

impl<H: CredentialHasher> UserGenerator<H> {
    pub fn new(config: UserGenConfig, hasher: H) -> Self {
        let usernames = UniqueValues::new("username", config.max_unique_attempts);
        let emails = UniqueValues::new("email", config.max_unique_attempts);

        Self {
            config,
            hasher,
            ids: ulid::Generator::new(),
            usernames,
            emails,
            timestamp_ms: now_millis(),
        }
    }

    /// Timestamp stamped on every user from this generator.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Generates a single user.
    pub fn generate(&mut self, rng: &mut impl Rng) -> Result<GeneratedUser, SeedError> {
        let username = self
            .usernames
            .claim_with(|| Username().fake_with_rng(&mut *rng))?;
        let email = self
            .emails
            .claim_with(|| FreeEmail().fake_with_rng(&mut *rng))?;

        let id = self.ids.generate()?;
        let password_hash = self.hasher.hash(&self.config.password)?;

        let display_name: String = Name().fake_with_rng(rng);
        let sentence: String = Sentence(3..12).fake_with_rng(rng);
        let profile_content: String = Paragraph(2..5).fake_with_rng(rng);

        Ok(GeneratedUser {
            id,
            username,
            email,
            password_hash,
            display_name,
            badges: rng.gen_range(0..=self.config.max_badges),
            status_text: truncate_chars(sentence, self.config.status_text_limit),
            status_presence: self.config.status_presence.clone(),
            profile_content,
            profile_background_id: None,
            privileged: rng.gen_bool(self.config.privileged_rate),
            suspended_until: None,
            created_at: self.timestamp_ms,
            updated_at: self.timestamp_ms,
            verified: rng.gen_bool(self.config.verified_rate),
        })
    }

    /// Generates multiple users.
    pub fn generate_batch(
        &mut self,
        count: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedUser>, SeedError> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn truncate_chars(mut text: String, limit: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(limit) {
        text.truncate(idx);
    }
    text
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, SeedError> {
            Ok(format!("plain${password}"))
        }
    }

    fn generator() -> UserGenerator<PlainHasher> {
        UserGenerator::new(UserGenConfig::default(), PlainHasher)
    }

    #[test]
    fn test_generate_user() {
        let mut user_gen = generator();
        let mut rng = rand::thread_rng();
        let user = user_gen.generate(&mut rng).unwrap();

        assert!(!user.username.is_empty());
        assert!(user.email.contains('@'));
        assert_eq!(user.password_hash, "plain$password123");
        assert_eq!(user.status_presence, "online");
        assert!(user.profile_background_id.is_none());
        assert!(user.suspended_until.is_none());
        assert_eq!(user.id.to_string().len(), 26);
    }

    #[test]
    fn test_batch_is_unique_and_ordered() {
        let mut user_gen = generator();
        let mut rng = rand::thread_rng();
        let users = user_gen.generate_batch(2000, &mut rng).unwrap();

        let usernames: HashSet<_> = users.iter().map(|u| u.username.as_str()).collect();
        let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(usernames.len(), users.len());
        assert_eq!(emails.len(), users.len());

        assert!(users.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_batch_shares_one_timestamp() {
        let mut user_gen = generator();
        let mut rng = rand::thread_rng();
        let users = user_gen.generate_batch(50, &mut rng).unwrap();

        let stamp = user_gen.timestamp_ms();
        assert!(stamp > 0);
        assert!(
            users
                .iter()
                .all(|u| u.created_at == stamp && u.updated_at == stamp)
        );
    }

    #[test]
    fn test_field_distributions() {
        let mut user_gen = generator();
        let mut rng = StdRng::seed_from_u64(7);
        let users = user_gen.generate_batch(10_000, &mut rng).unwrap();
        let n = users.len() as f64;

        let privileged = users.iter().filter(|u| u.privileged).count() as f64 / n;
        let verified = users.iter().filter(|u| u.verified).count() as f64 / n;
        assert!((privileged - 0.10).abs() < 0.02, "privileged rate {privileged}");
        assert!((verified - 0.80).abs() < 0.02, "verified rate {verified}");

        let badges: HashSet<i32> = users.iter().map(|u| u.badges).collect();
        assert_eq!(badges, (0..=5).collect());

        assert!(users.iter().all(|u| u.status_text.chars().count() <= 510));
    }

    #[test]
    fn test_status_text_is_truncated() {
        let config = UserGenConfig {
            status_text_limit: 12,
            ..UserGenConfig::default()
        };
        let mut user_gen = UserGenerator::new(config, PlainHasher);
        let mut rng = rand::thread_rng();

        for user in user_gen.generate_batch(100, &mut rng).unwrap() {
            assert!(user.status_text.chars().count() <= 12);
        }

        assert_eq!(truncate_chars("héllo wörld".to_string(), 4), "héll");
        assert_eq!(truncate_chars("short".to_string(), 510), "short");
    }

    #[test]
    fn test_repeated_values_exhaust_budget() {
        let config = UserGenConfig {
            max_unique_attempts: 1,
            ..UserGenConfig::default()
        };
        let mut user_gen = UserGenerator::new(config, PlainHasher);

        // Same RNG stream twice means the same first username candidate.
        user_gen
            .generate(&mut StdRng::seed_from_u64(99))
            .unwrap();
        let result = user_gen.generate(&mut StdRng::seed_from_u64(99));

        assert!(matches!(
            result,
            Err(SeedError::GenerationExhausted {
                field: "username",
                attempts: 1
            })
        ));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = SeedSettings {
            password: "hunter2".to_string(),
            max_unique_attempts: 3,
            ..SeedSettings::default()
        };
        let config = UserGenConfig::from_settings(&settings);

        assert_eq!(config.password, "hunter2");
        assert_eq!(config.max_unique_attempts, 3);
        assert_eq!(config.status_text_limit, 510);
    }
}
