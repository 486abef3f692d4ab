//! Entity generators for seed data.
//!
//! - [`UserGenerator`]: users with run-unique usernames and emails
//! - [`UniqueValues`]: the bounded retry-until-unique helper it uses

pub mod unique;
pub mod user;

pub use unique::UniqueValues;
pub use user::{GeneratedUser, UserGenConfig, UserGenerator};
