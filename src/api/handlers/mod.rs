//! API handlers and shared utilities.

pub mod auth;
pub mod health;

pub use self::health::health;

use regex::Regex;

/// Lightweight email sanity check used before persisting data.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
