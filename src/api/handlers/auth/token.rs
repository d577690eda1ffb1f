//! Session token minting and verification.
//!
//! Tokens are HS256 JWTs bound to the user id with a fixed lifetime.
//! Verification re-derives validity from signature and expiry alone; there
//! is no server-side session state.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl SessionSigner {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds,
        }
    }

    /// Mint a signed token bound to `user_id`, expiring after the
    /// configured lifetime.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn mint(&self, user_id: Uuid) -> Result<String> {
        self.mint_with_lifetime(user_id, self.ttl_seconds)
    }

    pub(super) fn mint_with_lifetime(&self, user_id: Uuid, lifetime_seconds: i64) -> Result<String> {
        let iat = now_unix_seconds();
        let claims = Claims {
            sub: user_id,
            iat,
            exp: iat + lifetime_seconds,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("failed to sign session token")
    }

    /// Verify a presented token, returning the bound user id.
    ///
    /// Any failure (signature, expiry, malformed input) is `None`; token
    /// invalidity is normal input at this layer, not an error.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .ok()
    }
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
