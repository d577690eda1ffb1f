//! Credential store: user records and challenge state.
//!
//! All record access goes through the `UserStore` capability so handlers
//! never touch a global database handle. `PgUserStore` is the durable
//! implementation; `MemoryUserStore` is the in-memory fake used by tests.
//!
//! Two operations must be atomic in the store itself, not in the service:
//! email uniqueness on insert (the service pre-check has a race window) and
//! OTP consumption (compare-and-clear, so one code can never mint two
//! sessions).

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("credential store unavailable")]
    Unavailable(#[source] anyhow::Error),
}

/// Fields supplied at registration. The id is store-assigned.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub is_verified: bool,
    pub otp: Option<String>,
}

/// The durable identity record.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub is_verified: bool,
    pub otp: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a record. Fails with `DuplicateEmail` if the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Exact-match lookup; emails are case-sensitive as stored.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Write a fresh challenge, overwriting any previous unconsumed one.
    async fn set_otp(&self, id: Uuid, otp: &str) -> Result<(), StoreError>;

    /// Atomically clear a live challenge matching `otp` and return its
    /// record. Codes issued more than `max_age` ago never match.
    async fn consume_otp(
        &self,
        otp: &str,
        max_age: Duration,
    ) -> Result<Option<UserRecord>, StoreError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let query = r"
            INSERT INTO users
                (username, email, password_hash, role, is_verified, otp, otp_issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6::text IS NULL THEN NULL ELSE NOW() END)
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(user.is_verified)
            .bind(&user.otp)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicateEmail
                } else {
                    StoreError::Unavailable(err.into())
                }
            })?;

        Ok(UserRecord {
            id: row.get("id"),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_verified: user.is_verified,
            otp: user.otp,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = r"
            SELECT id, username, email, password_hash, role, is_verified, otp
            FROM users WHERE email = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| StoreError::Unavailable(err.into()))?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let query = r"
            SELECT id, username, email, password_hash, role, is_verified, otp
            FROM users WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| StoreError::Unavailable(err.into()))?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn set_otp(&self, id: Uuid, otp: &str) -> Result<(), StoreError> {
        let query = "UPDATE users SET otp = $2, otp_issued_at = NOW() WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(otp)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| StoreError::Unavailable(err.into()))?;

        Ok(())
    }

    async fn consume_otp(
        &self,
        otp: &str,
        max_age: Duration,
    ) -> Result<Option<UserRecord>, StoreError> {
        // Single UPDATE so compare-and-clear is atomic: concurrent
        // submitters of the same code race on the row, and the loser sees
        // zero rows returned.
        let query = r"
            UPDATE users
            SET otp = NULL, otp_issued_at = NULL
            WHERE otp = $1
              AND otp_issued_at IS NOT NULL
              AND otp_issued_at > NOW() - ($2::bigint * INTERVAL '1 second')
            RETURNING id, username, email, password_hash, role, is_verified
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let max_age_seconds = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        let row = sqlx::query(query)
            .bind(otp)
            .bind(max_age_seconds)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| StoreError::Unavailable(err.into()))?;

        Ok(row.map(|row| UserRecord {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role: row.get("role"),
            is_verified: row.get("is_verified"),
            otp: None,
        }))
    }
}

fn row_to_record(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        is_verified: row.get("is_verified"),
        otp: row.get("otp"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

struct StoredUser {
    record: UserRecord,
    otp_issued_at: Option<Instant>,
}

/// In-memory store used by tests and local experiments.
///
/// One mutex guards the whole map, so compare-and-clear consumption is a
/// single critical section.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, StoredUser>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().await;
        if users.values().any(|entry| entry.record.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_verified: user.is_verified,
            otp: user.otp,
        };
        let otp_issued_at = record.otp.as_ref().map(|_| Instant::now());
        users.insert(
            record.id,
            StoredUser {
                record: record.clone(),
                otp_issued_at,
            },
        );
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|entry| entry.record.email == email)
            .map(|entry| entry.record.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.get(&id).map(|entry| entry.record.clone()))
    }

    async fn set_otp(&self, id: Uuid, otp: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if let Some(entry) = users.get_mut(&id) {
            entry.record.otp = Some(otp.to_string());
            entry.otp_issued_at = Some(Instant::now());
        }
        Ok(())
    }

    async fn consume_otp(
        &self,
        otp: &str,
        max_age: Duration,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().await;
        let matched = users.values_mut().find(|entry| {
            entry.record.otp.as_deref() == Some(otp)
                && entry
                    .otp_issued_at
                    .is_some_and(|issued| issued.elapsed() <= max_age)
        });
        Ok(matched.map(|entry| {
            entry.record.otp = None;
            entry.otp_issued_at = None;
            entry.record.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, otp: Option<&str>) -> NewUser {
        NewUser {
            username: "alex".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
            role: None,
            is_verified: false,
            otp: otp.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::new();
        store.insert_user(new_user("a@x.com", None)).await.expect("first insert");
        let err = store
            .insert_user(new_user("a@x.com", None))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn emails_are_case_sensitive() {
        let store = MemoryUserStore::new();
        store.insert_user(new_user("a@x.com", None)).await.expect("insert");
        assert!(store
            .insert_user(new_user("A@x.com", None))
            .await
            .is_ok());
        assert!(store.find_by_email("a@X.com").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn consume_is_single_use() {
        let store = MemoryUserStore::new();
        let record = store.insert_user(new_user("a@x.com", None)).await.expect("insert");
        store.set_otp(record.id, "482913").await.expect("set");

        let max_age = Duration::from_secs(600);
        let consumed = store.consume_otp("482913", max_age).await.expect("consume");
        assert_eq!(consumed.map(|r| r.id), Some(record.id));

        // Replay of the same code finds nothing.
        let replay = store.consume_otp("482913", max_age).await.expect("replay");
        assert!(replay.is_none());
    }

    #[tokio::test]
    async fn concurrent_consume_yields_one_session() {
        let store = MemoryUserStore::new();
        let record = store.insert_user(new_user("a@x.com", None)).await.expect("insert");
        store.set_otp(record.id, "482913").await.expect("set");

        let max_age = Duration::from_secs(600);
        let (first, second) = tokio::join!(
            store.consume_otp("482913", max_age),
            store.consume_otp("482913", max_age)
        );
        let winners = [first.expect("first"), second.expect("second")]
            .into_iter()
            .flatten()
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn stale_challenge_never_matches() {
        let store = MemoryUserStore::new();
        let record = store.insert_user(new_user("a@x.com", None)).await.expect("insert");
        store.set_otp(record.id, "482913").await.expect("set");

        let stale = store
            .consume_otp("482913", Duration::ZERO)
            .await
            .expect("consume");
        assert!(stale.is_none());

        // The unconsumed (if expired) challenge still blocks nothing: a new
        // login overwrites it.
        store.set_otp(record.id, "000111").await.expect("reissue");
        let fresh = store
            .consume_otp("000111", Duration::from_secs(600))
            .await
            .expect("consume");
        assert!(fresh.is_some());
    }

    #[tokio::test]
    async fn reissue_invalidates_previous_code() {
        let store = MemoryUserStore::new();
        let record = store.insert_user(new_user("a@x.com", None)).await.expect("insert");
        store.set_otp(record.id, "111111").await.expect("first");
        store.set_otp(record.id, "222222").await.expect("second");

        let max_age = Duration::from_secs(600);
        assert!(store
            .consume_otp("111111", max_age)
            .await
            .expect("old code")
            .is_none());
        assert!(store
            .consume_otp("222222", max_age)
            .await
            .expect("new code")
            .is_some());
    }

    #[tokio::test]
    async fn otp_seed_is_live_at_creation() {
        let store = MemoryUserStore::new();
        store
            .insert_user(new_user("a@x.com", Some("999000")))
            .await
            .expect("insert");
        let consumed = store
            .consume_otp("999000", Duration::from_secs(600))
            .await
            .expect("consume");
        assert!(consumed.is_some());
    }

    #[test]
    fn unique_violation_matches_sqlstate() {
        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
