//! # Gardi (Credential & Session Issuance)
//!
//! `gardi` gates access to a companion application. A caller registers an
//! identity, authenticates with a password, completes a one-time-passcode
//! (OTP) challenge delivered out-of-band, and receives a signed session
//! token carried as an `HttpOnly` cookie. A separate endpoint lets any
//! downstream service validate that cookie and recover the caller's
//! identity without re-running the password/OTP steps.
//!
//! ## Login state machine
//!
//! Per login attempt: `Unauthenticated → ChallengeIssued → SessionActive`.
//!
//! - A valid email+password pair issues a fresh challenge; a repeated login
//!   overwrites (silently invalidates) any prior unconsumed challenge.
//! - Submitting the correct OTP consumes it (single use) and mints the
//!   session token. Wrong or stale codes leave the pending challenge as-is.
//! - Registration is a separate entry path that mints a session directly,
//!   without a challenge step.
//!
//! ## Sessions
//!
//! Sessions are stateless: an HS256-signed token bound to the user id with
//! a fixed lifetime. Validity is re-derived from signature and expiry on
//! every check; there is no session table and no revocation before natural
//! expiry. The signing secret is immutable process configuration loaded at
//! startup.

pub mod api;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
