//! Auth handlers and supporting modules.
//!
//! This module implements the identity verification and session-issuance
//! state machine: registration, password verification, OTP challenge
//! issuance/consumption, and session-token minting/validation.
//!
//! ## Challenge lifecycle
//!
//! A user record holds at most one live OTP at a time. Login overwrites any
//! prior unconsumed code; consumption is a single atomic compare-and-clear
//! so that at most one of two concurrent submitters of the same code
//! obtains a session. Codes older than the configured TTL are treated as
//! never issued.
//!
//! ## Sessions
//!
//! Session tokens are stateless HS256 JWTs carried in the `token` cookie.
//! The session check is a capability query: missing, malformed, foreign, or
//! expired tokens all yield `{"valid": false}`, never an error.

pub(crate) mod errors;
pub(crate) mod login;
mod otp;
mod password;
pub(crate) mod register;
pub(crate) mod session;
mod state;
mod storage;
mod token;
pub(crate) mod types;
pub(crate) mod verify_otp;

pub use state::{AuthConfig, AuthState};
pub use storage::{MemoryUserStore, NewUser, PgUserStore, StoreError, UserRecord, UserStore};
pub use token::SessionSigner;
