//! Auth state and configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::api::email::OtpSender;

use super::storage::UserStore;
use super::token::SessionSigner;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 3 * 24 * 60 * 60;
const DEFAULT_OTP_TTL_SECONDS: u64 = 10 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: i64,
    otp_ttl_seconds: u64,
    cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: u64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) fn otp_ttl(&self) -> Duration {
        Duration::from_secs(self.otp_ttl_seconds)
    }

    pub(super) fn session_cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AuthState {
    config: AuthConfig,
    signer: SessionSigner,
    store: Arc<dyn UserStore>,
    sender: Arc<dyn OtpSender>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        signer: SessionSigner,
        store: Arc<dyn UserStore>,
        sender: Arc<dyn OtpSender>,
    ) -> Self {
        Self {
            config,
            signer,
            store,
            sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    pub(super) fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub(super) fn sender(&self) -> &dyn OtpSender {
        self.sender.as_ref()
    }
}
